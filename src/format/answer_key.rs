//! Answer-key extraction and canonical reassembly.
//!
//! Generated sections end with an "Answer Key" block. We split the text at the
//! first header, parse `<n>: value` / `<n>. value` entries out of the tail, and
//! re-emit them in a compact or one-per-line layout depending on answer length.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Header introducing the key: bold anywhere, or plain at the start of a line.
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)\*\*(?:answer key|answers)[ \t]*:?[ \t]*\*\*:?|^[ \t]*(?:answer key|answers)[ \t]*(?::|$)",
    )
    .expect("answer key header regex")
});

static ENTRY_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)[ \t]*[:.]").expect("answer entry regex"));

const MAX_ENTRY_DIGITS: usize = 3;

/// Values longer than this switch the key to one entry per line.
pub const COMPACT_VALUE_MAX: usize = 5;

/// Separator between entries in the compact layout.
const COMPACT_SEPARATOR: &str = "   ";

/// Title line of the canonical key block.
pub const ANSWER_KEY_TITLE: &str = "Answer Key:";

/// Item number → answer, ordered by item number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerKeyMap(BTreeMap<u32, String>);

impl AnswerKeyMap {
    pub fn get(&self, number: u32) -> Option<&str> {
        self.0.get(&number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// The answer letter for a multiple-choice item, if the key holds exactly one of A–D.
    pub fn choice_letter(&self, number: u32) -> Option<char> {
        let value = self.get(number)?.trim();
        let mut chars = value.chars();
        let first = chars.next()?.to_ascii_uppercase();
        if chars.next().is_none() && ('A'..='D').contains(&first) {
            Some(first)
        } else {
            None
        }
    }

    pub fn has_long_values(&self) -> bool {
        self.0
            .values()
            .any(|v| v.chars().count() > COMPACT_VALUE_MAX)
    }

    /// Canonical text: `1. A   2. B` for short answers, one `n. value` per line otherwise.
    pub fn render(&self) -> String {
        let separator = if self.has_long_values() { "\n" } else { COMPACT_SEPARATOR };
        self.0
            .iter()
            .map(|(n, v)| format!("{n}. {v}"))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn insert(&mut self, number: u32, value: String) {
        self.0.insert(number, value);
    }
}

impl FromIterator<(u32, String)> for AnswerKeyMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Raw content split at the answer-key header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeySplit<'a> {
    pub body: &'a str,
    /// Everything from the header onwards (header included); empty without a header.
    pub raw_key: &'a str,
}

pub fn split_answer_key(content: &str) -> KeySplit<'_> {
    match HEADER.find(content) {
        Some(m) => KeySplit {
            body: &content[..m.start()],
            raw_key: &content[m.start()..],
        },
        None => KeySplit { body: content, raw_key: "" },
    }
}

/// Parse `<number> <':' | '.'> <value>` entries.
///
/// A value runs to the next entry start, the end of its line, or the end of the
/// text. One trailing comma is dropped (`1. A, 2. B`). Works with or without the
/// header in front.
pub fn parse_answer_entries(raw: &str) -> AnswerKeyMap {
    let starts: Vec<(u32, usize, usize)> = ENTRY_START
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let preceded_ok = raw[..whole.start()]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            if !preceded_ok {
                return None;
            }
            // `2.5` is a decimal, and `since 2010.` at a line end carries no value.
            let rest = &raw[whole.end()..];
            let rest_of_line = rest.split('\n').next().unwrap_or_default();
            if rest.starts_with(|c: char| c.is_ascii_digit()) || rest_of_line.trim().is_empty() {
                return None;
            }
            // Item numbers stay below 1000; longer figures are years or amounts.
            if caps[1].len() > MAX_ENTRY_DIGITS {
                return None;
            }
            let number = caps[1].parse::<u32>().ok()?;
            Some((number, whole.start(), whole.end()))
        })
        .collect();

    let mut map = AnswerKeyMap::default();
    for (i, &(number, _, value_start)) in starts.iter().enumerate() {
        let next_start = starts.get(i + 1).map_or(raw.len(), |s| s.1);
        let mut value = &raw[value_start..next_start];
        if let Some(nl) = value.find('\n') {
            value = &value[..nl];
        }
        let value = value.trim();
        let value = value.strip_suffix(',').unwrap_or(value).trim();
        if value.is_empty() {
            continue;
        }
        map.insert(number, value.to_string());
    }
    map
}

/// Extraction result: the body plus whatever the key section yielded.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    pub body: String,
    pub key: AnswerKeyMap,
    pub raw_key: String,
}

impl Extraction {
    /// The key block to append after the body: canonical entries, the raw section
    /// without markup when nothing parsed, or `None` without a key section.
    pub fn key_block(&self) -> Option<String> {
        if !self.key.is_empty() {
            Some(format!("{ANSWER_KEY_TITLE}\n{}", self.key.render()))
        } else if !self.raw_key.trim().is_empty() {
            Some(self.raw_key.trim().replace("**", ""))
        } else {
            None
        }
    }
}

pub fn extract(content: &str) -> Extraction {
    let split = split_answer_key(content);
    Extraction {
        body: split.body.to_string(),
        key: parse_answer_entries(split.raw_key),
        raw_key: split.raw_key.to_string(),
    }
}

/// True for a line that opens a key block (`Answer Key:`, `**Answers**`, ...).
pub fn is_key_header_line(line: &str) -> bool {
    HEADER.find(line.trim()).map_or(false, |m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_bold_header() {
        let s = split_answer_key("Question 1. Hi\n\n**Answer Key:** 1: A");
        assert_eq!(s.body, "Question 1. Hi\n\n");
        assert_eq!(s.raw_key, "**Answer Key:** 1: A");
    }

    #[test]
    fn plain_header_needs_line_start() {
        let s = split_answer_key("Write your answers below.\nAnswers:\n1. B");
        assert_eq!(s.body, "Write your answers below.\n");
        assert!(s.raw_key.starts_with("Answers:"));
    }

    #[test]
    fn no_header_keeps_everything_in_body() {
        let s = split_answer_key("Question 1. Nothing here");
        assert_eq!(s.body, "Question 1. Nothing here");
        assert_eq!(s.raw_key, "");
    }

    #[test]
    fn parses_comma_separated_letters() {
        let key = parse_answer_entries("**Answer Key:** 1. A, 2. B, 3. c, 10. D");
        assert_eq!(key.len(), 4);
        assert_eq!(key.get(1), Some("A"));
        assert_eq!(key.choice_letter(3), Some('C'));
        assert_eq!(key.render(), "1. A   2. B   3. c   10. D");
    }

    #[test]
    fn long_values_go_one_per_line() {
        let key = parse_answer_entries("1. T\n2. She has lived here since 2010.");
        assert_eq!(key.render(), "1. T\n2. She has lived here since 2010.");
    }

    #[test]
    fn years_inside_values_do_not_start_entries() {
        let key = parse_answer_entries("1. She was born in 1990. 2. B");
        assert_eq!(key.get(1), Some("She was born in 1990."));
        assert_eq!(key.get(2), Some("B"));
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn numbers_inside_words_are_not_entries() {
        let key = parse_answer_entries("1: covid19: pandemic");
        assert_eq!(key.len(), 1);
        assert_eq!(key.get(1), Some("covid19: pandemic"));
    }

    #[test]
    fn unparseable_section_falls_back_to_raw_text() {
        let ex = extract("Body\n**Answer Key:**\nSee the teacher's notes");
        assert!(ex.key.is_empty());
        assert_eq!(
            ex.key_block().as_deref(),
            Some("Answer Key:\nSee the teacher's notes")
        );
    }

    #[test]
    fn choice_letter_rejects_words() {
        let key: AnswerKeyMap = [(1, "safety".to_string()), (2, "e".to_string())]
            .into_iter()
            .collect();
        assert_eq!(key.choice_letter(1), None);
        assert_eq!(key.choice_letter(2), None);
    }
}

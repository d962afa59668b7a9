//! Line classification and canonical rewriting of the section body.
//!
//! The classifier is a fold over lines carrying `ClassifierState`; each step is a
//! pure function of (state, line, answer key), so single lines can be tested on
//! their own.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::answer_key::AnswerKeyMap;
use super::columns;

/// Lines starting with this marker are annotations meant to be deleted.
pub const DISCARD_MARKER: &str = "=>";

/// `A.` / `*B)` / `**C.` followed by whitespace, at line start or after whitespace.
static OPTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(\**)([A-D])([.)])\s").expect("option marker regex"));

static QUESTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\*\*)?\s*(question\s+)?(\d+)\s*([:.])?\s*(\*\*)?\s*(.*)$")
        .expect("question header regex")
});

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifiedLine {
    Blank,
    QuestionHeader {
        number: u32,
        /// Always `Question <n>.`
        label: String,
        body: String,
    },
    Options(OptionLine),
    AnswerKeyHeader {
        text: String,
    },
    Plain {
        text: String,
    },
}

impl ClassifiedLine {
    /// Canonical text of the line, as it appears in the reformatted section.
    pub fn to_text(&self) -> String {
        match self {
            ClassifiedLine::Blank => String::new(),
            ClassifiedLine::QuestionHeader { label, body, .. } => join_label(label, body),
            ClassifiedLine::Options(o) => o.raw.clone(),
            ClassifiedLine::AnswerKeyHeader { text } | ClassifiedLine::Plain { text } => {
                text.clone()
            }
        }
    }
}

/// A line of inline multiple-choice options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionLine {
    /// Full line after canonicalisation and correctness marking.
    pub raw: String,
    /// Text before the first option marker (e.g. `Question 7. (1)`); often empty.
    pub stem: String,
    pub options: Vec<ChoiceOption>,
}

impl OptionLine {
    /// Longest displayed cell, in characters.
    pub fn max_option_len(&self) -> usize {
        self.options
            .iter()
            .map(|o| o.display().chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        columns::column_count(self.max_option_len())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub letter: char,
    /// Marker as written, e.g. `*B.` or `C)`.
    pub label: String,
    pub text: String,
    pub correct: bool,
}

impl ChoiceOption {
    /// Cell text: `*B. development`.
    pub fn display(&self) -> String {
        join_label(&self.label, &self.text)
    }
}

/// State threaded through the fold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassifierState {
    /// Number of the last question header; persists until the next header.
    pub current_question: Option<u32>,
}

/// Classify one line. `None` means the line is dropped.
pub fn classify_line(
    state: ClassifierState,
    line: &str,
    key: &AnswerKeyMap,
) -> (ClassifierState, Option<ClassifiedLine>) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return (state, Some(ClassifiedLine::Blank));
    }
    if trimmed.starts_with(DISCARD_MARKER) {
        return (state, None);
    }

    let markers = option_markers(trimmed);
    if markers.len() >= 2 {
        let mut state = state;
        let first = markers[0].start;
        let stem_raw = trimmed[..first].trim();
        let stem = match parse_header(stem_raw, state.current_question) {
            Some((number, label, body)) => {
                state.current_question = Some(number);
                join_label(&label, &body)
            }
            None => stem_raw.to_string(),
        };
        let mut options_part = trimmed[first..].to_string();
        if let Some(letter) = state.current_question.and_then(|n| key.choice_letter(n)) {
            options_part = mark_correct(&options_part, letter);
        }
        let raw = if stem.is_empty() {
            options_part.clone()
        } else {
            format!("{stem} {options_part}")
        };
        let options = split_options(&options_part);
        return (state, Some(ClassifiedLine::Options(OptionLine { raw, stem, options })));
    }

    if markers.is_empty() {
        if let Some((number, label, body)) = parse_header(trimmed, state.current_question) {
            let state = ClassifierState { current_question: Some(number) };
            return (state, Some(ClassifiedLine::QuestionHeader { number, label, body }));
        }
    }

    (
        state,
        Some(ClassifiedLine::Plain { text: line.trim_start().to_string() }),
    )
}

/// Run the classifier over a whole body.
pub fn classify_body(body: &str, key: &AnswerKeyMap) -> Vec<ClassifiedLine> {
    body.lines()
        .fold(
            (ClassifierState::default(), Vec::new()),
            |(state, mut out), line| {
                let (next, classified) = classify_line(state, line, key);
                out.extend(classified);
                (next, out)
            },
        )
        .1
}

/// Put the correctness star on the first unmarked `letter` marker, unless some
/// marker for that letter already carries one.
pub fn mark_correct(line: &str, letter: char) -> String {
    let letter = letter.to_ascii_uppercase();
    let markers = option_markers(line);
    if markers.iter().any(|m| m.letter == letter && m.starred) {
        return line.to_string();
    }
    match markers.iter().find(|m| m.letter == letter) {
        Some(m) => {
            let mut out = String::with_capacity(line.len() + 1);
            out.push_str(&line[..m.start]);
            out.push('*');
            out.push_str(&line[m.start..]);
            out
        }
        None => line.to_string(),
    }
}

/// `Question <n>`, a number with a `:`/`.` separator, or an emphasised number
/// (`**2**`). A bare number with none of these is a header only when it is the
/// next question after `current`; otherwise it is prose (`20 students ...`).
fn parse_header(text: &str, current: Option<u32>) -> Option<(u32, String, String)> {
    let caps = QUESTION_HEADER.captures(text)?;
    let number = caps[3].parse::<u32>().ok()?;
    let has_word = caps.get(2).is_some();
    let has_separator = caps.get(4).is_some();
    let emphasised = caps.get(1).is_some() && caps.get(5).is_some();
    let next_expected = number == current.map_or(1, |n| n.saturating_add(1));
    if !(has_word || has_separator || emphasised || next_expected) {
        return None;
    }
    let body = caps
        .get(6)
        .map_or("", |m| m.as_str())
        .replace("**", "")
        .trim()
        .to_string();
    Some((number, format!("Question {number}."), body))
}

fn join_label(label: &str, text: &str) -> String {
    if text.is_empty() {
        label.to_string()
    } else {
        format!("{label} {text}")
    }
}

#[derive(Clone, Copy, Debug)]
struct Marker {
    /// Byte offset of the first star (or of the letter when unstarred).
    start: usize,
    /// Byte offset just past the `.` / `)`.
    end: usize,
    letter: char,
    starred: bool,
}

fn option_markers(line: &str) -> Vec<Marker> {
    OPTION_MARKER
        .captures_iter(line)
        .filter_map(|caps| {
            let stars = caps.get(1)?;
            let letter = caps.get(2)?;
            let punct = caps.get(3)?;
            Some(Marker {
                start: stars.start(),
                end: punct.end(),
                letter: letter.as_str().chars().next()?,
                starred: !stars.as_str().is_empty(),
            })
        })
        .collect()
}

fn split_options(options_part: &str) -> Vec<ChoiceOption> {
    let markers = option_markers(options_part);
    markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let text_end = markers.get(i + 1).map_or(options_part.len(), |n| n.start);
            ChoiceOption {
                letter: m.letter,
                label: options_part[m.start..m.end].to_string(),
                text: options_part[m.end..text_end].trim().to_string(),
                correct: m.starred,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pairs: &[(u32, &str)]) -> AnswerKeyMap {
        pairs.iter().map(|(n, v)| (*n, v.to_string())).collect()
    }

    #[test]
    fn header_is_canonicalised() {
        let (state, line) =
            classify_line(ClassifierState::default(), "**Question 3:** Pick **one**", &key(&[]));
        assert_eq!(state.current_question, Some(3));
        assert_eq!(line.map(|l| l.to_text()).as_deref(), Some("Question 3. Pick one"));
    }

    #[test]
    fn bare_number_with_separator_is_a_header() {
        let (_, line) = classify_line(ClassifierState::default(), "4. The ___ is red.", &key(&[]));
        assert!(matches!(line, Some(ClassifiedLine::QuestionHeader { number: 4, .. })));
    }

    #[test]
    fn number_without_separator_is_prose() {
        let (state, line) =
            classify_line(ClassifierState::default(), "20 students joined.", &key(&[]));
        assert_eq!(state.current_question, None);
        assert!(matches!(line, Some(ClassifiedLine::Plain { .. })));
    }

    #[test]
    fn emphasised_number_without_separator_is_a_header() {
        let state = ClassifierState { current_question: Some(5) };
        let (state, line) = classify_line(state, "**2** Two ___.", &key(&[]));
        assert_eq!(state.current_question, Some(2));
        assert_eq!(line.map(|l| l.to_text()).as_deref(), Some("Question 2. Two ___."));
    }

    #[test]
    fn next_bare_number_is_a_header() {
        let state = ClassifierState { current_question: Some(1) };
        let (state, line) = classify_line(state, "2 She ___ to school.", &key(&[]));
        assert_eq!(state.current_question, Some(2));
        assert!(matches!(line, Some(ClassifiedLine::QuestionHeader { number: 2, .. })));

        let (state, line) = classify_line(state, "20 students joined.", &key(&[]));
        assert_eq!(state.current_question, Some(2));
        assert!(matches!(line, Some(ClassifiedLine::Plain { .. })));
    }

    #[test]
    fn separatorless_headers_move_the_correct_mark() {
        let k = key(&[(1, "A"), (2, "C")]);
        let body = "Question 1. One.\nA. a  B. b  C. c  D. d\n**2** Two ___.\nA. a  B. b  C. c  D. d";
        let lines = classify_body(body, &k);
        let marked: Vec<_> = lines
            .iter()
            .filter_map(|l| match l {
                ClassifiedLine::Options(o) => Some(o.raw.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(marked, ["*A. a  B. b  C. c  D. d", "A. a  B. b  *C. c  D. d"]);

        let lines = classify_body("1. Go.\nA. x B. y\n2 She ___ home.\nA. go B. goes", &key(&[(2, "B")]));
        assert_eq!(lines.last().map(|l| l.to_text()).as_deref(), Some("A. go *B. goes"));
    }

    #[test]
    fn empty_header_has_no_trailing_space() {
        let (_, line) = classify_line(ClassifierState::default(), "Question 2.", &key(&[]));
        assert_eq!(line.map(|l| l.to_text()).as_deref(), Some("Question 2."));
    }

    #[test]
    fn options_are_split_with_labels() {
        let (_, line) = classify_line(
            ClassifierState::default(),
            "A. developing   *B. development   C. develop   D) developer",
            &key(&[]),
        );
        let Some(ClassifiedLine::Options(o)) = line else { panic!("expected options") };
        assert_eq!(o.stem, "");
        let labels: Vec<_> = o.options.iter().map(|x| x.label.as_str()).collect();
        assert_eq!(labels, ["A.", "*B.", "C.", "D)"]);
        assert!(o.options[1].correct);
        assert_eq!(o.options[3].text, "developer");
    }

    #[test]
    fn cloze_stem_sets_current_question_before_marking() {
        let state = ClassifierState { current_question: Some(1) };
        let (state, line) = classify_line(
            state,
            "Question 7. (1) A. stands up   B. asks for   C. stands for   D. writes down",
            &key(&[(1, "A"), (7, "C")]),
        );
        assert_eq!(state.current_question, Some(7));
        let Some(ClassifiedLine::Options(o)) = line else { panic!("expected options") };
        assert_eq!(o.stem, "Question 7. (1)");
        assert!(o.options[2].correct);
        assert!(!o.options[0].correct);
    }

    #[test]
    fn mark_correct_touches_only_first_unmarked_letter() {
        assert_eq!(mark_correct("A. x  B. y  C. z", 'b'), "A. x  *B. y  C. z");
        assert_eq!(mark_correct("A. x  *B. y", 'B'), "A. x  *B. y");
        assert_eq!(mark_correct("A. x  B. y", 'D'), "A. x  B. y");
    }

    #[test]
    fn dialogue_and_arrows_stay_plain() {
        let k = key(&[]);
        for text in ["a. **John**: Hi there.", "➔ A new element ....", "Answer: ......"] {
            let (_, line) = classify_line(ClassifierState::default(), text, &k);
            assert_eq!(line, Some(ClassifiedLine::Plain { text: text.to_string() }));
        }
    }

    #[test]
    fn single_marker_line_is_not_options() {
        let (_, line) =
            classify_line(ClassifierState::default(), "Question 5 uses plan A. twice", &key(&[]));
        assert!(matches!(line, Some(ClassifiedLine::Plain { .. })));
    }
}

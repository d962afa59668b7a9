//! Inline segmentation of a single line into typed spans.
//!
//! Output is renderer-neutral: each span carries a kind, its display text (markup
//! already stripped) and an optional role; `InlineSpan::style` turns that into
//! bold/underline/tone, which the HTML and docx renderers map to their own
//! primitives.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::util::percent_decode;

static QUESTION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Question\s+\d+[:.]?\s*").expect("question label regex"));
static CEFR_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:B1|B2|C1|C2)\s*[:.]\s*").expect("cefr label regex"));
static DIALOGUE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-e]\.\s*").expect("dialogue label regex"));

/// Alternatives in precedence order: annotation link, quoted, parenthesised,
/// `**emphasis**`, `[A]`-style option reference.
static INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(\[[^\]]+\]\(#cefr-[^)\s]*\))|([“"”][^“”"]*[“"”])|(\([^)]+\))|(\*\*[^*]+\*\*)|(\[[A-D]\])"#,
    )
    .expect("inline span regex")
});

static ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\(#cefr-([^)\s]*)\)$").expect("annotation regex"));

static KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+(?:[.,]\d+)?(?:st|nd|rd|th)?%?|\b[A-Z][a-zA-Z-]*\b").expect("keyword regex")
});

const STOP_WORDS: &[&str] = &[
    "A", "An", "The", "In", "On", "At", "To", "For", "Of", "With", "By", "And", "But", "Or", "So",
    "Is", "Are", "Was", "Were", "It", "This", "That",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpanKind {
    Label,
    Quoted,
    Bracket,
    Emphasis,
    /// Hover link `[word](#cefr-LEVEL||translation)`.
    Annotation { level: String, translation: String },
    Plain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanRole {
    QuestionNumber,
    CefrLevel,
    DialogueMarker,
    SpeakerName,
    OptionMarker,
    Keyword,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Inherit,
    Accent,
    Dark,
    Keyword,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SpanStyle {
    pub bold: bool,
    pub underline: bool,
    pub tone: Tone,
}

impl SpanStyle {
    const PLAIN: SpanStyle = SpanStyle { bold: false, underline: false, tone: Tone::Inherit };

    const fn bold(tone: Tone) -> Self {
        SpanStyle { bold: true, underline: false, tone }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineSpan {
    pub kind: SpanKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<SpanRole>,
}

impl InlineSpan {
    fn new(kind: SpanKind, text: impl Into<String>, role: Option<SpanRole>) -> Self {
        Self { kind, text: text.into(), role }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self::new(SpanKind::Plain, text, None)
    }

    pub fn style(&self) -> SpanStyle {
        match (&self.kind, self.role) {
            (SpanKind::Label, Some(SpanRole::CefrLevel)) => SpanStyle {
                bold: true,
                underline: true,
                tone: Tone::Dark,
            },
            (SpanKind::Label, _) => SpanStyle::bold(Tone::Accent),
            (SpanKind::Quoted, _) => SpanStyle::bold(Tone::Inherit),
            (SpanKind::Bracket, _) => SpanStyle::bold(Tone::Accent),
            (SpanKind::Emphasis, Some(SpanRole::SpeakerName)) => SpanStyle::bold(Tone::Accent),
            (SpanKind::Emphasis, Some(SpanRole::Keyword)) => SpanStyle::bold(Tone::Keyword),
            (SpanKind::Emphasis, _) => SpanStyle::bold(Tone::Inherit),
            (SpanKind::Annotation { .. }, _) | (SpanKind::Plain, _) => SpanStyle::PLAIN,
        }
    }
}

/// Per-line state; a fresh one is created for every line.
#[derive(Default)]
struct LineState {
    dialogue: bool,
    name_styled: bool,
}

/// Segment a whole line: leading label (question / CEFR level / dialogue marker)
/// followed by inline spans.
pub fn segment_line(text: &str) -> Vec<InlineSpan> {
    let mut state = LineState::default();
    let mut spans = Vec::new();

    let label = [
        (&*QUESTION_LABEL, SpanRole::QuestionNumber),
        (&*CEFR_LABEL, SpanRole::CefrLevel),
        (&*DIALOGUE_LABEL, SpanRole::DialogueMarker),
    ]
    .into_iter()
    .find_map(|(re, role)| re.find(text).map(|m| (m.end(), role)));

    let rest = match label {
        Some((end, role)) => {
            state.dialogue = role == SpanRole::DialogueMarker;
            spans.push(InlineSpan::new(SpanKind::Label, &text[..end], Some(role)));
            &text[end..]
        }
        None => text,
    };

    segment_inline(rest, &mut state, &mut spans);
    spans
}

/// Inline spans only, without label detection (option texts, stems).
pub fn segment_text(text: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    segment_inline(text, &mut LineState::default(), &mut spans);
    spans
}

fn segment_inline(text: &str, state: &mut LineState, spans: &mut Vec<InlineSpan>) {
    let mut last = 0;
    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(InlineSpan::plain(&text[last..whole.start()]));
        }
        last = whole.end();
        let part = whole.as_str();

        let span = if caps.get(1).is_some() {
            annotation_span(part)
        } else if caps.get(2).is_some() {
            InlineSpan::new(SpanKind::Quoted, part.replace("**", ""), None)
        } else if caps.get(3).is_some() {
            InlineSpan::new(SpanKind::Bracket, part, None)
        } else if caps.get(4).is_some() {
            let role = if state.dialogue && !state.name_styled {
                state.name_styled = true;
                Some(SpanRole::SpeakerName)
            } else {
                None
            };
            InlineSpan::new(SpanKind::Emphasis, part.replace("**", ""), role)
        } else {
            InlineSpan::new(SpanKind::Bracket, part, Some(SpanRole::OptionMarker))
        };
        spans.push(span);
    }
    if last < text.len() {
        spans.push(InlineSpan::plain(&text[last..]));
    }
}

fn annotation_span(part: &str) -> InlineSpan {
    let Some(caps) = ANNOTATION.captures(part) else {
        return InlineSpan::plain(part);
    };
    let target = percent_decode(&caps[2]);
    let (level, translation) = match target.split_once("||") {
        Some((level, translation)) => (level.to_string(), translation.to_string()),
        None => (target.clone(), String::new()),
    };
    InlineSpan::new(SpanKind::Annotation { level, translation }, &caps[1], None)
}

/// "Show keywords" segmentation: numbers and capitalised non-stop-words in bold.
pub fn keyword_spans(text: &str) -> Vec<InlineSpan> {
    let mut spans: Vec<InlineSpan> = Vec::new();
    let push_plain = |spans: &mut Vec<InlineSpan>, s: &str| {
        if s.is_empty() {
            return;
        }
        match spans.last_mut() {
            Some(prev) if prev.kind == SpanKind::Plain => prev.text.push_str(s),
            _ => spans.push(InlineSpan::plain(s)),
        }
    };

    let mut last = 0;
    for m in KEYWORD.find_iter(text) {
        push_plain(&mut spans, &text[last..m.start()]);
        last = m.end();
        let word = m.as_str();
        let is_number = word.starts_with(|c: char| c.is_ascii_digit());
        let is_name = word.chars().count() > 1 && !STOP_WORDS.contains(&word);
        if is_number || is_name {
            spans.push(InlineSpan::new(SpanKind::Emphasis, word, Some(SpanRole::Keyword)));
        } else {
            push_plain(&mut spans, word);
        }
    }
    push_plain(&mut spans, &text[last..]);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(spans: &[InlineSpan]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn question_label_then_inline_spans() {
        let spans = segment_line("Question 2. The word “ubiquitous” (ADJ) means [B]");
        assert_eq!(
            texts(&spans),
            ["Question 2. ", "The word ", "“ubiquitous”", " ", "(ADJ)", " means ", "[B]"]
        );
        assert_eq!(spans[0].role, Some(SpanRole::QuestionNumber));
        assert_eq!(spans[2].kind, SpanKind::Quoted);
        assert_eq!(spans[4].style().tone, Tone::Accent);
        assert_eq!(spans[6].role, Some(SpanRole::OptionMarker));
    }

    #[test]
    fn cefr_label_is_underlined() {
        let spans = segment_line("B2: thrive, reluctant");
        assert_eq!(spans[0].text, "B2: ");
        let style = spans[0].style();
        assert!(style.bold && style.underline);
        assert_eq!(style.tone, Tone::Dark);
    }

    #[test]
    fn uppercase_letter_is_not_a_dialogue_marker() {
        let spans = segment_line("A. **Tom** came");
        assert_eq!(spans[0].kind, SpanKind::Plain);
        assert_eq!(spans[1].role, None);
    }

    #[test]
    fn quoted_bold_keeps_quotes_drops_stars() {
        let spans = segment_text(r#"the word **"break a leg"** here"#);
        assert_eq!(spans[1].kind, SpanKind::Emphasis);
        assert_eq!(spans[1].text, r#""break a leg""#);
    }

    #[test]
    fn annotation_link_decodes_level_and_translation() {
        let spans = segment_text("a [ubiquitous](#cefr-C1%7C%7Cph%E1%BB%95%20bi%E1%BA%BFn) device");
        assert_eq!(spans[1].text, "ubiquitous");
        assert_eq!(
            spans[1].kind,
            SpanKind::Annotation { level: "C1".into(), translation: "phổ biến".into() }
        );
    }

    #[test]
    fn keywords_skip_stop_words() {
        let spans = keyword_spans("The Eiffel Tower drew 7 million visitors in 2019.");
        let keywords: Vec<_> = spans
            .iter()
            .filter(|s| s.role == Some(SpanRole::Keyword))
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(keywords, ["Eiffel", "Tower", "7", "2019"]);
    }
}

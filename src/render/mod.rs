//! Projections of `FormattedContent` onto output formats.
//!
//! Both renderers pull their spans and paragraph roles from here, so the screen
//! and the exported document agree on what is a header, a dialogue turn or a
//! CEFR line, and on how every span is styled.

pub mod docx;
pub mod html;

use crate::format::spans::{keyword_spans, segment_line, segment_text};
use crate::format::{ClassifiedLine, InlineSpan, SpanKind, SpanRole};

/// Switches applied on top of the default span rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Bold numbers and proper nouns inside plain runs ("show keywords").
    pub keywords: bool,
}

/// Paragraph role of a text line, decided by its leading label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRole {
    Question,
    Cefr,
    Dialogue,
    Plain,
}

impl LineRole {
    pub fn of(spans: &[InlineSpan]) -> Self {
        match spans.first() {
            Some(InlineSpan { kind: SpanKind::Label, role: Some(role), .. }) => match role {
                SpanRole::QuestionNumber => LineRole::Question,
                SpanRole::CefrLevel => LineRole::Cefr,
                SpanRole::DialogueMarker => LineRole::Dialogue,
                _ => LineRole::Plain,
            },
            _ => LineRole::Plain,
        }
    }
}

/// Spans of a header or plain line.
pub fn line_spans(line: &ClassifiedLine, opts: RenderOptions) -> Vec<InlineSpan> {
    apply_keywords(segment_line(&line.to_text()), opts)
}

/// Spans of an option's text or of an option line's stem.
pub fn text_spans(text: &str, opts: RenderOptions) -> Vec<InlineSpan> {
    apply_keywords(segment_text(text), opts)
}

fn apply_keywords(spans: Vec<InlineSpan>, opts: RenderOptions) -> Vec<InlineSpan> {
    if !opts.keywords {
        return spans;
    }
    spans
        .into_iter()
        .flat_map(|span| match span.kind {
            SpanKind::Plain => keyword_spans(&span.text),
            _ => vec![span],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_follows_label() {
        let dialogue = segment_line("a. **Tom**: Hi");
        assert_eq!(LineRole::of(&dialogue), LineRole::Dialogue);
        assert_eq!(LineRole::of(&segment_line("C1: thrive")), LineRole::Cefr);
        assert_eq!(LineRole::of(&segment_line("Read the text.")), LineRole::Plain);
    }

    #[test]
    fn keywords_only_touch_plain_runs() {
        let line = ClassifiedLine::Plain { text: "(Paris) lies in France".into() };
        let spans = line_spans(&line, RenderOptions { keywords: true });
        let roles: Vec<_> = spans.iter().map(|s| (s.text.as_str(), s.role)).collect();
        assert_eq!(
            roles,
            [
                ("(Paris)", None),
                (" lies in ", None),
                ("France", Some(SpanRole::Keyword)),
            ]
        );
    }
}

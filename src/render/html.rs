//! HTML fragment for the screen preview.
//!
//! Styling lives in the SPA stylesheet; this only emits structure and classes
//! (`tone-accent`, `options cols-4`, `cefr cefr-B2`, ...).

use std::fmt::Write as _;

use super::{line_spans, text_spans, LineRole, RenderOptions};
use crate::format::{ClassifiedLine, FormattedContent, InlineSpan, OptionLine, SpanKind, Tone};
use crate::util::escape_html;

pub fn render_html(content: &FormattedContent, opts: RenderOptions) -> String {
    let mut out = String::new();
    let mut in_key = false;
    for line in &content.lines {
        match line {
            ClassifiedLine::Blank => {}
            ClassifiedLine::AnswerKeyHeader { text } => {
                in_key = true;
                let _ = write!(out, "<h4 class=\"answer-key\">{}</h4>", escape_html(text));
            }
            ClassifiedLine::Options(o) => render_options(&mut out, o, opts),
            ClassifiedLine::Plain { text } if in_key => {
                let _ = write!(out, "<p class=\"line key\">{}</p>", escape_html(text));
            }
            ClassifiedLine::QuestionHeader { .. } | ClassifiedLine::Plain { .. } => {
                let spans = line_spans(line, opts);
                let class = match LineRole::of(&spans) {
                    LineRole::Question => "line question",
                    LineRole::Cefr => "line cefr-line",
                    LineRole::Dialogue => "line dialogue",
                    LineRole::Plain => "line",
                };
                let _ = write!(out, "<p class=\"{class}\">");
                push_spans(&mut out, &spans);
                out.push_str("</p>");
            }
        }
        out.push('\n');
    }
    out
}

/// Free text (e.g. a passage with CEFR annotation links): one paragraph per
/// non-empty line, inline spans only.
pub fn render_annotated_text(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        out.push_str("<p class=\"line passage\">");
        push_spans(&mut out, &text_spans(line, RenderOptions::default()));
        out.push_str("</p>\n");
    }
    out
}

fn render_options(out: &mut String, line: &OptionLine, opts: RenderOptions) {
    if !line.stem.is_empty() {
        let spans = line_spans(&ClassifiedLine::Plain { text: line.stem.clone() }, opts);
        out.push_str("<p class=\"line stem\">");
        push_spans(out, &spans);
        out.push_str("</p>");
    }
    let _ = write!(out, "<div class=\"options cols-{}\">", line.column_count());
    for option in &line.options {
        let class = if option.correct { "option correct" } else { "option" };
        let _ = write!(
            out,
            "<div class=\"{class}\"><span class=\"marker\">{}</span> ",
            escape_html(&option.label)
        );
        if option.correct {
            out.push_str("<strong>");
        }
        push_spans(out, &text_spans(&option.text, opts));
        if option.correct {
            out.push_str("</strong>");
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
}

fn push_spans(out: &mut String, spans: &[InlineSpan]) {
    for span in spans {
        push_span(out, span);
    }
}

fn push_span(out: &mut String, span: &InlineSpan) {
    let text = escape_html(&span.text);
    if let SpanKind::Annotation { level, translation } = &span.kind {
        let level = escape_html(level);
        let translation = escape_html(translation);
        let _ = write!(
            out,
            "<span class=\"cefr cefr-{level}\" data-level=\"{level}\" data-translation=\"{translation}\" title=\"{level}: {translation}\">{text}</span>"
        );
        return;
    }

    let style = span.style();
    if !style.bold && !style.underline {
        out.push_str(&text);
        return;
    }
    let tone = match style.tone {
        Tone::Inherit => "",
        Tone::Accent => " class=\"tone-accent\"",
        Tone::Dark => " class=\"tone-dark\"",
        Tone::Keyword => " class=\"tone-keyword\"",
    };
    let (open_u, close_u) = if style.underline { ("<u>", "</u>") } else { ("", "") };
    let _ = write!(out, "<strong{tone}>{open_u}{text}{close_u}</strong>");
}

//! Word export.
//!
//! `plan_document` turns the generated sections into a flat list of
//! `DocParagraph`s (alignment, spacing, tab stops, styled runs); `build_docx`
//! writes that plan with docx-rs. Keeping the plan separate lets tests check
//! layout decisions without unzipping a document.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, Footer, LineSpacing, PageMargin, PageNum, Paragraph, Run, RunFonts, Tab,
    TabValueType,
};
use serde::Serialize;
use tracing::{debug, info};

use super::{line_spans, text_spans, LineRole, RenderOptions};
use crate::domain::{Category, TestSection};
use crate::error::ExportError;
use crate::format::{
    format_content, ChoiceOption, ClassifiedLine, FormattedContent, InlineSpan, OptionLine, Tone,
};
use crate::util::export_file_name;

pub const FONT: &str = "Times New Roman";
/// Half-points: 12pt body, 14pt title.
pub const BODY_SIZE: usize = 24;
pub const TITLE_SIZE: usize = 28;

pub const ACCENT: &str = "0000FF";
pub const DARK: &str = "111827";
pub const KEYWORD: &str = "16A34A";

/// A4 in twips.
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;
const PAGE_MARGIN: i32 = 720;
const LINE: i32 = 240;

const TWO_COLUMN_TABS: &[usize] = &[4500];
const FOUR_COLUMN_TABS: &[usize] = &[2200, 4400, 6600];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Justified,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocRun {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
    pub color: Option<&'static str>,
    pub size: usize,
    /// Emit a tab character before the text (column separator).
    pub tab_before: bool,
}

impl DocRun {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            underline: false,
            color: None,
            size: BODY_SIZE,
            tab_before: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn from_span(span: &InlineSpan) -> Self {
        let style = span.style();
        Self {
            text: span.text.clone(),
            bold: style.bold,
            underline: style.underline,
            color: tone_color(style.tone),
            size: BODY_SIZE,
            tab_before: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocParagraph {
    pub align: Align,
    pub before: u32,
    pub after: u32,
    pub tabs: Vec<usize>,
    pub runs: Vec<DocRun>,
}

impl DocParagraph {
    fn new(align: Align, before: u32, after: u32, runs: Vec<DocRun>) -> Self {
        Self { align, before, after, tabs: Vec::new(), runs }
    }

    /// Concatenated run text with tabs, for logs and tests.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            if run.tab_before {
                out.push('\t');
            }
            out.push_str(&run.text);
        }
        out
    }
}

pub fn tone_color(tone: Tone) -> Option<&'static str> {
    match tone {
        Tone::Inherit => None,
        Tone::Accent => Some(ACCENT),
        Tone::Dark => Some(DARK),
        Tone::Keyword => Some(KEYWORD),
    }
}

/// Title, then every generated section in export order behind its divider.
pub fn plan_document(sections: &[TestSection], topic: &str) -> Vec<DocParagraph> {
    let mut title = DocRun::plain(format!("ENGLISH TEST: {}", topic.trim().to_uppercase())).bold();
    title.size = TITLE_SIZE;
    title.color = Some(ACCENT);
    let mut plan = vec![DocParagraph::new(Align::Center, 0, 400, vec![title])];

    for category in Category::EXPORT_ORDER {
        let Some(section) = sections
            .iter()
            .find(|s| s.category == category && s.is_generated)
        else {
            continue;
        };
        let mut divider = DocRun::plain(format!("--- {} SECTION ---", category.as_str().to_uppercase())).bold();
        divider.color = Some(ACCENT);
        plan.push(DocParagraph::new(Align::Left, 240, 120, vec![divider]));
        plan.extend(plan_section(&format_content(&section.content)));
    }
    plan
}

pub fn plan_section(content: &FormattedContent) -> Vec<DocParagraph> {
    let opts = RenderOptions::default();
    let mut out = Vec::new();
    let mut in_key = false;
    for line in &content.lines {
        match line {
            ClassifiedLine::Blank => {}
            ClassifiedLine::AnswerKeyHeader { text } => {
                in_key = true;
                out.push(DocParagraph::new(Align::Left, 240, 60, vec![DocRun::plain(text).bold()]));
            }
            ClassifiedLine::Plain { text } if in_key => {
                out.push(DocParagraph::new(Align::Justified, 0, 0, vec![DocRun::plain(text)]));
            }
            ClassifiedLine::Options(o) => plan_options(&mut out, o, opts),
            ClassifiedLine::QuestionHeader { .. } | ClassifiedLine::Plain { .. } => {
                out.push(text_paragraph(&line_spans(line, opts)));
            }
        }
    }
    out
}

fn text_paragraph(spans: &[InlineSpan]) -> DocParagraph {
    let (before, after) = match LineRole::of(spans) {
        LineRole::Question | LineRole::Cefr => (120, 60),
        LineRole::Dialogue => (40, 40),
        LineRole::Plain => (0, 0),
    };
    DocParagraph::new(
        Align::Justified,
        before,
        after,
        spans.iter().map(DocRun::from_span).collect(),
    )
}

fn plan_options(out: &mut Vec<DocParagraph>, line: &OptionLine, opts: RenderOptions) {
    if !line.stem.is_empty() {
        let stem = ClassifiedLine::Plain { text: line.stem.clone() };
        out.push(text_paragraph(&line_spans(&stem, opts)));
    }
    let (per_row, tabs) = match line.column_count() {
        1 => (1, &[][..]),
        2 => (2, TWO_COLUMN_TABS),
        _ => (line.options.len().max(1), FOUR_COLUMN_TABS),
    };
    for row in line.options.chunks(per_row) {
        let mut runs = Vec::new();
        for (i, option) in row.iter().enumerate() {
            let mut cell = option_runs(option, opts);
            if i > 0 {
                if let Some(first) = cell.first_mut() {
                    first.tab_before = true;
                }
            }
            runs.extend(cell);
        }
        let mut paragraph = DocParagraph::new(Align::Justified, 0, 0, runs);
        if row.len() > 1 {
            paragraph.tabs = tabs.to_vec();
        }
        out.push(paragraph);
    }
}

fn option_runs(option: &ChoiceOption, opts: RenderOptions) -> Vec<DocRun> {
    let mut label = DocRun::plain(format!("{} ", option.label));
    label.bold = option.correct;
    let mut runs = vec![label];
    runs.extend(text_spans(&option.text, opts).iter().map(|span| {
        let mut run = DocRun::from_span(span);
        run.bold |= option.correct;
        run
    }));
    runs
}

pub fn build_docx(plan: &[DocParagraph]) -> Result<Vec<u8>, ExportError> {
    let fonts = || RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT);
    let footer = Footer::new().add_paragraph(
        Paragraph::new()
            .add_page_num(PageNum::new())
            .align(AlignmentType::Right),
    );

    let mut docx = Docx::new()
        .page_size(PAGE_WIDTH, PAGE_HEIGHT)
        .page_margin(
            PageMargin::new()
                .top(PAGE_MARGIN)
                .bottom(PAGE_MARGIN)
                .left(PAGE_MARGIN)
                .right(PAGE_MARGIN),
        )
        .default_fonts(fonts())
        .default_size(BODY_SIZE)
        .footer(footer);

    for p in plan {
        let mut paragraph = Paragraph::new()
            .align(match p.align {
                Align::Left => AlignmentType::Left,
                Align::Center => AlignmentType::Center,
                Align::Justified => AlignmentType::Both,
            })
            .line_spacing(LineSpacing::new().before(p.before).after(p.after).line(LINE));
        for &pos in &p.tabs {
            paragraph = paragraph.add_tab(Tab::new().val(TabValueType::Left).pos(pos));
        }
        for r in &p.runs {
            let mut run = Run::new().fonts(fonts()).size(r.size);
            if r.tab_before {
                run = run.add_tab();
            }
            run = run.add_text(&r.text);
            if r.bold {
                run = run.bold();
            }
            if r.underline {
                run = run.underline("single");
            }
            if let Some(color) = r.color {
                run = run.color(color);
            }
            paragraph = paragraph.add_run(run);
        }
        docx = docx.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Pack(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Bytes and download name of an exported test.
#[derive(Clone, Debug)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn export_document(sections: &[TestSection], topic: &str) -> Result<ExportedDocument, ExportError> {
    if !sections.iter().any(|s| s.is_generated && !s.category.is_utility()) {
        return Err(ExportError::NothingGenerated);
    }
    let plan = plan_document(sections, topic);
    debug!(target: "pipeline", paragraphs = plan.len(), "document plan ready");
    let bytes = build_docx(&plan)?;
    let file_name = export_file_name(topic);
    info!(target: "pipeline", %file_name, bytes = bytes.len(), "document exported");
    Ok(ExportedDocument { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(category: Category, content: &str) -> TestSection {
        TestSection {
            content: content.to_string(),
            is_generated: true,
            ..TestSection::empty(category)
        }
    }

    #[test]
    fn sections_follow_export_order() {
        let sections = vec![
            section(Category::Reading, "Question 1. Read."),
            section(Category::Vocabulary, "Question 1. Pick."),
            TestSection::empty(Category::Grammar),
        ];
        let plan = plan_document(&sections, "green cities");
        let dividers: Vec<_> = plan
            .iter()
            .map(DocParagraph::text)
            .filter(|t| t.starts_with("---"))
            .collect();
        assert_eq!(dividers, ["--- VOCABULARY SECTION ---", "--- READING SECTION ---"]);
        assert_eq!(plan[0].text(), "ENGLISH TEST: GREEN CITIES");
        assert_eq!(plan[0].align, Align::Center);
    }

    #[test]
    fn four_short_options_share_one_tabbed_paragraph() {
        let plan = plan_section(&format_content("A. Red  *B. Blue  C. Green  D. Yellow"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].tabs, FOUR_COLUMN_TABS);
        assert_eq!(plan[0].text(), "A. Red\t*B. Blue\tC. Green\tD. Yellow");
        let blue = plan[0].runs.iter().find(|r| r.text == "Blue").unwrap();
        assert!(blue.bold);
    }

    #[test]
    fn medium_options_go_in_pairs() {
        let plan = plan_section(&format_content(
            "A. a wooden small old house  B. a small wooden old house  C. an old small wooden house  D. small house",
        ));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].tabs, TWO_COLUMN_TABS);
    }

    #[test]
    fn long_options_get_a_paragraph_each() {
        let long = "x".repeat(60);
        let plan = plan_section(&format_content(&format!("A. {long}  B. short")));
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|p| p.tabs.is_empty()));
    }

    #[test]
    fn spacing_depends_on_line_role() {
        let plan = plan_section(&format_content(
            "Question 1. Hi\na. **Tom**: Hello\nJust text\n\nAnswer Key: 1. A",
        ));
        let spacing: Vec<_> = plan.iter().map(|p| (p.before, p.after)).collect();
        assert_eq!(spacing, [(120, 60), (40, 40), (0, 0), (240, 60), (0, 0)]);
        assert_eq!(plan[1].runs[1].color, Some(ACCENT));
    }

    #[test]
    fn builds_a_zip_container() {
        let plan = plan_document(&[section(Category::Grammar, "Question 1. Go.")], "Travel");
        let bytes = build_docx(&plan).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn export_requires_a_generated_section() {
        let err = export_document(&[TestSection::empty(Category::Grammar)], "x").unwrap_err();
        assert!(matches!(err, ExportError::NothingGenerated));
    }
}

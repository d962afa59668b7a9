//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cefr::CefrItem;
use crate::domain::{Category, DictionaryEntry, DictionaryOptions, TestSection};
use crate::format::format_content;
use crate::prompts::GenerationRequest;
use crate::render::html::render_html;
use crate::render::RenderOptions;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Every keystroke in the topic box; answered with debounced `suggestions`.
    TopicInput {
        topic: String,
        #[serde(default)]
        context: Option<String>,
    },
    Generate(GenerationRequest),
    Refine {
        category: Category,
        instruction: String,
    },
    Export {
        #[serde(default)]
        topic: String,
    },
    Reset,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Suggestions {
        topic: String,
        items: Vec<String>,
    },
    Section {
        section: SectionOut,
        updated: bool,
    },
    Export {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "dataBase64")]
        data_base64: String,
    },
    Reset,
    Error {
        message: String,
    },
}

/// A section with its reformatted text and screen markup.
#[derive(Debug, Serialize)]
pub struct SectionOut {
    #[serde(flatten)]
    pub section: TestSection,
    pub formatted: String,
    pub html: String,
}

/// Run the pipeline over a section for delivery.
pub fn to_out(section: TestSection, opts: RenderOptions) -> SectionOut {
    let formatted = format_content(&section.content);
    SectionOut {
        formatted: formatted.to_text(),
        html: render_html(&formatted, opts),
        section,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    #[serde(rename = "aiEnabled")]
    pub ai_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub keywords: bool,
}

impl RenderQuery {
    pub fn options(&self) -> RenderOptions {
        RenderOptions { keywords: self.keywords }
    }
}

#[derive(Serialize)]
pub struct SectionResult {
    pub section: SectionOut,
    /// False when the backend returned nothing and the section kept its content.
    pub updated: bool,
}

#[derive(Deserialize)]
pub struct RefineIn {
    pub category: Category,
    pub instruction: String,
}

#[derive(Deserialize)]
pub struct FormatIn {
    pub content: String,
    #[serde(default)]
    pub keywords: bool,
}
#[derive(Serialize)]
pub struct FormatOut {
    pub formatted: String,
    pub html: String,
    #[serde(rename = "answerKey")]
    pub answer_key: BTreeMap<u32, String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub topic: String,
}

#[derive(Deserialize)]
pub struct TranslateIn {
    pub text: String,
}
#[derive(Serialize)]
pub struct TranslateOut {
    pub translation: String,
}

#[derive(Deserialize)]
pub struct CefrAnalyzeIn {
    pub text: String,
}
#[derive(Serialize)]
pub struct CefrAnalyzeOut {
    pub items: Vec<CefrItem>,
    /// Set when the analysis completed but found nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct CefrHighlightIn {
    pub text: String,
    pub items: Vec<CefrItem>,
    /// CEFR levels and/or forms to highlight.
    #[serde(default)]
    pub selected: Vec<String>,
}
#[derive(Serialize)]
pub struct CefrHighlightOut {
    pub markup: String,
    pub html: String,
}

#[derive(Deserialize)]
pub struct DictionaryIn {
    pub word: String,
    #[serde(flatten)]
    pub options: DictionaryOptions,
}
#[derive(Serialize)]
pub struct DictionaryOut {
    pub entry: Option<DictionaryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GrammarQuery {
    #[serde(default)]
    pub category: String,
}

#[derive(Serialize)]
pub struct ListOut {
    pub items: Vec<String>,
}

#[derive(Serialize)]
pub struct OkOut {
    pub ok: bool,
}

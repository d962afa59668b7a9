//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Generating, refining and resetting test sections (behind the processing gate)
//!   - Exporting the generated sections as a document
//!   - Translation, CEFR analysis/highlighting and dictionary lookups
//!   - Trending topics, topic suggestions and grammar suggestions
//!
//! Backend failures never leave this module as errors: they are logged and
//! become an empty result (empty string, empty list or None).

use tracing::{debug, error, info, instrument, warn};

use crate::cefr::{highlight_terms, sort_for_table, CefrItem};
use crate::domain::{Category, DictionaryEntry, DictionaryOptions, TestSection};
use crate::error::{AppError, LlmError};
use crate::format::format_content;
use crate::openai::OpenAI;
use crate::prompts::{build_generation_prompt, GenerationRequest};
use crate::protocol::{CefrHighlightOut, FormatOut};
use crate::render::docx::{export_document, ExportedDocument};
use crate::render::html::{render_annotated_text, render_html};
use crate::render::RenderOptions;
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Shown instead of an empty table when the analysis found nothing.
pub const CEFR_EMPTY_NOTICE: &str =
  "Could not analyze the text. No academic words, collocations or idioms were found.";

/// Offered when the backend cannot suggest grammar concepts.
pub const FALLBACK_GRAMMAR_CONCEPTS: &[&str] = &[
  "Present Simple",
  "Past Continuous",
  "Articles",
  "Prepositions",
  "Conditionals",
  "Passive Voice",
];

/// Minimum topic length (in characters) that triggers backend suggestions.
const SUGGEST_MIN_CHARS: usize = 3;

fn client(state: &AppState) -> Result<&OpenAI, LlmError> {
  state.openai.as_ref().ok_or(LlmError::NotConfigured)
}

/// Collapse a backend result into its sentinel, logging the failure.
fn or_sentinel<T: Default>(op: &'static str, res: Result<T, LlmError>) -> T {
  res.unwrap_or_else(|e| {
    error!(target: "generation", op, error = %e, "AI backend call failed; returning empty result");
    T::default()
  })
}

fn ensure_generative(category: Category) -> Result<(), AppError> {
  if category.is_utility() {
    return Err(AppError::BadRequest(format!("{category} does not produce a test section")));
  }
  Ok(())
}

/// Generate one section. Returns the section and whether it was replaced;
/// an empty backend result leaves the previous content in place.
#[instrument(level = "info", skip(state, req), fields(category = %req.category, topic = %trunc_for_log(&req.topic, 60)))]
pub async fn generate(state: &AppState, req: &GenerationRequest) -> Result<(TestSection, bool), AppError> {
  ensure_generative(req.category)?;
  if !req.has_subject() {
    return Err(AppError::BadRequest("Please enter a topic.".into()));
  }
  let _permit = state.gate.try_acquire().ok_or(AppError::Busy)?;

  let prompt = build_generation_prompt(req);
  debug!(target: "generation", prompt_len = prompt.len(), info = %req.subtype_info(), "prompt assembled");

  let text = match client(state) {
    Ok(oa) => or_sentinel("generate", oa.generate_section(&state.prompts, &prompt).await),
    Err(e) => or_sentinel("generate", Err::<String, _>(e)),
  };
  if text.trim().is_empty() {
    warn!(target: "generation", category = %req.category, "empty generation; section unchanged");
    return Ok((state.section(req.category).await, false));
  }
  let section = state.store_section(req.category, text).await;
  info!(target: "generation", category = %req.category, content_len = section.content.len(), "section generated");
  Ok((section, true))
}

/// Revise a generated section. Prior content survives an empty result.
#[instrument(level = "info", skip(state, instruction), fields(%category, instruction_len = instruction.len()))]
pub async fn refine(state: &AppState, category: Category, instruction: &str) -> Result<(TestSection, bool), AppError> {
  ensure_generative(category)?;
  if instruction.trim().is_empty() {
    return Err(AppError::BadRequest("Please enter a refinement instruction.".into()));
  }
  let _permit = state.gate.try_acquire().ok_or(AppError::Busy)?;
  let current = state.section(category).await;
  if !current.is_generated {
    return Err(AppError::BadRequest(format!("{category} has not been generated yet")));
  }

  let text = match client(state) {
    Ok(oa) => or_sentinel("refine", oa.refine_section(&state.prompts, &current.content, instruction.trim()).await),
    Err(e) => or_sentinel("refine", Err::<String, _>(e)),
  };
  if text.trim().is_empty() {
    warn!(target: "generation", %category, "empty refinement; keeping prior content");
    return Ok((current, false));
  }
  let section = state.store_section(category, text).await;
  Ok((section, true))
}

#[instrument(level = "info", skip(state))]
pub async fn reset(state: &AppState) {
  state.reset_sections().await;
  info!(target: "testsmith", "all sections reset");
}

#[instrument(level = "info", skip(state), fields(topic = %trunc_for_log(topic, 60)))]
pub async fn export(state: &AppState, topic: &str) -> Result<ExportedDocument, AppError> {
  let sections = state.all_sections().await;
  Ok(export_document(&sections, topic)?)
}

/// Pipeline only, no backend.
#[instrument(level = "debug", skip(raw), fields(raw_len = raw.len()))]
pub fn format_preview(raw: &str, opts: RenderOptions) -> FormatOut {
  let formatted = format_content(raw);
  FormatOut {
    html: render_html(&formatted, opts),
    answer_key: formatted.answer_key.iter().map(|(n, v)| (n, v.to_string())).collect(),
    formatted: formatted.to_text(),
  }
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn translate(state: &AppState, text: &str) -> String {
  if text.trim().is_empty() {
    return String::new();
  }
  let language = &state.settings.target_language;
  match client(state) {
    Ok(oa) => or_sentinel("translate", oa.translate(&state.prompts, text, language).await),
    Err(e) => or_sentinel("translate", Err(e)),
  }
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn translate_vocab_list(state: &AppState, text: &str) -> String {
  if text.trim().is_empty() {
    return String::new();
  }
  let language = &state.settings.target_language;
  match client(state) {
    Ok(oa) => or_sentinel("translate_vocab", oa.translate_vocab_list(&state.prompts, text, language).await),
    Err(e) => or_sentinel("translate_vocab", Err(e)),
  }
}

/// Items in table order; empty when nothing was found or the call failed.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn analyze_cefr(state: &AppState, text: &str) -> Vec<CefrItem> {
  if text.trim().is_empty() {
    return Vec::new();
  }
  let mut items = match client(state) {
    Ok(oa) => or_sentinel("analyze_cefr", oa.analyze_cefr(&state.prompts, text, &state.settings.target_language).await),
    Err(e) => or_sentinel("analyze_cefr", Err(e)),
  };
  sort_for_table(&mut items);
  debug!(target: "generation", items = items.len(), "CEFR analysis done");
  items
}

/// Annotation markup plus its screen rendering.
pub fn highlight_cefr(text: &str, items: &[CefrItem], selected: &[String]) -> CefrHighlightOut {
  let markup = highlight_terms(text, items, selected);
  CefrHighlightOut { html: render_annotated_text(&markup), markup }
}

#[instrument(level = "info", skip(state, options), fields(%word))]
pub async fn lookup_dictionary(state: &AppState, word: &str, options: DictionaryOptions) -> Option<DictionaryEntry> {
  let word = word.trim();
  if word.is_empty() {
    return None;
  }
  let oa = match client(state) {
    Ok(oa) => oa,
    Err(e) => return or_sentinel("dictionary", Err::<Option<DictionaryEntry>, _>(e)),
  };
  let res = oa
    .lookup_dictionary(&state.prompts, word, options, &state.settings.target_language)
    .await
    .map(Some);
  or_sentinel("dictionary", res)
}

/// Fetched once; later calls are served from the cache.
#[instrument(level = "info", skip(state))]
pub async fn trending_topics(state: &AppState) -> Vec<String> {
  {
    let cached = state.trends.read().await;
    if !cached.is_empty() {
      return cached.clone();
    }
  }
  let items = match client(state) {
    Ok(oa) => or_sentinel("trending", oa.trending_topics(&state.prompts).await),
    Err(e) => or_sentinel("trending", Err(e)),
  };
  if !items.is_empty() {
    *state.trends.write().await = items.clone();
  }
  items
}

#[instrument(level = "info", skip(state), fields(query_len = query.len()))]
pub async fn topic_suggestions(state: &AppState, query: &str, context: Option<&str>) -> Vec<String> {
  match client(state) {
    Ok(oa) => or_sentinel("suggest", oa.topic_suggestions(&state.prompts, query, context).await),
    Err(e) => or_sentinel("suggest", Err(e)),
  }
}

/// Grammar concept chips for a grammar category ("All" for general grammar).
#[instrument(level = "info", skip(state))]
pub async fn grammar_suggestions(state: &AppState, category: &str) -> Vec<String> {
  let items = match client(state) {
    Ok(oa) => or_sentinel("grammar_suggest", oa.grammar_suggestions(&state.prompts, category).await),
    Err(e) => or_sentinel("grammar_suggest", Err(e)),
  };
  if items.is_empty() {
    return FALLBACK_GRAMMAR_CONCEPTS.iter().map(|s| s.to_string()).collect();
  }
  items
}

/// What the topic box should offer for its current text: backend suggestions
/// once the topic is long enough, trending topics while it is empty.
pub async fn suggestions_for_input(state: &AppState, topic: &str, context: Option<&str>) -> Vec<String> {
  let topic = topic.trim();
  if topic.is_empty() {
    trending_topics(state).await
  } else if topic.chars().count() >= SUGGEST_MIN_CHARS {
    topic_suggestions(state, topic, context).await
  } else {
    Vec::new()
  }
}

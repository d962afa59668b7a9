//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters sizes and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::Category;
use crate::error::AppError;
use crate::logic;
use crate::prompts::{catalog, GenerationRequest};
use crate::protocol::*;
use crate::state::AppState;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, ai_enabled: state.openai.is_some() })
}

#[instrument(level = "info")]
pub async fn http_catalog() -> impl IntoResponse {
  Json(catalog())
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_sections(
  State(state): State<Arc<AppState>>,
  Query(q): Query<RenderQuery>,
) -> impl IntoResponse {
  let opts = q.options();
  let sections: Vec<SectionOut> = state
    .all_sections()
    .await
    .into_iter()
    .map(|s| to_out(s, opts))
    .collect();
  Json(sections)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_section(
  State(state): State<Arc<AppState>>,
  Path(category): Path<String>,
  Query(q): Query<RenderQuery>,
) -> Result<Json<SectionOut>, AppError> {
  let category = Category::parse(&category).ok_or(AppError::UnknownCategory(category))?;
  Ok(Json(to_out(state.section(category).await, q.options())))
}

#[instrument(level = "info", skip(state, body), fields(category = %body.category))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerationRequest>,
) -> Result<Json<SectionResult>, AppError> {
  let (section, updated) = logic::generate(&state, &body).await?;
  info!(target: "generation", category = %body.category, %updated, "HTTP generate served");
  Ok(Json(SectionResult { section: to_out(section, Default::default()), updated }))
}

#[instrument(level = "info", skip(state, body), fields(category = %body.category, instruction_len = body.instruction.len()))]
pub async fn http_post_refine(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RefineIn>,
) -> Result<Json<SectionResult>, AppError> {
  let (section, updated) = logic::refine(&state, body.category, &body.instruction).await?;
  info!(target: "generation", category = %body.category, %updated, "HTTP refine served");
  Ok(Json(SectionResult { section: to_out(section, Default::default()), updated }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  logic::reset(&state).await;
  Json(OkOut { ok: true })
}

#[instrument(level = "info", skip(body), fields(content_len = body.content.len()))]
pub async fn http_post_format(Json(body): Json<FormatIn>) -> impl IntoResponse {
  let opts = crate::render::RenderOptions { keywords: body.keywords };
  Json(logic::format_preview(&body.content, opts))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_export(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
  let doc = logic::export(&state, &q.topic).await?;
  let disposition = format!("attachment; filename=\"{}\"", doc.file_name.replace('"', ""));
  Ok((
    [(header::CONTENT_TYPE, DOCX_MIME.to_string()), (header::CONTENT_DISPOSITION, disposition)],
    doc.bytes,
  ))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_translate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranslateIn>,
) -> impl IntoResponse {
  let translation = logic::translate(&state, &body.text).await;
  Json(TranslateOut { translation })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_translate_vocab(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranslateIn>,
) -> impl IntoResponse {
  let translation = logic::translate_vocab_list(&state, &body.text).await;
  Json(TranslateOut { translation })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_cefr_analyze(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CefrAnalyzeIn>,
) -> impl IntoResponse {
  let items = logic::analyze_cefr(&state, &body.text).await;
  let notice = items.is_empty().then(|| logic::CEFR_EMPTY_NOTICE.to_string());
  info!(target: "generation", items = items.len(), "HTTP CEFR analysis served");
  Json(CefrAnalyzeOut { items, notice })
}

#[instrument(level = "info", skip(body), fields(text_len = body.text.len(), items = body.items.len()))]
pub async fn http_post_cefr_highlight(Json(body): Json<CefrHighlightIn>) -> impl IntoResponse {
  Json(logic::highlight_cefr(&body.text, &body.items, &body.selected))
}

#[instrument(level = "info", skip(state, body), fields(word = %body.word))]
pub async fn http_post_dictionary(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DictionaryIn>,
) -> impl IntoResponse {
  let entry = logic::lookup_dictionary(&state, &body.word, body.options).await;
  Json(DictionaryOut { entry })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_trending(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(ListOut { items: logic::trending_topics(&state).await })
}

#[instrument(level = "info", skip(state), fields(q_len = q.q.len()))]
pub async fn http_get_topic_suggestions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SuggestQuery>,
) -> impl IntoResponse {
  let items = logic::topic_suggestions(&state, &q.q, q.context.as_deref()).await;
  Json(ListOut { items })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_grammar_suggestions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<GrammarQuery>,
) -> impl IntoResponse {
  Json(ListOut { items: logic::grammar_suggestions(&state, &q.category).await })
}

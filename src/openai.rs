//! OpenAI-compatible chat client used for generation and the tool tabs.
//!
//! Only `chat/completions` is called, asking for plain text or a JSON object.
//! Calls log model, latency and response size; prompts, contents and the API
//! key are never logged.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::cefr::{clean_items, CefrItem};
use crate::config::{Prompts, Settings};
use crate::domain::{DictionaryEntry, DictionaryOptions};
use crate::error::LlmError;
use crate::util::{fill_template, strip_code_fences};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(settings: &Settings) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let fast_model =
      std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let strong_model =
      std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    Self::new(api_key, base_url, fast_model, strong_model, Duration::from_secs(settings.request_timeout_secs))
  }

  pub fn new(
    api_key: String,
    base_url: String,
    fast_model: String,
    strong_model: String,
    timeout: Duration,
  ) -> Option<Self> {
    let client = reqwest::Client::builder().timeout(timeout).build().ok()?;
    Some(Self {
      client,
      api_key,
      base_url: base_url.trim_end_matches('/').to_string(),
      fast_model,
      strong_model,
    })
  }

  async fn complete(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
    json: bool,
  ) -> Result<String, LlmError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: json.then(|| ResponseFormat { r#type: "json_object".into() }),
      max_tokens: None,
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "testsmith-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(LlmError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(target: "generation", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default()
      .trim()
      .to_string();
    debug!(target: "generation", elapsed = ?start.elapsed(), bytes = text.len(), "completion received");
    if text.is_empty() {
      return Err(LlmError::EmptyContent);
    }
    Ok(text)
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model, user_len = user.len()))]
  async fn chat_plain(&self, model: &str, system: &str, user: &str, temperature: f32) -> Result<String, LlmError> {
    self.complete(model, system, user, temperature, false).await
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model, user_len = user.len()))]
  async fn chat_json<T: DeserializeOwned>(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, LlmError> {
    let text = self.complete(model, system, user, temperature, true).await?;
    Ok(serde_json::from_str::<T>(strip_code_fences(&text))?)
  }

  // --- High-level helpers (domain-specialized) ---

  #[instrument(level = "info", skip_all, fields(model = %self.strong_model, prompt_len = prompt.len()))]
  pub async fn generate_section(&self, prompts: &Prompts, prompt: &str) -> Result<String, LlmError> {
    self.chat_plain(&self.strong_model, &prompts.generate_system, prompt, 0.8).await
  }

  #[instrument(level = "info", skip_all, fields(model = %self.strong_model, content_len = content.len()))]
  pub async fn refine_section(&self, prompts: &Prompts, content: &str, instruction: &str) -> Result<String, LlmError> {
    let user = fill_template(
      &prompts.refine_user_template,
      &[("content", content), ("instruction", instruction)],
    );
    self.chat_plain(&self.strong_model, &prompts.refine_system, &user, 0.5).await
  }

  #[instrument(level = "info", skip_all, fields(model = %self.fast_model, text_len = text.len(), %language))]
  pub async fn translate(&self, prompts: &Prompts, text: &str, language: &str) -> Result<String, LlmError> {
    let user = fill_template(&prompts.translate_user_template, &[("language", language), ("text", text)]);
    self.chat_plain(&self.fast_model, "You are a professional translation engine. Output only the translation.", &user, 0.0).await
  }

  #[instrument(level = "info", skip_all, fields(model = %self.fast_model, text_len = text.len(), %language))]
  pub async fn translate_vocab_list(&self, prompts: &Prompts, text: &str, language: &str) -> Result<String, LlmError> {
    let user = fill_template(&prompts.translate_vocab_user_template, &[("language", language), ("text", text)]);
    self.chat_plain(&self.fast_model, "You are a professional translation engine. Output only the result string.", &user, 0.0).await
  }

  #[instrument(level = "info", skip_all, fields(model = %self.strong_model, text_len = text.len()))]
  pub async fn analyze_cefr(&self, prompts: &Prompts, text: &str, language: &str) -> Result<Vec<CefrItem>, LlmError> {
    #[derive(Deserialize)]
    struct Analysis { #[serde(default)] items: Vec<CefrItem> }

    let user = fill_template(&prompts.cefr_user_template, &[("language", language), ("text", text)]);
    let a: Analysis = self.chat_json(&self.strong_model, &prompts.cefr_system, &user, 0.2).await?;
    Ok(clean_items(a.items))
  }

  #[instrument(level = "info", skip_all, fields(model = %self.strong_model, %word))]
  pub async fn lookup_dictionary(
    &self,
    prompts: &Prompts,
    word: &str,
    options: DictionaryOptions,
    language: &str,
  ) -> Result<DictionaryEntry, LlmError> {
    let flag = |b: bool| if b { "yes" } else { "no" };
    let user = fill_template(
      &prompts.dictionary_user_template,
      &[
        ("word", word),
        ("language", language),
        ("phrases", flag(options.phrases)),
        ("collocations", flag(options.collocations)),
        ("idioms", flag(options.idioms)),
      ],
    );
    self.chat_json(&self.strong_model, &prompts.dictionary_system, &user, 0.2).await
  }

  #[instrument(level = "info", skip_all, fields(model = %self.fast_model))]
  pub async fn trending_topics(&self, prompts: &Prompts) -> Result<Vec<String>, LlmError> {
    let text = self.complete(&self.fast_model, "Respond ONLY with strict JSON.", &prompts.trending_user, 0.7, true).await?;
    parse_string_list(&text)
  }

  /// Topic ideas for a partial query, optionally narrowed to a grammar category.
  #[instrument(level = "info", skip_all, fields(model = %self.fast_model, query_len = query.len()))]
  pub async fn topic_suggestions(&self, prompts: &Prompts, query: &str, context: Option<&str>) -> Result<Vec<String>, LlmError> {
    let context = context.map(str::trim).filter(|c| !c.is_empty() && *c != "All");
    let user = match (query.trim().is_empty(), context) {
      (true, None) => return Ok(Vec::new()),
      (true, Some(ctx)) => fill_template(&prompts.suggest_category_template, &[("context", ctx)]),
      (false, ctx) => {
        let ctx_part = ctx
          .map(|c| fill_template(&prompts.suggest_context_template, &[("context", c)]))
          .unwrap_or_default();
        fill_template(&prompts.suggest_user_template, &[("query", query.trim()), ("context", ctx_part.as_str())])
      }
    };
    let text = self.complete(&self.fast_model, "Respond ONLY with strict JSON.", &user, 0.7, true).await?;
    parse_string_list(&text)
  }

  #[instrument(level = "info", skip_all, fields(model = %self.fast_model, %category))]
  pub async fn grammar_suggestions(&self, prompts: &Prompts, category: &str) -> Result<Vec<String>, LlmError> {
    let target = if category.trim().is_empty() || category == "All" { "English Grammar" } else { category };
    let user = fill_template(&prompts.grammar_suggest_user_template, &[("target", target)]);
    let text = self.complete(&self.fast_model, "Respond ONLY with strict JSON.", &user, 0.5, true).await?;
    parse_string_list(&text)
  }
}

/// Accepts `["a", "b"]` or an object holding such an array (`{"items": [...]}`).
/// Non-string and blank entries are dropped.
pub fn parse_string_list(text: &str) -> Result<Vec<String>, LlmError> {
  let value: Value = serde_json::from_str(strip_code_fences(text))?;
  let array = match value {
    Value::Array(a) => a,
    Value::Object(map) => map
      .into_iter()
      .find_map(|(_, v)| match v {
        Value::Array(a) => Some(a),
        _ => None,
      })
      .unwrap_or_default(),
    _ => Vec::new(),
  };
  Ok(array
    .into_iter()
    .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
    .filter(|s| !s.is_empty())
    .collect())
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

//! Loading agent configuration (prompt overrides + settings) from TOML.
//!
//! Example:
//! ```toml
//! [settings]
//! suggest_debounce_ms = 800
//! target_language = "Vietnamese"
//!
//! [prompts]
//! refine_system = "You are an expert English exam creator."
//! ```

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub settings: Settings,
}

/// Runtime knobs. Every field has a default so a partial `[settings]` table works.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Quiet period after the last topic keystroke before suggestions are fetched.
  pub suggest_debounce_ms: u64,
  /// Language used for translations and meanings.
  pub target_language: String,
  /// Directory of the SPA served as fallback.
  pub static_dir: String,
  /// Timeout for a single backend call.
  pub request_timeout_secs: u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      suggest_debounce_ms: 800,
      target_language: "Vietnamese".into(),
      static_dir: "./static".into(),
      request_timeout_secs: 90,
    }
  }
}

/// Prompts used by the AI client. `{placeholders}` are filled by `util::fill_template`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub generate_system: String,
  pub refine_system: String,
  pub refine_user_template: String,
  pub translate_user_template: String,
  pub translate_vocab_user_template: String,
  pub cefr_system: String,
  pub cefr_user_template: String,
  pub dictionary_system: String,
  pub dictionary_user_template: String,
  pub trending_user: String,
  pub suggest_user_template: String,
  pub suggest_context_template: String,
  pub suggest_category_template: String,
  pub grammar_suggest_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generate_system: "You are a national-level English exam writer. Output only the test content in plain text with the exact layout requested.".into(),
      refine_system: "You are an expert English exam creator. Output only the full revised test content.".into(),
      refine_user_template: "Refine the following test content based on the instruction provided. Maintain the existing formatting rules (Question N., *A., options on one line, **Answer Key:** block).\n\nExisting Content:\n{content}\n\nInstruction: {instruction}".into(),
      translate_user_template: "Translate the following text into {language}. Return only the translated text.\n\nText: {text}".into(),
      translate_vocab_user_template: "Translate the following list of vocabulary items into {language}. For each item, return it in the format: \"word (translation)\". Join all items into a single string separated by \", \". Only return the result string.\n\nList:\n{text}".into(),
      cefr_system: "You are a lexicographer grading vocabulary against the CEFR scale. Respond ONLY with strict JSON.".into(),
      cefr_user_template: "Analyze the following English text and identify academic words, collocations, idioms, and phrasal verbs. For each item, determine its CEFR level (A1-C2) and give the {language} meaning, synonyms and antonyms (with their levels in parentheses).\nReturn JSON {\"items\": [{\"field\": string, \"word\": string, \"form\": \"Academic Word\"|\"Collocation\"|\"Idiom\"|\"Phrasal Verb\", \"level\": string, \"meaning\": string, \"synonyms\": string, \"antonyms\": string}]}.\n\nText:\n{text}".into(),
      dictionary_system: "You are an English learner's dictionary. Respond ONLY with strict JSON.".into(),
      dictionary_user_template: "Provide a detailed dictionary entry for the English word or phrase: \"{word}\". Include phonetic, CEFR level, part of speech, {language} translation, English definition, examples (en + {language}), and a usage note. Include prepositional phrases: {phrases}; collocations: {collocations}; idioms: {idioms}.\nReturn JSON {\"word\", \"phonetic\", \"level\", \"partOfSpeech\", \"translation\", \"definition\", \"examples\": [{\"en\", \"vn\"}], \"usage_note\", \"prepositional_phrases\": [{\"phrase\", \"vn\"}], \"collocations\": [{\"collocation\", \"vn\"}], \"idioms\": [{\"idiom\", \"vn\"}]}.".into(),
      trending_user: "List 12 current trending global topics suitable for English language examinations. Return JSON {\"items\": [string]}.".into(),
      suggest_user_template: "Suggest 8 concise topic names or specific keywords related to \"{query}\"{context} for an English exam. Return JSON {\"items\": [string]}.".into(),
      suggest_context_template: " strictly related to the grammar category: \"{context}\"".into(),
      suggest_category_template: "List 8 key sub-topics or important keywords specifically for the English grammar category: \"{context}\". Return JSON {\"items\": [string]}.".into(),
      grammar_suggest_user_template: "List 15 popular and distinct grammar concepts, rules, or sub-topics specifically related to \"{target}\" for English learners. Return JSON {\"items\": [string]}.".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "testsmith", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "testsmith", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "testsmith", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_tables_keep_defaults() {
    let cfg = parse_agent_config(
      "[settings]\nsuggest_debounce_ms = 250\n\n[prompts]\nrefine_system = \"Be brief.\"\n",
    )
    .unwrap();
    assert_eq!(cfg.settings.suggest_debounce_ms, 250);
    assert_eq!(cfg.settings.target_language, "Vietnamese");
    assert_eq!(cfg.prompts.refine_system, "Be brief.");
    assert!(cfg.prompts.translate_user_template.contains("{language}"));
  }

  #[test]
  fn empty_file_is_default() {
    let cfg = parse_agent_config("").unwrap();
    assert_eq!(cfg.settings.static_dir, "./static");
  }

  #[test]
  fn bad_types_are_rejected() {
    assert!(parse_agent_config("[settings]\nsuggest_debounce_ms = \"soon\"").is_err());
  }
}

//! testsmith · English test authoring backend
//!
//! Generates English test sections through an OpenAI-compatible backend,
//! reformats them deterministically (answer-key extraction, option marking,
//! inline styling) and renders them as HTML for the screen or as a `.docx`
//! document for export.

pub mod cefr;
pub mod config;
pub mod domain;
pub mod error;
pub mod format;
pub mod logic;
pub mod openai;
pub mod prompts;
pub mod protocol;
pub mod render;
pub mod routes;
pub mod state;
pub mod suggest;
pub mod telemetry;
pub mod util;

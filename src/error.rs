//! Error types.
//!
//! `LlmError` stays inside the backend client and `logic`, where it is logged and
//! turned into an empty result. `AppError` is what handlers return; it maps to
//! an HTTP status and a `{"error": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI backend is not configured (OPENAI_API_KEY missing)")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("response had no content")]
    EmptyContent,
    #[error("malformed structured response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no section has been generated")]
    NothingGenerated,
    #[error("failed to write document: {0}")]
    Pack(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("another generation is still in progress")]
    Busy,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Busy => StatusCode::CONFLICT,
            AppError::UnknownCategory(_) => StatusCode::NOT_FOUND,
            AppError::Export(ExportError::NothingGenerated) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Export(ExportError::Pack(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_maps_to_conflict() {
        assert_eq!(AppError::Busy.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(ExportError::NothingGenerated).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

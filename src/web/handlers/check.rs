// POST /check-toxicity: evaluate one message.
//
// Returns 200 with the moderation result whenever a decision was reached,
// including fail-open decisions for undetected or unsupported languages.
// Returns 500 when a classifier fails, so callers can tell "could not
// decide" apart from "blocked".

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::web::{api_error, AppState};

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Any JSON value is accepted here; only strings carry text.
    #[serde(default)]
    pub message: Option<Value>,
}

impl CheckRequest {
    /// The text to moderate. A missing, null, or non-string message is
    /// evaluated as empty text, which identifies as Undetected.
    pub fn text(&self) -> &str {
        match &self.message {
            Some(Value::String(text)) => text,
            _ => "",
        }
    }
}

/// POST /check-toxicity: allow/block decision for a chat message.
pub async fn check_toxicity(
    State(state): State<AppState>,
    Json(body): Json<CheckRequest>,
) -> Response {
    match state.moderator.evaluate(body.text()).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!(error = %format!("{e:#}"), "Toxicity check failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Toxicity check failed")
        }
    }
}

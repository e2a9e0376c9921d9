// Web server: Axum-based moderation API.
//
// Routes:
//   POST /check-toxicity        evaluate a message
//   POST /api/analyze-message   same handler, the path chat backends call
//   GET  /health                liveness probe
//
// The Moderator (and the ONNX models inside it) is built once before the
// listener starts and shared read-only by every request.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::moderation::Moderator;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub moderator: Arc<Moderator>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(moderator: Moderator) -> Self {
        Self {
            moderator: Arc::new(moderator),
            started_at: Utc::now(),
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(moderator: Moderator, port: u16, bind: &str) -> Result<()> {
    let app = build_router(AppState::new(moderator));

    let addr = format!("{bind}:{port}");
    info!("Parley moderation API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/check-toxicity", post(handlers::check::check_toxicity))
        .route("/api/analyze-message", post(handlers::check::check_toxicity))
        .route("/health", get(handlers::health::health))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

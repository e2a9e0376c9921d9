// GET /health: liveness probe. Always 200 once the models are loaded,
// since the server only starts listening after that.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::web::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "started_at": state.started_at.to_rfc3339(),
        })),
    )
}

/*
 * Responsibility
 * - GET /health (疎通用, access middleware を通さない)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::Strategy;

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "strategy": Strategy::NAME})),
    )
}

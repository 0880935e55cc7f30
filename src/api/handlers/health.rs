/*
 * Responsibility
 * - GET /health (liveness)
 * - Mounted outside the session pipeline: no cookie work, no backend call
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/*
 * Responsibility
 * - GET /, GET /dashboard[/...]: layout data for the rendering layer
 */
use axum::Json;

use crate::api::dto::LayoutData;
use crate::api::extractors::SessionCtx;

pub async fn layout(SessionCtx(ctx): SessionCtx) -> Json<LayoutData> {
    Json(LayoutData::from(&ctx))
}

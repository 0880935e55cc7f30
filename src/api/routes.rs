/*
 * Responsibility
 * - URL structure of the session-aware pages
 * - /health is mounted by app.rs outside the session pipeline
 */
use axum::{Router, routing::get};

use crate::api::handlers::{
    auth::{callback, login_page, logout, start_login},
    layout::layout,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(layout))
        .route("/login", get(login_page))
        .route("/auth/login", get(start_login))
        .route("/auth/callback", get(callback))
        .route("/logout", get(logout))
        .route("/dashboard", get(layout))
        .route("/dashboard/{*rest}", get(layout))
}

/*
 * Responsibility
 * - Config loading → dependency wiring → Router assembly
 * - Middleware application (session pipeline, security headers, http layers)
 * - Start with axum::serve()
 */
use std::{panic, process};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, handlers::health::health};
use crate::config::Config;
use crate::middleware;
use crate::services::{backend::build_backend_factory, session::SessionSettings};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,session_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr may be hidden by the process manager.
        tracing::error!(?info, "panic");

        // Development: fail fast. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!("starting in {:?} mode on {}", config.app_env, config.addr);

    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    // One shared transport; per-request clients are created by the session middleware.
    let backend = build_backend_factory(config)?;
    let settings = SessionSettings::from_config(config);

    tracing::debug!(
        cookie = %settings.cookie_name,
        secure = settings.cookie.secure,
        protected_prefix = %settings.guard.protected_prefix(),
        "session settings"
    );

    Ok(AppState::new(backend, settings))
}

fn build_router(state: AppState) -> Router {
    let pages = middleware::session::apply(api::routes(), state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .merge(pages)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}

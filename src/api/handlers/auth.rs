/*
 * Responsibility
 * - GET /login          provider link data for the login page
 * - GET /auth/login     server-side start: handshake cookies + redirect to the provider
 * - GET /auth/callback  state check + code exchange, always a redirect
 * - GET /logout         drop the session, redirect home
 *
 * The auth cookie itself is written by the session middleware after the handler returns.
 * An underivable request origin degrades like a missing provider (no link / login redirect).
 */
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::api::dto::LoginPageData;
use crate::api::extractors::{RequestOrigin, SessionCtx};
use crate::error::AppError;
use crate::services::oauth::{
    CallbackParams,
    handshake::{self, HOME_PATH, PROVIDER_COOKIE, STATE_COOKIE, VERIFIER_COOKIE},
};
use crate::services::session::{Outcome, guard::LOGIN_PATH};
use crate::state::AppState;

const HANDSHAKE_COOKIES: [&str; 3] = [STATE_COOKIE, PROVIDER_COOKIE, VERIFIER_COOKIE];

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

fn resolve_origin(origin: Result<RequestOrigin, AppError>) -> Option<String> {
    match origin {
        Ok(RequestOrigin(origin)) => Some(origin),
        Err(err) => {
            tracing::warn!(error = %err, "request origin unavailable for oauth2");
            None
        }
    }
}

pub async fn login_page(
    SessionCtx(ctx): SessionCtx,
    origin: Result<RequestOrigin, AppError>,
) -> Json<LoginPageData> {
    let Some(origin) = resolve_origin(origin) else {
        return Json(LoginPageData::default());
    };

    let link = handshake::initiate(&ctx, &origin).await;
    Json(link.into())
}

pub async fn start_login(
    State(state): State<AppState>,
    SessionCtx(ctx): SessionCtx,
    origin: Result<RequestOrigin, AppError>,
    jar: CookieJar,
) -> (CookieJar, Outcome) {
    let Some(origin) = resolve_origin(origin) else {
        return (jar, Outcome::redirect_to(LOGIN_PATH));
    };

    let link = handshake::initiate(&ctx, &origin).await;
    if link.is_empty() {
        return (jar, Outcome::redirect_to(LOGIN_PATH));
    }

    let policy = &state.settings.oauth;
    let jar = jar
        .add(policy.handshake_cookie(STATE_COOKIE, link.state))
        .add(policy.handshake_cookie(PROVIDER_COOKIE, link.provider))
        .add(policy.handshake_cookie(VERIFIER_COOKIE, link.code_verifier));

    (jar, Outcome::redirect_to(link.redirect))
}

pub async fn callback(
    State(state): State<AppState>,
    SessionCtx(ctx): SessionCtx,
    origin: Result<RequestOrigin, AppError>,
    jar: CookieJar,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> (CookieJar, Outcome) {
    // A malformed query is handled like an empty one: the state check rejects it.
    let Query(query) = query.unwrap_or_else(|rejection| {
        tracing::debug!(error = %rejection, "unreadable callback query");
        Query(CallbackQuery::default())
    });

    let cookie = |name: &str| jar.get(name).map(|c| c.value().to_owned());
    let params = CallbackParams {
        state: query.state,
        code: query.code,
        expected_state: cookie(STATE_COOKIE),
        provider: cookie(PROVIDER_COOKIE),
        code_verifier: cookie(VERIFIER_COOKIE),
    };

    let outcome = match resolve_origin(origin) {
        Some(origin) => handshake::complete(&ctx, &origin, params, &state.settings.oauth).await,
        None => Outcome::redirect_to(LOGIN_PATH),
    };

    // One-shot values: gone after the first callback, whatever the result.
    let jar = HANDSHAKE_COOKIES.into_iter().fold(jar, |jar, name| {
        jar.add(state.settings.oauth.expired_handshake_cookie(name))
    });

    (jar, outcome)
}

pub async fn logout(SessionCtx(ctx): SessionCtx) -> Outcome {
    ctx.backend().auth_store().clear();
    ctx.clear_user();
    Outcome::redirect_to(HOME_PATH)
}

//! Session pipeline: cookie → auth store → refresh → route guard → handler → set-cookie.
//!
//! Every request gets its own backend client. The `RequestContext` placed in the
//! request extensions shares that client's auth store, so whatever a handler does to
//! the session (OAuth2 login, logout) ends up in the cookie written here.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::services::session::{
    Outcome, RequestContext, cookie::write_auth_cookie, refresh::restore_session,
};
use crate::state::AppState;

/// Wrap `router` with the session pipeline.
///
/// ```ignore
/// let pages = api::routes();
/// let pages = middleware::session::apply(pages, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, session_middleware))
}

/// Browsers may split cookies over several headers (HTTP/2); treat them as one list.
fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ")
}

async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let settings = &state.settings;
    let client = state.backend.client();

    let cookies = cookie_header(req.headers());
    let user = restore_session(&client, &cookies, &settings.cookie_name).await;
    let ctx = RequestContext::new(client.clone(), user);

    let mut res = match settings.guard.check(req.uri().path(), ctx.user().as_ref()) {
        Outcome::Continue => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        redirect => {
            tracing::debug!(
                path = %req.uri().path(),
                location = redirect.location().unwrap_or_default(),
                "unauthenticated request to protected path"
            );
            redirect.into_response()
        }
    };

    // Written for every response, redirects included.
    write_auth_cookie(
        res.headers_mut(),
        client.auth_store(),
        &settings.cookie_name,
        &settings.cookie,
    );
    res
}

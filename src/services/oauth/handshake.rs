//! OAuth2 redirect handshake against the auth backend.
//!
//! The backend issues the provider list together with a fresh `state` and PKCE
//! verifier. The browser keeps `state` in a cookie between [`initiate`] and
//! [`complete`]; the callback is only accepted when the query `state` equals it.
//!
//! Every callback ends in a redirect, never in an error response.

use axum_extra::extract::cookie::{Cookie, SameSite};
use tracing::{debug, info, warn};

use crate::services::backend::{AuthProviderInfo, OAuth2Exchange, USERS_COLLECTION};
use crate::services::session::{Outcome, RequestContext, guard::LOGIN_PATH};

pub const CALLBACK_PATH: &str = "/auth/callback";
pub const HOME_PATH: &str = "/";

pub const STATE_COOKIE: &str = "state";
pub const PROVIDER_COOKIE: &str = "oauth_provider";
pub const VERIFIER_COOKIE: &str = "oauth_verifier";

const HANDSHAKE_COOKIE_TTL: time::Duration = time::Duration::minutes(10);

/// Where a failed code exchange sends the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeFailure {
    /// Log and continue to the home page as if the login worked.
    #[default]
    RedirectHome,
    /// Send the browser back to the login page.
    RedirectLogin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakePolicy {
    pub on_exchange_failure: ExchangeFailure,
    pub secure_cookies: bool,
}

fn to_login() -> Outcome {
    Outcome::redirect_to(LOGIN_PATH)
}

impl HandshakePolicy {

    /// Short-lived cookie carrying one handshake value between login and callback.
    pub fn handshake_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(HANDSHAKE_COOKIE_TTL)
            .build()
    }

    pub fn expired_handshake_cookie(&self, name: &'static str) -> Cookie<'static> {
        Cookie::build((name, ""))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

/// Login link handed to the login page. All fields are empty when no provider is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginLink {
    pub redirect: String,
    pub state: String,
    pub provider: String,
    pub code_verifier: String,
}

impl LoginLink {
    pub fn is_empty(&self) -> bool {
        self.redirect.is_empty()
    }
}

/// Values read from the callback request.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    // from the query string
    pub state: Option<String>,
    pub code: Option<String>,
    // from cookies written before the redirect to the provider
    pub expected_state: Option<String>,
    pub provider: Option<String>,
    pub code_verifier: Option<String>,
}

pub fn callback_url(origin: &str) -> String {
    format!("{}{CALLBACK_PATH}", origin.trim_end_matches('/'))
}

/// Prefer the provider named at login time, fall back to the first listed one.
fn select_provider<'a>(
    providers: &'a [AuthProviderInfo],
    preferred: Option<&str>,
) -> Option<&'a AuthProviderInfo> {
    preferred
        .and_then(|name| providers.iter().find(|p| p.name == name))
        .or_else(|| providers.first())
}

/// Build the provider login link for the first available provider.
pub async fn initiate(ctx: &RequestContext, origin: &str) -> LoginLink {
    let methods = match ctx
        .backend()
        .collection(USERS_COLLECTION)
        .list_auth_methods()
        .await
    {
        Ok(methods) => methods,
        Err(err) => {
            warn!(error = %err, "listing auth providers failed");
            return LoginLink::default();
        }
    };

    let Some(provider) = methods.auth_providers.into_iter().next() else {
        debug!("no oauth2 providers configured");
        return LoginLink::default();
    };

    LoginLink {
        redirect: format!("{}{}", provider.auth_url, callback_url(origin)),
        state: provider.state,
        provider: provider.name,
        code_verifier: provider.code_verifier,
    }
}

/// Validate the callback and exchange the code for a session.
///
/// On success the request's auth store and user are updated; the session middleware
/// persists them into the response cookie.
pub async fn complete(
    ctx: &RequestContext,
    origin: &str,
    params: CallbackParams,
    policy: &HandshakePolicy,
) -> Outcome {
    let records = ctx.backend().collection(USERS_COLLECTION);

    // Providers are fetched again; nothing is cached between login and callback.
    let methods = match records.list_auth_methods().await {
        Ok(methods) => methods,
        Err(err) => {
            warn!(error = %err, "listing auth providers failed");
            return to_login();
        }
    };

    let Some(provider) = select_provider(&methods.auth_providers, params.provider.as_deref())
    else {
        warn!("no auth providers available");
        return to_login();
    };

    match (params.expected_state.as_deref(), params.state.as_deref()) {
        (Some(expected), Some(received)) if !expected.is_empty() && expected == received => {}
        (expected, received) => {
            warn!(
                has_expected = expected.is_some_and(|s| !s.is_empty()),
                has_received = received.is_some(),
                "oauth state does not match expected"
            );
            return to_login();
        }
    }

    let exchange = OAuth2Exchange {
        provider: provider.name.clone(),
        code: params.code.unwrap_or_default(),
        code_verifier: params
            .code_verifier
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| provider.code_verifier.clone()),
        redirect_url: callback_url(origin),
    };

    match records.auth_with_oauth2(&exchange).await {
        Ok(resp) => {
            info!(
                provider = %exchange.provider,
                user_id = resp.record.id().unwrap_or_default(),
                "oauth2 login completed"
            );
            ctx.set_user(resp.record);
            Outcome::redirect_to(HOME_PATH)
        }
        Err(err) => {
            warn!(error = %err, provider = %exchange.provider, "oauth2 code exchange failed");
            match policy.on_exchange_failure {
                ExchangeFailure::RedirectHome => Outcome::redirect_to(HOME_PATH),
                ExchangeFailure::RedirectLogin => to_login(),
            }
        }
    }
}

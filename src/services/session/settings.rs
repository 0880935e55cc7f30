use crate::config::Config;
use crate::services::backend::CookieOptions;
use crate::services::oauth::{ExchangeFailure, HandshakePolicy};
use crate::services::session::guard::RouteGuard;

pub const DEFAULT_COOKIE_NAME: &str = "pb_auth";

/// Everything the session pipeline and the auth handlers need from configuration.
///
/// Note: kept separate from `Config` so the pipeline never reads the process environment
/// and tests can build it directly.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub cookie: CookieOptions,
    pub guard: RouteGuard,
    pub oauth: HandshakePolicy,
    // Fixed origin for callback URLs; derived from request headers when unset
    pub public_base_url: Option<String>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        let on_exchange_failure = if config.oauth_strict_exchange {
            ExchangeFailure::RedirectLogin
        } else {
            ExchangeFailure::RedirectHome
        };

        Self {
            cookie_name: config.auth_cookie_name.clone(),
            cookie: CookieOptions::new(config.app_env.is_production()),
            guard: RouteGuard::new(config.protected_prefix.clone()),
            oauth: HandshakePolicy {
                on_exchange_failure,
                secure_cookies: config.app_env.is_production(),
            },
            public_base_url: config.public_base_url.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie: CookieOptions::new(false),
            guard: RouteGuard::default(),
            oauth: HandshakePolicy::default(),
            public_base_url: None,
        }
    }
}

/*
 * Responsibility
 * - Read environment variables (.env supported): listen port, APP_ENV, backend URL,
 *   protected prefix, cookie name, public origin, OAuth2 exchange policy
 * - Validate them (startup fails when something is missing or malformed)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Auth backend
    pub backend_url: String,

    // Session
    pub protected_prefix: String,
    pub auth_cookie_name: String,

    // OAuth2
    pub public_base_url: Option<String>,
    pub oauth_strict_exchange: bool,
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let backend_url = lookup("BACKEND_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("BACKEND_URL"))?;
        Url::parse(&backend_url).map_err(|_| ConfigError::Invalid("BACKEND_URL"))?;

        let protected_prefix = lookup("PROTECTED_PREFIX")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "/dashboard".to_string());
        if !protected_prefix.starts_with('/') || protected_prefix.len() < 2 {
            return Err(ConfigError::Invalid("PROTECTED_PREFIX"));
        }

        let auth_cookie_name = lookup("AUTH_COOKIE_NAME")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "pb_auth".to_string());
        if !is_cookie_name(&auth_cookie_name) {
            return Err(ConfigError::Invalid("AUTH_COOKIE_NAME"));
        }

        // Only the origin is used to build callback URLs.
        let public_base_url = match lookup("PUBLIC_BASE_URL").filter(|s| !s.trim().is_empty()) {
            Some(raw) => {
                let url =
                    Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("PUBLIC_BASE_URL"))?;
                let origin = url.origin();
                if !origin.is_tuple() {
                    return Err(ConfigError::Invalid("PUBLIC_BASE_URL"));
                }
                Some(origin.ascii_serialization())
            }
            None => None,
        };

        let oauth_strict_exchange = match lookup("OAUTH_STRICT_EXCHANGE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("OAUTH_STRICT_EXCHANGE"))?,
            None => false,
        };

        Ok(Self {
            addr,
            app_env,
            backend_url,
            protected_prefix,
            auth_cookie_name,
            public_base_url,
            oauth_strict_exchange,
        })
    }
}

pub mod auth_store;
pub mod client;
pub mod factory;
pub mod handle;
pub mod http;

#[cfg(test)]
pub mod fake;

pub use auth_store::{AuthStore, CookieOptions};
pub use client::{AuthProviderInfo, OAuth2Exchange, UserRecord};
pub use factory::{BackendFactory, build_backend_factory};
pub use handle::BackendClient;

/// Every auth operation targets this collection.
pub const USERS_COLLECTION: &str = "users";

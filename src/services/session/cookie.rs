use axum::http::{HeaderMap, HeaderValue, header};

use crate::services::backend::{AuthStore, CookieOptions};

/// Append the auth cookie for the current store state to `headers`.
///
/// Appends rather than replaces, so cookies set by handlers (OAuth2 state) survive.
pub fn write_auth_cookie(
    headers: &mut HeaderMap,
    store: &AuthStore,
    cookie_name: &str,
    options: &CookieOptions,
) {
    let cookie = store.export_to_cookie(cookie_name, options);

    match HeaderValue::from_str(&cookie.encoded().to_string()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                cookie = cookie_name,
                "auth cookie is not a valid header value"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::fake::{live_token, user};

    #[test]
    fn appends_next_to_existing_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("state=abc; Path=/"));

        let store = AuthStore::new();
        store.save(live_token("u1"), Some(user("u1")));
        write_auth_cookie(&mut headers, &store, "pb_auth", &CookieOptions::new(true));

        let values: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[1].starts_with("pb_auth="));
        assert!(values[1].contains("Secure"));
        assert!(values[1].contains("SameSite=Lax"));
    }

    #[test]
    fn cleared_store_writes_removal_cookie() {
        let mut headers = HeaderMap::new();
        write_auth_cookie(&mut headers, &AuthStore::new(), "pb_auth", &CookieOptions::new(false));

        let value = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(value.starts_with("pb_auth=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(!value.contains("Secure"));
    }
}

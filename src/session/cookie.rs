//! Session cookie contract.
//!
//! The cookie is `HttpOnly`, `SameSite=Lax`, scoped to `/`, and marked `Secure`
//! only when the public site is served over HTTPS. The login handler writes
//! it, the logout handler clears it, and the gate only ever reads it.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};
use std::time::Duration;
use url::Url;

pub const SESSION_COOKIE_NAME: &str = "__session";

/// Five days, the longest lifetime the identity bridge hands out by default.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 5 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    ttl: Duration,
    secure: bool,
}

impl SessionConfig {
    /// Derive cookie settings from the public base URL of the site.
    #[must_use]
    pub fn new(public_base_url: &Url) -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            secure: public_base_url.scheme() == "https",
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }
}

/// Build the `Set-Cookie` value carrying a fresh session token.
///
/// # Errors
/// Returns an error if the token contains bytes not allowed in a header.
pub fn session_cookie(config: &SessionConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.ttl().as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if config.secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the `Set-Cookie` value that removes the session cookie.
///
/// # Errors
/// Returns an error if the header value cannot be built.
pub fn clear_session_cookie(config: &SessionConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Find the session token among the request cookies.
///
/// Empty values count as absent. Multiple `Cookie` headers are all searched.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME {
                let val = val.trim().trim_matches('"');
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

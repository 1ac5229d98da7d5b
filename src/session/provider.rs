//! Identity provider boundary.
//!
//! The gate and the auth handlers only see this trait. The concrete client
//! (`bridge::HttpIdentityProvider`) is built once at startup and injected;
//! tests use in-memory fakes.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::principal::Principal;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider looked at the credential and refused it (malformed,
    /// expired, revoked, unknown).
    #[error("credential rejected: {0}")]
    Rejected(String),
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider answered with unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("identity provider response could not be decoded: {0}")]
    Decode(String),
}

impl ProviderError {
    /// True when the credential itself was refused, as opposed to the
    /// provider being unreachable or misbehaving.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a session cookie. Implementations must honour `check_revoked`
    /// by asking the provider whether the session was invalidated server-side.
    async fn verify_session_cookie(
        &self,
        session_cookie: &str,
        check_revoked: bool,
    ) -> Result<Principal, ProviderError>;

    /// Exchange a short-lived ID token for a session cookie valid for `ttl`.
    async fn create_session_cookie(
        &self,
        id_token: &str,
        ttl: Duration,
    ) -> Result<String, ProviderError>;
}

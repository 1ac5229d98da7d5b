//! Turn a raw session token into a principal or a rejection.
//!
//! Every failure mode collapses into [`VerifyOutcome::Rejected`]; callers only
//! learn *that* a session is not usable, the reason is kept for logs and tests.

use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{principal::Principal, provider::IdentityProvider};

pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// No cookie, or an empty one. The provider was not called.
    Missing,
    /// Malformed, expired or revoked.
    Invalid,
    /// Provider unreachable, timed out, or answered nonsense.
    Unavailable,
}

impl Rejection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Invalid => "invalid",
            Self::Unavailable => "unavailable",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Authenticated(Principal),
    Rejected(Rejection),
}

impl VerifyOutcome {
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn into_principal(self) -> Option<Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Rejected(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct SessionVerifier {
    provider: Arc<dyn IdentityProvider>,
    timeout: Duration,
}

impl SessionVerifier {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Verify a session token with revocation checking.
    ///
    /// No retries and no caching: a failed attempt only affects this request.
    pub async fn verify(&self, token: Option<&str>) -> VerifyOutcome {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return VerifyOutcome::Rejected(Rejection::Missing);
        };

        match timeout(self.timeout, self.provider.verify_session_cookie(token, true)).await {
            Ok(Ok(principal)) => VerifyOutcome::Authenticated(principal),
            Ok(Err(err)) if err.is_rejection() => {
                debug!("session rejected: {err}");
                VerifyOutcome::Rejected(Rejection::Invalid)
            }
            Ok(Err(err)) => {
                warn!("session verification failed: {err}");
                VerifyOutcome::Rejected(Rejection::Unavailable)
            }
            Err(_) => {
                warn!(
                    "session verification timed out after {}ms",
                    self.timeout.as_millis()
                );
                VerifyOutcome::Rejected(Rejection::Unavailable)
            }
        }
    }
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

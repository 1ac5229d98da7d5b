//! Authenticated identity resolved from a session cookie.

use serde::{Deserialize, Serialize};

/// Identity derived from a verified session token.
///
/// Recomputed on every request; nothing in the service caches it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub email: String,
}

impl Principal {
    #[must_use]
    pub fn new(subject: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
        }
    }
}

//! Session tokens, principals, and the identity provider boundary.

pub mod bridge;
pub mod cookie;
pub mod credentials;
pub mod principal;
pub mod provider;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use self::cookie::{SESSION_COOKIE_NAME, SessionConfig, extract_session_token};
pub use self::principal::Principal;
pub use self::provider::{IdentityProvider, ProviderError};
pub use self::verifier::{Rejection, SessionVerifier, VerifyOutcome};

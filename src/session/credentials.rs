//! Service-account credentials for the identity bridge.
//!
//! Deployments pass the whole service-account document as one base64 blob
//! (handy for platforms that only offer single-line env vars). Without a blob
//! the bridge is called with ambient credentials, i.e. no auth headers, which
//! is what an emulator or an authenticating sidecar expects.

use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials are not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("credentials are not a valid service-account document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("credentials field `{0}` is empty")]
    EmptyField(&'static str),
}

#[derive(Deserialize)]
struct ServiceAccountDocument {
    project_id: String,
    client_email: String,
    api_key: String,
}

#[derive(Clone)]
pub struct IdentityCredentials {
    pub project_id: String,
    pub client_email: String,
    pub api_key: SecretString,
}

impl IdentityCredentials {
    /// Decode a base64-encoded service-account JSON document.
    ///
    /// # Errors
    /// Returns an error if the blob is not base64, not JSON, or has empty fields.
    pub fn from_base64(blob: &str) -> Result<Self, CredentialsError> {
        let compact: String = blob.chars().filter(|c| !c.is_whitespace()).collect();
        let raw = STANDARD.decode(compact.as_bytes())?;
        let document: ServiceAccountDocument = serde_json::from_slice(&raw)?;

        if document.project_id.trim().is_empty() {
            return Err(CredentialsError::EmptyField("project_id"));
        }
        if document.api_key.trim().is_empty() {
            return Err(CredentialsError::EmptyField("api_key"));
        }

        Ok(Self {
            project_id: document.project_id,
            client_email: document.client_email,
            api_key: SecretString::from(document.api_key),
        })
    }
}

impl std::fmt::Debug for IdentityCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("api_key", &"***")
            .finish()
    }
}

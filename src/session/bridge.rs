//! HTTP client for the hosted identity bridge.
//!
//! Flow Overview:
//! - `POST {base}/v1/sessions:verify` checks a session cookie (with revocation
//!   checking) and returns `{uid, email}`.
//! - `POST {base}/v1/sessions:create` exchanges an ID token for a session
//!   cookie with a given lifetime.
//!
//! `400/401/403/404` are read as "credential refused"; anything else that is
//! not a success is an unexpected status and surfaces as an outage.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::{
    credentials::IdentityCredentials,
    principal::Principal,
    provider::{IdentityProvider, ProviderError},
};
use crate::APP_USER_AGENT;

const VERIFY_PATH: &str = "v1/sessions:verify";
const CREATE_PATH: &str = "v1/sessions:create";
const PROJECT_HEADER: &str = "x-project-id";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    session_cookie: &'a str,
    check_revoked: bool,
}

#[derive(Deserialize)]
struct VerifyResponse {
    uid: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest<'a> {
    id_token: &'a str,
    valid_duration: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    session_cookie: String,
}

pub struct HttpIdentityProvider {
    client: Client,
    verify_url: Url,
    create_url: Url,
    credentials: Option<IdentityCredentials>,
}

impl HttpIdentityProvider {
    /// Build a client for the bridge rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is not absolute or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        credentials: Option<IdentityCredentials>,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            anyhow::bail!("identity URL cannot be used as a base: {base_url}");
        }
        // Url::join drops the last segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            verify_url: base.join(VERIFY_PATH)?,
            create_url: base.join(CREATE_PATH)?,
            credentials,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => request
                .bearer_auth(creds.api_key.expose_secret())
                .header(PROJECT_HEADER, &creds.project_id),
            None => request,
        }
    }
}

fn refused(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
    )
}

/// Pull the provider's error code out of a `{"error": {"message": ...}}` body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json["error"]["message"]
                .as_str()
                .or_else(|| json["error"].as_str())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| "no detail".to_string())
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip_all, fields(url = %self.verify_url))]
    async fn verify_session_cookie(
        &self,
        session_cookie: &str,
        check_revoked: bool,
    ) -> Result<Principal, ProviderError> {
        let payload = VerifyRequest {
            session_cookie,
            check_revoked,
        };

        let response = self
            .authorize(self.client.post(self.verify_url.clone()))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if refused(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(error_message(&body)));
        }
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus(status.as_u16()));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        if body.uid.is_empty() {
            return Err(ProviderError::Decode("empty uid".to_string()));
        }

        debug!("session cookie verified");

        Ok(Principal::new(body.uid, body.email.unwrap_or_default()))
    }

    #[instrument(skip_all, fields(url = %self.create_url))]
    async fn create_session_cookie(
        &self,
        id_token: &str,
        ttl: Duration,
    ) -> Result<String, ProviderError> {
        let payload = CreateRequest {
            id_token,
            valid_duration: ttl.as_secs(),
        };

        let response = self
            .authorize(self.client.post(self.create_url.clone()))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if refused(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(error_message(&body)));
        }
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus(status.as_u16()));
        }

        let body: CreateResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        if body.session_cookie.is_empty() {
            return Err(ProviderError::Decode("empty session cookie".to_string()));
        }

        Ok(body.session_cookie)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_joined_under_base_path() {
        let provider =
            HttpIdentityProvider::new("http://127.0.0.1:9099/identity", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            provider.verify_url.as_str(),
            "http://127.0.0.1:9099/identity/v1/sessions:verify"
        );
        assert_eq!(
            provider.create_url.as_str(),
            "http://127.0.0.1:9099/identity/v1/sessions:create"
        );
    }

    #[test]
    fn rejects_relative_urls() {
        assert!(HttpIdentityProvider::new("identity", None, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn error_message_reads_nested_and_flat_shapes() {
        assert_eq!(
            error_message(r#"{"error":{"code":401,"message":"SESSION_COOKIE_REVOKED"}}"#),
            "SESSION_COOKIE_REVOKED"
        );
        assert_eq!(error_message(r#"{"error":"expired"}"#), "expired");
        assert_eq!(error_message("<html>"), "no detail");
    }

    #[test]
    fn refused_statuses() {
        assert!(refused(StatusCode::UNAUTHORIZED));
        assert!(refused(StatusCode::BAD_REQUEST));
        assert!(!refused(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!refused(StatusCode::OK));
    }
}

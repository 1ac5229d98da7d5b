//! In-memory identity provider for unit tests.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use super::{
    principal::Principal,
    provider::{IdentityProvider, ProviderError},
};

#[derive(Default)]
pub(crate) struct FakeProvider {
    sessions: HashMap<String, Principal>,
    id_tokens: HashMap<String, String>,
    failing: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    check_revoked: AtomicBool,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_session(mut self, token: &str, subject: &str, email: &str) -> Self {
        self.sessions
            .insert(token.to_string(), Principal::new(subject, email));
        self
    }

    pub(crate) fn with_id_token(mut self, id_token: &str, session: &str) -> Self {
        self.id_tokens
            .insert(id_token.to_string(), session.to_string());
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn saw_check_revoked(&self) -> bool {
        self.check_revoked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn verify_session_cookie(
        &self,
        session_cookie: &str,
        check_revoked: bool,
    ) -> Result<Principal, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_revoked.store(check_revoked, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(ProviderError::UnexpectedStatus(503));
        }
        self.sessions
            .get(session_cookie)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("SESSION_COOKIE_REVOKED".to_string()))
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        _ttl: Duration,
    ) -> Result<String, ProviderError> {
        if self.failing {
            return Err(ProviderError::UnexpectedStatus(503));
        }
        self.id_tokens
            .get(id_token)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("INVALID_ID_TOKEN".to_string()))
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use atelier::{
    gate::{RouteGate, RouteMatcher},
    maintenance::{MaintenanceFlag, StaticFlag},
    session::{IdentityProvider, Principal, ProviderError, SessionConfig, SessionVerifier},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::Response,
};
use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

pub const VALID_SESSION: &str = "session-ok";
pub const VALID_ID_TOKEN: &str = "id-token-ok";

/// In-memory identity provider standing in for the bridge.
#[derive(Default)]
pub struct StubProvider {
    sessions: HashMap<String, Principal>,
    id_tokens: HashMap<String, String>,
    down: bool,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
            .with_session(VALID_SESSION, "uid-1", "editor@studio.example")
            .with_id_token(VALID_ID_TOKEN, VALID_SESSION)
    }

    pub fn with_session(mut self, token: &str, subject: &str, email: &str) -> Self {
        self.sessions
            .insert(token.to_string(), Principal::new(subject, email));
        self
    }

    pub fn with_id_token(mut self, id_token: &str, session: &str) -> Self {
        self.id_tokens
            .insert(id_token.to_string(), session.to_string());
        self
    }

    pub fn down(mut self) -> Self {
        self.down = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn verify_session_cookie(
        &self,
        session_cookie: &str,
        _check_revoked: bool,
    ) -> Result<Principal, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
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
        if self.down {
            return Err(ProviderError::UnexpectedStatus(503));
        }
        self.id_tokens
            .get(id_token)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("INVALID_ID_TOKEN".to_string()))
    }
}

pub fn app(provider: Arc<StubProvider>, maintenance: bool, site_dir: &Path) -> Router {
    app_with_flag(provider, Arc::new(StaticFlag::new(maintenance)), site_dir)
}

pub fn app_with_flag(
    provider: Arc<StubProvider>,
    flag: Arc<dyn MaintenanceFlag>,
    site_dir: &Path,
) -> Router {
    let verifier = SessionVerifier::new(provider);
    let gate = RouteGate::new(RouteMatcher::new(), verifier, flag);
    atelier::api::router(
        Arc::new(gate),
        SessionConfig::new(&url::Url::parse("https://studio.example").expect("url")),
        site_dir.to_path_buf(),
    )
}

/// A site directory with a home page, an about page and one static asset.
pub fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("site dir");
    std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").expect("index");
    std::fs::write(dir.path().join("about.html"), "<h1>about</h1>").expect("about");
    std::fs::create_dir_all(dir.path().join("static")).expect("static dir");
    std::fs::write(dir.path().join("static/site.css"), "body{}").expect("css");
    std::fs::create_dir_all(dir.path().join("admin/login")).expect("admin dir");
    std::fs::write(dir.path().join("admin/index.html"), "<h1>dashboard</h1>").expect("admin");
    std::fs::write(dir.path().join("admin/login/index.html"), "<h1>login</h1>").expect("login");
    std::fs::write(dir.path().join("admin/login-bg.jpg"), "jpg").expect("bg");
    dir
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8_lossy(&bytes).into_owned()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("json body")
}

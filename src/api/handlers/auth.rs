//! Session endpoints: login, logout, and a session check for browser code.
//!
//! These routes live under the auth API prefix, which the gate never blocks,
//! so they stay reachable during maintenance and without a session.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    gate::RouteGate,
    session::{
        SessionConfig, VerifyOutcome,
        cookie::{clear_session_cookie, session_cookie},
        extract_session_token,
    },
};

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(rename = "idToken")]
    id_token: String,
}

/// Exchange an identity-provider ID token for a session cookie.
pub async fn login(
    gate: Extension<Arc<RouteGate>>,
    session: Extension<SessionConfig>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let id_token = match payload {
        Some(Json(request)) if !request.id_token.trim().is_empty() => request.id_token,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing idToken" })),
            )
                .into_response();
        }
    };

    let provider = gate.verifier().provider();
    let token = match provider
        .create_session_cookie(id_token.trim(), session.ttl())
        .await
    {
        Ok(token) => token,
        Err(err) if err.is_rejection() => {
            warn!("Login rejected: {err}");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response();
        }
        Err(err) => {
            error!("Failed to create session cookie: {err}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Identity provider unavailable" })),
            )
                .into_response();
        }
    };

    let cookie = match session_cookie(&session, &token) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    info!("Session created");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    (
        StatusCode::OK,
        headers,
        Json(json!({ "status": "success" })),
    )
        .into_response()
}

pub async fn logout(session: Extension<SessionConfig>) -> impl IntoResponse {
    // Always clear the cookie, even without a session.
    let mut headers = HeaderMap::new();
    match clear_session_cookie(&session) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }
    (
        StatusCode::OK,
        headers,
        Json(json!({ "status": "success" })),
    )
}

/// Verify the session cookie in-process and report who it belongs to.
pub async fn session(headers: HeaderMap, gate: Extension<Arc<RouteGate>>) -> impl IntoResponse {
    let token = extract_session_token(&headers);
    match gate.verifier().verify(token.as_deref()).await {
        VerifyOutcome::Authenticated(principal) => (
            StatusCode::OK,
            Json(json!({
                "authenticated": true,
                "uid": principal.subject,
                "email": principal.email,
            })),
        ),
        VerifyOutcome::Rejected(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false })),
        ),
    }
}

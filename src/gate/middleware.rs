//! axum middleware applying [`RouteGate`] decisions.
//!
//! The layer must wrap the router as a service (not `Router::layer`) so that
//! maintenance rewrites happen before routing.

use axum::{
    extract::{Request, State},
    http::{StatusCode, Uri, header::CACHE_CONTROL},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use super::{Decision, RouteGate};
use crate::session::extract_session_token;

/// Marks a request that was rewritten to the maintenance page.
#[derive(Clone, Debug)]
pub struct MaintenanceRewrite {
    pub original_path: String,
}

pub async fn route_gate(
    State(gate): State<Arc<RouteGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_session_token(request.headers());
    let path = request.uri().path().to_string();

    let decision = gate.evaluate(&path, token.as_deref()).await;

    debug!(path = %path, decision = decision.as_str(), "route gate");

    match decision {
        Decision::Allow(principal) => {
            if let Some(principal) = principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        Decision::RedirectLogin => redirect(gate.matcher().login_path()),
        Decision::RedirectHome => redirect(gate.matcher().home_path()),
        Decision::RejectPath => StatusCode::BAD_REQUEST.into_response(),
        Decision::RewriteMaintenance => {
            let target = gate.matcher().maintenance_path();
            match target.parse::<Uri>() {
                Ok(uri) => {
                    *request.uri_mut() = uri;
                    request
                        .extensions_mut()
                        .insert(MaintenanceRewrite { original_path: path });
                    next.run(request).await
                }
                Err(err) => {
                    error!("Invalid maintenance path {target}: {err}");
                    StatusCode::SERVICE_UNAVAILABLE.into_response()
                }
            }
        }
    }
}

fn redirect(location: &str) -> Response {
    ([(CACHE_CONTROL, "no-store")], Redirect::temporary(location)).into_response()
}

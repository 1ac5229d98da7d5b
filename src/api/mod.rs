use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::{path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower::{Layer, ServiceBuilder};
use tower_http::{
    request_id::PropagateRequestIdLayer, services::ServeDir, set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span, warn};
use ulid::Ulid;

use crate::{
    gate::{RouteGate, route_gate},
    session::SessionConfig,
};

pub mod handlers;

use handlers::{auth, health, maintenance, maintenance::SiteConfig};

/// Build the full application: site routes and static files behind the gate,
/// with request ids and tracing around everything.
pub fn router(gate: Arc<RouteGate>, session: SessionConfig, site_dir: PathBuf) -> Router {
    let site = Router::new()
        .route("/health", get(health::health).options(health::health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route(gate.matcher().maintenance_path(), get(maintenance::maintenance))
        .fallback_service(ServeDir::new(&site_dir))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(gate.clone()))
                .layer(Extension(session))
                .layer(Extension(SiteConfig { site_dir })),
        );

    // The gate wraps the site router as a service so maintenance rewrites are
    // applied before routing.
    let gated = from_fn_with_state(gate, route_gate).layer(site);

    Router::new().fallback_service(gated).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    gate: Arc<RouteGate>,
    session: SessionConfig,
    site_dir: PathBuf,
) -> Result<()> {
    if !site_dir.is_dir() {
        warn!(
            "Site directory {} does not exist, only API routes will answer",
            site_dir.display()
        );
    }

    let app = router(gate, session, site_dir);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {err}");
                std::future::pending::<()>().await;
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

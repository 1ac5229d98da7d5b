//! Route gate: the single decision point in front of every handler.
//!
//! Flow Overview:
//! - Resolve the path the way the static file service will (percent-decoded,
//!   `.`/`..` and repeated slashes folded). Undecodable paths are refused.
//! - Classify the path with the [`RouteMatcher`].
//! - Public page while the maintenance flag is up: rewrite to the maintenance page.
//! - Protected area: verify the session cookie. No principal means a redirect
//!   to the login page, a principal on the login page means a redirect to the
//!   protected area's landing page.
//! - Everything else passes through.
//!
//! Evaluation has no side effects, so the same request and cookie always
//! produce the same decision.

pub mod decision;
pub mod matcher;
pub mod middleware;

pub use self::decision::Decision;
pub use self::matcher::{PathPattern, RouteClass, RouteMatcher, canonical_path};
pub use self::middleware::{MaintenanceRewrite, route_gate};

use std::sync::Arc;

use crate::{maintenance::MaintenanceFlag, session::SessionVerifier};

#[derive(Clone, Debug)]
pub struct RouteGate {
    matcher: RouteMatcher,
    verifier: SessionVerifier,
    maintenance: Arc<dyn MaintenanceFlag>,
}

impl RouteGate {
    #[must_use]
    pub fn new(
        matcher: RouteMatcher,
        verifier: SessionVerifier,
        maintenance: Arc<dyn MaintenanceFlag>,
    ) -> Self {
        Self {
            matcher,
            verifier,
            maintenance,
        }
    }

    #[must_use]
    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    #[must_use]
    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    pub async fn maintenance_enabled(&self) -> bool {
        self.maintenance.is_enabled().await
    }

    pub async fn evaluate(&self, path: &str, token: Option<&str>) -> Decision {
        // Classify the path the static file service will actually resolve.
        let Some(path) = canonical_path(path) else {
            return Decision::RejectPath;
        };

        match self.matcher.classify(&path) {
            RouteClass::Public => {
                if self.maintenance.is_enabled().await {
                    Decision::RewriteMaintenance
                } else {
                    Decision::Allow(None)
                }
            }
            RouteClass::Excluded | RouteClass::LoginAsset => Decision::Allow(None),
            RouteClass::Protected => match self.verifier.verify(token).await.into_principal() {
                Some(principal) => Decision::Allow(Some(principal)),
                None => Decision::RedirectLogin,
            },
            RouteClass::Login => match self.verifier.verify(token).await.into_principal() {
                Some(_) => Decision::RedirectHome,
                None => Decision::Allow(None),
            },
        }
    }
}

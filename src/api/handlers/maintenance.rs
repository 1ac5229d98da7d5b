use axum::{
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, RETRY_AFTER},
    },
    response::{Html, IntoResponse},
};
use std::path::PathBuf;
use tracing::debug;

use crate::gate::MaintenanceRewrite;

const RETRY_AFTER_SECONDS: &str = "600";

const MAINTENANCE_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<title>Back soon</title>
</head>
<body>
<main>
<h1>We are polishing a few things.</h1>
<p>The studio site is down for scheduled maintenance. Please check back shortly.</p>
</main>
</body>
</html>
"#;

#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub site_dir: PathBuf,
}

/// Serve the maintenance page.
///
/// Rewritten requests get `503` so crawlers keep the real page indexed; a
/// direct visit is an ordinary `200`.
pub async fn maintenance(
    site: Extension<SiteConfig>,
    rewrite: Option<Extension<MaintenanceRewrite>>,
) -> impl IntoResponse {
    let custom = site.site_dir.join("maintenance.html");
    let page = match tokio::fs::read_to_string(&custom).await {
        Ok(page) => page,
        Err(err) => {
            debug!("Using built-in maintenance page ({}: {err})", custom.display());
            MAINTENANCE_HTML.to_string()
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    match rewrite {
        Some(Extension(rewrite)) => {
            debug!("Maintenance page served for {}", rewrite.original_path);
            headers.insert(RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECONDS));
            (StatusCode::SERVICE_UNAVAILABLE, headers, Html(page))
        }
        None => (StatusCode::OK, headers, Html(page)),
    }
}

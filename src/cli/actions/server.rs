use crate::{
    api,
    cli::commands::{gate, identity},
    gate::{RouteGate, RouteMatcher},
    maintenance::{MaintenanceFlag, SettingsFileFlag, StaticFlag},
    session::{SessionConfig, SessionVerifier, bridge::HttpIdentityProvider, credentials::IdentityCredentials},
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub identity: identity::Options,
    pub gate: gate::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is inconsistent or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let gate = build_gate(&args)?;
    let session = session_config(&args.gate)?;

    api::new(
        args.port,
        Arc::new(gate),
        session,
        PathBuf::from(&args.gate.site_dir),
    )
    .await
}

/// Assemble the route gate from parsed options.
///
/// # Errors
/// Returns an error if the credentials cannot be decoded, the identity URL is
/// invalid, or the route layout is inconsistent.
pub fn build_gate(args: &Args) -> Result<RouteGate> {
    let credentials = args
        .identity
        .credentials
        .as_deref()
        .map(IdentityCredentials::from_base64)
        .transpose()
        .context("Could not decode identity credentials")?;

    let timeout = Duration::from_millis(args.identity.verify_timeout_ms);
    let provider = HttpIdentityProvider::new(&args.identity.url, credentials, timeout)
        .context("Could not build identity bridge client")?;
    let verifier = SessionVerifier::new(Arc::new(provider)).with_timeout(timeout);

    let matcher = RouteMatcher::new()
        .with_protected_prefix(&args.gate.protected_prefix)
        .with_login_path(&args.gate.login_path)
        .with_maintenance_path(&args.gate.maintenance_path)
        .with_excluded(&args.gate.exclude)
        .with_login_assets(&args.gate.login_assets);
    matcher.validate().context("Invalid route layout")?;

    Ok(RouteGate::new(matcher, verifier, maintenance_flag(&args.gate)))
}

fn maintenance_flag(options: &gate::Options) -> Arc<dyn MaintenanceFlag> {
    match &options.settings_file {
        Some(path) => Arc::new(SettingsFileFlag::new(path)),
        None => Arc::new(StaticFlag::parse(options.maintenance.as_deref())),
    }
}

fn session_config(options: &gate::Options) -> Result<SessionConfig> {
    let public_base_url =
        Url::parse(&options.public_base_url).context("Invalid public base URL")?;
    Ok(SessionConfig::new(&public_base_url).with_ttl_seconds(options.session_ttl_seconds))
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("identity_url", args.identity.url.clone()),
        (
            "identity_credentials_set",
            args.identity.credentials.is_some().to_string(),
        ),
        (
            "verify_timeout_ms",
            args.identity.verify_timeout_ms.to_string(),
        ),
        ("protected_prefix", args.gate.protected_prefix.clone()),
        ("login_path", args.gate.login_path.clone()),
        ("maintenance_path", args.gate.maintenance_path.clone()),
        (
            "maintenance",
            args.gate
                .settings_file
                .as_ref()
                .map_or_else(
                    || args.gate.maintenance.clone().unwrap_or_else(|| "off".to_string()),
                    |path| format!("settings file {path}"),
                ),
        ),
        ("site_dir", args.gate.site_dir.clone()),
        ("public_base_url", args.gate.public_base_url.clone()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = String::from("Startup configuration:");
    for (key, value) in &entries {
        message.push_str(&format!("\n  {key:<max_key_len$}  {value}"));
    }
    info!("{message}");
}

//! Maintenance flag sources.
//!
//! The gate reads the flag once per request. Any failure to read it means
//! "not in maintenance": a broken settings file must never take the whole
//! site down. Stale reads are fine.

use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt, io, path::PathBuf};
use thiserror::Error;
use tracing::warn;

#[async_trait]
pub trait MaintenanceFlag: Send + Sync + fmt::Debug {
    async fn is_enabled(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("maintenance_mode is not set")]
    Unset,
}

/// Flag fixed at startup from process configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticFlag(bool);

impl StaticFlag {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self(enabled)
    }

    /// Lenient parse of a configuration value; anything unrecognised is off.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self(false);
        };
        match parse_bool(raw) {
            Some(enabled) => Self(enabled),
            None => {
                warn!("unrecognised maintenance mode value {raw:?}, treating as off");
                Self(false)
            }
        }
    }
}

#[async_trait]
impl MaintenanceFlag for StaticFlag {
    async fn is_enabled(&self) -> bool {
        self.0
    }
}

#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Deserialize)]
struct SiteSettings {
    maintenance_mode: Option<bool>,
}

/// Flag persisted in the site settings document, re-read on every check so
/// that toggling it from the back-office takes effect without a restart.
#[derive(Clone, Debug)]
pub struct SettingsFileFlag {
    path: PathBuf,
}

impl SettingsFileFlag {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<bool, SettingsError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let settings: SiteSettings = serde_json::from_str(&raw)?;
        settings.maintenance_mode.ok_or(SettingsError::Unset)
    }
}

#[async_trait]
impl MaintenanceFlag for SettingsFileFlag {
    async fn is_enabled(&self) -> bool {
        self.read().await.unwrap_or_else(|err| {
            warn!(
                "cannot read maintenance flag from {}: {err}",
                self.path.display()
            );
            false
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::{fs, io::Write};

    #[tokio::test]
    async fn static_flag_parses_leniently() {
        assert!(StaticFlag::parse(Some("true")).is_enabled().await);
        assert!(StaticFlag::parse(Some(" ON ")).is_enabled().await);
        assert!(StaticFlag::parse(Some("1")).is_enabled().await);
        assert!(!StaticFlag::parse(Some("off")).is_enabled().await);
        assert!(!StaticFlag::parse(Some("")).is_enabled().await);
        assert!(!StaticFlag::parse(None).is_enabled().await);
    }

    #[tokio::test]
    async fn static_flag_fails_open_on_garbage() {
        assert!(!StaticFlag::parse(Some("maybe")).is_enabled().await);
    }

    #[tokio::test]
    async fn settings_file_flag_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"site_name":"Studio","maintenance_mode":true}}"#).unwrap();
        let flag = SettingsFileFlag::new(file.path());
        assert!(flag.is_enabled().await);
    }

    #[tokio::test]
    async fn settings_file_flag_follows_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let flag = SettingsFileFlag::new(&path);

        fs::write(&path, r#"{"maintenance_mode":true}"#).unwrap();
        assert!(flag.is_enabled().await);

        fs::write(&path, r#"{"maintenance_mode":false}"#).unwrap();
        assert!(!flag.is_enabled().await);
    }

    #[tokio::test]
    async fn settings_file_flag_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SettingsFileFlag::new(dir.path().join("missing.json"));
        assert!(!missing.is_enabled().await);

        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(!SettingsFileFlag::new(&path).is_enabled().await);

        let path = dir.path().join("wrong-type.json");
        fs::write(&path, r#"{"maintenance_mode":"yes"}"#).unwrap();
        assert!(!SettingsFileFlag::new(&path).is_enabled().await);

        let path = dir.path().join("unset.json");
        fs::write(&path, r#"{"site_name":"Studio"}"#).unwrap();
        assert!(!SettingsFileFlag::new(&path).is_enabled().await);
    }

    #[tokio::test]
    async fn settings_read_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SettingsFileFlag::new(dir.path().join("missing.json"));
        assert!(matches!(missing.read().await, Err(SettingsError::Io(_))));

        let path = dir.path().join("settings.json");
        let flag = SettingsFileFlag::new(&path);

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(flag.read().await, Err(SettingsError::Json(_))));

        fs::write(&path, r#"{"site_name":"Studio"}"#).unwrap();
        assert!(matches!(flag.read().await, Err(SettingsError::Unset)));

        fs::write(&path, r#"{"maintenance_mode":true}"#).unwrap();
        assert!(matches!(flag.read().await, Ok(true)));
    }
}

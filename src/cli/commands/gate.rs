use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::{
    gate::matcher::{
        DEFAULT_EXCLUDED, DEFAULT_LOGIN_ASSETS, DEFAULT_LOGIN_PATH, DEFAULT_MAINTENANCE_PATH,
        DEFAULT_PROTECTED_PREFIX,
    },
    session::cookie::DEFAULT_SESSION_TTL_SECONDS,
};

pub const ARG_MAINTENANCE: &str = "maintenance";
pub const ARG_SETTINGS_FILE: &str = "settings-file";
pub const ARG_PROTECTED_PREFIX: &str = "protected-prefix";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_MAINTENANCE_PATH: &str = "maintenance-path";
pub const ARG_EXCLUDE: &str = "exclude";
pub const ARG_LOGIN_ASSETS: &str = "login-assets";
pub const ARG_SITE_DIR: &str = "site-dir";
pub const ARG_PUBLIC_BASE_URL: &str = "public-base-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub maintenance: Option<String>,
    pub settings_file: Option<String>,
    pub protected_prefix: String,
    pub login_path: String,
    pub maintenance_path: String,
    pub exclude: Vec<String>,
    pub login_assets: Vec<String>,
    pub site_dir: String,
    pub public_base_url: String,
    pub session_ttl_seconds: u64,
}

impl Options {
    /// Parse gate arguments from matches.
    ///
    /// # Errors
    /// Returns an error if an argument with a default is somehow missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };
        let required = |id: &str| {
            get_non_empty(id).ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };
        let many = |id: &str| -> Vec<String> {
            matches
                .get_many::<String>(id)
                .map(|values| {
                    values
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect()
                })
                .unwrap_or_default()
        };

        Ok(Self {
            maintenance: get_non_empty(ARG_MAINTENANCE),
            settings_file: get_non_empty(ARG_SETTINGS_FILE),
            protected_prefix: required(ARG_PROTECTED_PREFIX)?,
            login_path: required(ARG_LOGIN_PATH)?,
            maintenance_path: required(ARG_MAINTENANCE_PATH)?,
            exclude: many(ARG_EXCLUDE),
            login_assets: many(ARG_LOGIN_ASSETS),
            site_dir: required(ARG_SITE_DIR)?,
            public_base_url: required(ARG_PUBLIC_BASE_URL)?,
            session_ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_maintenance_args(command);
    let command = with_route_args(command);
    with_session_args(command)
}

fn with_maintenance_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAINTENANCE)
                .long(ARG_MAINTENANCE)
                .help("Maintenance mode: true/false, on/off, 1/0 (unrecognised values mean off)")
                .env("ATELIER_MAINTENANCE_MODE"),
        )
        .arg(
            Arg::new(ARG_SETTINGS_FILE)
                .long(ARG_SETTINGS_FILE)
                .help("Site settings JSON document; its `maintenance_mode` field overrides --maintenance")
                .long_help(
                    "Path to the persisted site settings JSON document. The `maintenance_mode` boolean is re-read on every public request, so it can be toggled without a restart. An unreadable file means maintenance is off.",
                )
                .env("ATELIER_SETTINGS_FILE"),
        )
}

fn with_route_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROTECTED_PREFIX)
                .long(ARG_PROTECTED_PREFIX)
                .help("Path prefix of the protected admin area")
                .env("ATELIER_PROTECTED_PREFIX")
                .default_value(DEFAULT_PROTECTED_PREFIX),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Login page, must be inside the protected area")
                .env("ATELIER_LOGIN_PATH")
                .default_value(DEFAULT_LOGIN_PATH),
        )
        .arg(
            Arg::new(ARG_MAINTENANCE_PATH)
                .long(ARG_MAINTENANCE_PATH)
                .help("Page served in place of public pages during maintenance")
                .env("ATELIER_MAINTENANCE_PATH")
                .default_value(DEFAULT_MAINTENANCE_PATH),
        )
        .arg(
            Arg::new(ARG_EXCLUDE)
                .long(ARG_EXCLUDE)
                .help("Comma separated paths never gated (exact, or prefix written as /dir/*)")
                .env("ATELIER_EXCLUDE")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .default_values(DEFAULT_EXCLUDED.iter().copied()),
        )
        .arg(
            Arg::new(ARG_LOGIN_ASSETS)
                .long(ARG_LOGIN_ASSETS)
                .help("Comma separated assets inside the protected area that the login page needs")
                .env("ATELIER_LOGIN_ASSETS")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .default_values(DEFAULT_LOGIN_ASSETS.iter().copied()),
        )
        .arg(
            Arg::new(ARG_SITE_DIR)
                .long(ARG_SITE_DIR)
                .help("Directory with the static site")
                .env("ATELIER_SITE_DIR")
                .default_value("public"),
        )
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PUBLIC_BASE_URL)
                .long(ARG_PUBLIC_BASE_URL)
                .help("Public base URL of the site; https enables Secure cookies")
                .env("ATELIER_PUBLIC_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie lifetime in seconds")
                .env("ATELIER_SESSION_TTL_SECONDS")
                .default_value("432000")
                .value_parser(clap::value_parser!(u64)),
        )
}

use clap::{Arg, ArgMatches, Command};

use crate::session::verifier::DEFAULT_VERIFY_TIMEOUT;

pub const ARG_IDENTITY_URL: &str = "identity-url";
pub const ARG_IDENTITY_CREDENTIALS: &str = "identity-credentials";
pub const ARG_VERIFY_TIMEOUT_MS: &str = "verify-timeout-ms";

#[derive(Clone)]
pub struct Options {
    pub url: String,
    pub credentials: Option<String>,
    pub verify_timeout_ms: u64,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("url", &self.url)
            .field("credentials", &self.credentials.as_ref().map(|_| "***"))
            .field("verify_timeout_ms", &self.verify_timeout_ms)
            .finish()
    }
}

impl Options {
    /// Parse identity bridge arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the identity URL is missing or empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let url = match matches.get_one::<String>(ARG_IDENTITY_URL).cloned() {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => anyhow::bail!("missing required argument: --{ARG_IDENTITY_URL}"),
        };

        Ok(Self {
            url,
            credentials: matches
                .get_one::<String>(ARG_IDENTITY_CREDENTIALS)
                .cloned()
                .filter(|v| !v.trim().is_empty()),
            verify_timeout_ms: matches
                .get_one::<u64>(ARG_VERIFY_TIMEOUT_MS)
                .copied()
                .unwrap_or_else(|| {
                    u64::try_from(DEFAULT_VERIFY_TIMEOUT.as_millis()).unwrap_or(5000)
                }),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Base URL of the identity bridge, example: https://identity.internal:9443")
                .env("ATELIER_IDENTITY_URL"),
        )
        .arg(
            Arg::new(ARG_IDENTITY_CREDENTIALS)
                .long(ARG_IDENTITY_CREDENTIALS)
                .help("Base64 encoded service-account JSON; omit to use ambient credentials")
                .env("ATELIER_IDENTITY_CREDENTIALS")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_VERIFY_TIMEOUT_MS)
                .long(ARG_VERIFY_TIMEOUT_MS)
                .help("Hard ceiling for one session verification, in milliseconds")
                .env("ATELIER_VERIFY_TIMEOUT_MS")
                .default_value("5000")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

use crate::cli::{
    actions::{Action, server::Args},
    commands::{gate, identity},
};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let identity = identity::Options::parse(matches)?;
    let gate = gate::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        identity,
        gate,
    }))
}

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, http, ARG_DSN, ARG_ENV, ARG_PORT};
use crate::cli::globals::Environment;
use anyhow::Result;
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let environment = matches
        .get_one::<Environment>(ARG_ENV)
        .copied()
        .unwrap_or_default();
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .map(SecretString::from);

    let auth_opts = auth::Options::parse(matches)?;
    let http_opts = http::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        environment,
        dsn,
        bcrypt_cost: auth_opts.bcrypt_cost,
        cors_origins: http_opts.cors_origins,
    }))
}

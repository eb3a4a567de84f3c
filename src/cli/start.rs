use crate::cli::{
    actions::Action,
    commands::{self, ARG_ENV},
    dispatch, dotenv,
    globals::Environment,
    telemetry,
};
use anyhow::{Context, Result};
use tracing::info;

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8) -> Option<tracing::Level> {
    match verbosity {
        0 => None,
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}

fn selected_environment(matches: &clap::ArgMatches) -> Environment {
    matches
        .get_one::<Environment>(ARG_ENV)
        .copied()
        .unwrap_or_default()
}

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if the dotenv file is invalid, or telemetry initialization
/// or action dispatch fails
pub fn start() -> Result<Action> {
    // 1. First pass only decides which `.env.<environment>` to load
    let environment = selected_environment(&commands::new().get_matches());

    // 2. Load it, then parse again so its values back the `env` fallbacks
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let dotenv_path = dotenv::load(environment, &cwd)?;
    let matches = commands::new().get_matches();

    // 3. Extract verbosity level
    let verbosity_level = get_verbosity_level(
        matches
            .get_one::<u8>(commands::logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
    );

    // 4. Initialize telemetry
    telemetry::init(verbosity_level, selected_environment(&matches))?;

    if let Some(path) = dotenv_path {
        info!("Loaded {}", path.display());
    }

    // 5. Dispatch to appropriate action
    dispatch::handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(get_verbosity_level(0), None);
        assert_eq!(get_verbosity_level(1), Some(tracing::Level::WARN));
        assert_eq!(get_verbosity_level(2), Some(tracing::Level::INFO));
        assert_eq!(get_verbosity_level(3), Some(tracing::Level::DEBUG));
        assert_eq!(get_verbosity_level(4), Some(tracing::Level::TRACE));
        assert_eq!(get_verbosity_level(9), Some(tracing::Level::TRACE));
    }
}

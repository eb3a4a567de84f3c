use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_CORS_ORIGIN: &str = "cors-origin";

#[derive(Debug)]
pub struct Options {
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let cors_origins = matches
            .get_many::<String>(ARG_CORS_ORIGIN)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Self { cors_origins }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CORS_ORIGIN)
            .long(ARG_CORS_ORIGIN)
            .help("Allowed CORS origin, repeat or comma separate for several (default: any)")
            .env("JRCMS_CORS_ORIGINS")
            .value_delimiter(',')
            .action(ArgAction::Append),
    )
}

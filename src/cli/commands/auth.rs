use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[derive(Debug)]
pub struct Options {
    pub bcrypt_cost: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if the cost is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let bcrypt_cost = matches
            .get_one::<u32>(ARG_BCRYPT_COST)
            .copied()
            .context("missing required argument: --bcrypt-cost")?;

        Ok(Self { bcrypt_cost })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_BCRYPT_COST)
            .long(ARG_BCRYPT_COST)
            .help("bcrypt work factor used when hashing passwords")
            .default_value("10")
            .env("JRCMS_BCRYPT_COST")
            .value_parser(clap::value_parser!(u32).range(4..=31)),
    )
}

use crate::{
    api,
    cli::globals::{Environment, GlobalArgs},
    cli::telemetry,
    store::{MemoryUserStore, PgUserStore, UserStore},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub environment: Environment,
    pub dsn: Option<SecretString>,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let mut globals = GlobalArgs::new(args.port, args.environment)
        .with_bcrypt_cost(args.bcrypt_cost)
        .with_cors_origins(args.cors_origins);

    if let Some(dsn) = args.dsn {
        globals.set_dsn(dsn);
    }

    let store = open_store(&globals).await?;

    let result = api::new(&globals, store).await;

    telemetry::shutdown_tracer();

    result
}

async fn open_store(globals: &GlobalArgs) -> Result<Arc<dyn UserStore>> {
    let Some(dsn) = &globals.dsn else {
        warn!("No DSN configured, users are kept in memory");
        return Ok(Arc::new(MemoryUserStore::new()));
    };

    let store = PgUserStore::connect(dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    store
        .ensure_schema()
        .await
        .context("Failed to create users table")?;

    Ok(Arc::new(store))
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("environment", args.environment.to_string()),
        ("listen", format!("tcp:{}", args.port)),
        (
            "dsn",
            args.dsn.as_ref().map_or_else(
                || "none (in-memory)".to_string(),
                |dsn| redact_dsn(dsn.expose_secret()),
            ),
        ),
        ("bcrypt_cost", args.bcrypt_cost.to_string()),
        (
            "cors_origins",
            if args.cors_origins.is_empty() {
                "*".to_string()
            } else {
                args.cors_origins.join(", ")
            },
        ),
    ];
    log_entries("Startup configuration", &entries);
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} ({})\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    hash.trim().chars().take(7).collect()
}

use super::{Error, UserStore};
use crate::user::{Hashed, User, Username};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Connection, PgPool, Row};
use std::time::Duration;
use tracing::{info_span, Instrument};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/users.sql"));

/// `users` table backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `dsn`.
    ///
    /// # Errors
    /// Returns an error if the database can't be reached.
    pub async fn connect(dsn: &str) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await?;

        Ok(Self::new(pool))
    }

    /// Create the `users` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), Error> {
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "CREATE");
        sqlx::query(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, user: &User) -> Result<(), Error> {
        let query = "INSERT INTO users (username, password) VALUES ($1, $2)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        sqlx::query(query)
            .bind(user.username().as_str())
            .bind(user.password().as_str())
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(|error| map_insert_error(error, user.username()))?;

        Ok(())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, Error> {
        let query = "SELECT username, password FROM users WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );

        let row = sqlx::query(query)
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored_username: String = row.try_get("username")?;
        let stored_password: String = row.try_get("password")?;

        Ok(Some(User::from_parts(
            Username::parse(&stored_username)?,
            Hashed::parse(stored_password)?,
        )))
    }

    async fn update_password(&self, user: &User) -> Result<(), Error> {
        let query = "UPDATE users SET password = $2 WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );

        let result = sqlx::query(query)
            .bind(user.username().as_str())
            .bind(user.password().as_str())
            .execute(&self.pool)
            .instrument(span)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(user.username().to_string()));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), Error> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}

/// The primary key on `username` is what enforces uniqueness.
fn map_insert_error(error: sqlx::Error, username: &Username) -> Error {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return Error::Duplicate(username.to_string());
        }
    }

    Error::Database(error)
}

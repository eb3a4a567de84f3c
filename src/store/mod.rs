//! Persistence for user records.
//!
//! Stores only accept `User<Hashed>`. Username uniqueness is the store's
//! job: a second `create` with the same username fails with
//! [`Error::Duplicate`].

mod memory;
mod postgres;

pub use self::memory::MemoryUserStore;
pub use self::postgres::PgUserStore;

use crate::user::{self, User, Username};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("username already exists: {0}")]
    Duplicate(String),
    #[error("user not found: {0}")]
    NotFound(String),
    #[error("stored record is invalid: {0}")]
    Corrupt(#[from] user::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Short backend name for logs and health output.
    fn kind(&self) -> &'static str;

    /// Insert a new user.
    async fn create(&self, user: &User) -> Result<(), Error>;

    /// Fetch a user by username.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, Error>;

    /// Overwrite the stored hash of an existing user.
    async fn update_password(&self, user: &User) -> Result<(), Error>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), Error>;
}

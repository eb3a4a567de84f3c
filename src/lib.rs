//! # jrcms
//!
//! HTTP service for user accounts. Each account is a unique `username` and a
//! bcrypt digest of its password; the plaintext is never stored, logged or
//! returned.
//!
//! ## Credentials
//!
//! [`user::User`] is parameterized by the state of its password. A
//! `User<Plaintext>` only exists between the request body and
//! [`user::User::hash_password`]; stores accept nothing but `User<Hashed>`,
//! so an unhashed password cannot be persisted.
//!
//! Digests use bcrypt (`$2b$`) with a cost of 10 unless `--bcrypt-cost` says
//! otherwise. Hashing and verification run on the blocking thread pool.
//!
//! ## Storage
//!
//! With `--dsn` users live in `PostgreSQL` (`sql/users.sql`, created on
//! startup). Without it an in-memory store is used and nothing survives a
//! restart.

pub mod api;
pub mod cli;
pub mod store;
pub mod user;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

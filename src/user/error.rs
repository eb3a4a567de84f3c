use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid username: {0}")]
    InvalidUsername(&'static str),
    #[error("password is longer than 72 bytes")]
    PasswordTooLong,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("stored password is not a bcrypt hash")]
    MalformedHash,
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

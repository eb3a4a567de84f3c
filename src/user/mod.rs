//! User credential model.
//!
//! A [`User`] carries its password state in the type: `User<Plaintext>` is
//! what a signup or password change builds, `User<Hashed>` is the only shape
//! that can be persisted or checked against a candidate. Hashing consumes
//! the plaintext record, so an already hashed password can't be hashed again
//! and nothing can store a password that was never hashed.
//!
//! bcrypt is CPU bound. The async operations run it on the blocking pool;
//! the `*_blocking` variants are for callers already off the runtime.

mod error;
pub mod password;
mod username;

pub use self::error::Error;
pub use self::password::{Hashed, Plaintext, DEFAULT_COST, MAX_PASSWORD_BYTES};
pub use self::username::{Username, MAX_USERNAME_LENGTH};

use tokio::task;

#[derive(Debug)]
pub struct User<P = Hashed> {
    username: Username,
    password: P,
}

impl<P> User<P> {
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }
}

impl User<Plaintext> {
    #[must_use]
    pub fn new(username: Username, password: Plaintext) -> Self {
        Self { username, password }
    }

    /// Replace the plaintext with a salted bcrypt hash.
    ///
    /// Runs on the blocking pool. The returned record is not persisted.
    ///
    /// # Errors
    /// Returns the bcrypt error unmodified, or [`Error::Task`] if the
    /// blocking task panicked.
    pub async fn hash_password(self, cost: u32) -> Result<User<Hashed>, Error> {
        task::spawn_blocking(move || self.hash_password_blocking(cost)).await?
    }

    /// Same as [`User::hash_password`] on the calling thread.
    ///
    /// # Errors
    /// Returns the bcrypt error unmodified.
    pub fn hash_password_blocking(self, cost: u32) -> Result<User<Hashed>, Error> {
        let password = self.password.hash(cost)?;
        Ok(User {
            username: self.username,
            password,
        })
    }
}

impl User<Hashed> {
    /// Rebuild a record read back from storage.
    #[must_use]
    pub fn from_parts(username: Username, password: Hashed) -> Self {
        Self { username, password }
    }

    /// Check a candidate against the stored hash.
    ///
    /// # Errors
    /// Only fails if the stored hash can't be decoded or the blocking task
    /// panicked; a wrong password is `Ok(false)`.
    pub async fn validate_password(&self, candidate: &str) -> Result<bool, Error> {
        let hashed = self.password.clone();
        let candidate = candidate.to_owned();
        task::spawn_blocking(move || hashed.verify(&candidate)).await?
    }

    /// Same as [`User::validate_password`] on the calling thread.
    ///
    /// # Errors
    /// Only fails if the stored hash can't be decoded.
    pub fn validate_password_blocking(&self, candidate: &str) -> Result<bool, Error> {
        self.password.verify(candidate)
    }

    #[must_use]
    pub fn password(&self) -> &Hashed {
        &self.password
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    fn alice(password: &str) -> User<Plaintext> {
        User::new(Username::parse("alice").unwrap(), Plaintext::new(password))
    }

    #[tokio::test]
    async fn hashed_user_validates_original_password() {
        let user = alice("secret123").hash_password(DEFAULT_COST).await.unwrap();

        assert_eq!(user.username().as_str(), "alice");
        assert!(user.password().as_str().starts_with("$2b$10$"));
        assert_eq!(user.password().as_str().len(), 60);
        assert_ne!(user.password().as_str(), "secret123");

        assert!(user.validate_password("secret123").await.unwrap());
        assert!(!user.validate_password("wrong").await.unwrap());
    }

    #[tokio::test]
    async fn two_records_with_same_password_get_different_hashes() {
        let first = alice("secret123").hash_password(TEST_COST).await.unwrap();
        let second = alice("secret123").hash_password(TEST_COST).await.unwrap();

        assert_ne!(first.password(), second.password());
        assert!(first.validate_password("secret123").await.unwrap());
        assert!(second.validate_password("secret123").await.unwrap());
    }

    #[test]
    fn validation_does_not_mutate_the_record() {
        let user = alice("secret123").hash_password_blocking(TEST_COST).unwrap();
        let before = user.password().clone();

        for candidate in ["secret123", "wrong", "secret123"] {
            let _ = user.validate_password_blocking(candidate).unwrap();
        }

        assert_eq!(user.password(), &before);
    }

    #[test]
    fn rejects_distinct_candidates() {
        let user = alice("correct horse").hash_password_blocking(TEST_COST).unwrap();

        for candidate in ["", "correct", "correct horse ", "Correct horse", "battery"] {
            assert!(!user.validate_password_blocking(candidate).unwrap());
        }
    }

    #[test]
    fn truncated_prefix_match_is_rejected() {
        let password = "a".repeat(MAX_PASSWORD_BYTES);
        let user = alice(&password).hash_password_blocking(TEST_COST).unwrap();

        assert!(user.validate_password_blocking(&password).unwrap());
        assert!(!user
            .validate_password_blocking(&format!("{password}EXTRA"))
            .unwrap());
    }

    #[tokio::test]
    async fn over_long_password_is_not_hashed() {
        let result = alice(&"a".repeat(MAX_PASSWORD_BYTES + 1))
            .hash_password(TEST_COST)
            .await;
        assert!(matches!(result, Err(Error::PasswordTooLong)));
    }

    #[tokio::test]
    async fn hashing_error_is_propagated() {
        let result = alice("secret123").hash_password(32).await;
        assert!(matches!(
            result,
            Err(Error::Hash(bcrypt::BcryptError::CostNotAllowed(32)))
        ));
    }

    #[test]
    fn from_parts_keeps_stored_hash() {
        let hashed = Plaintext::new("secret123").hash(TEST_COST).unwrap();
        let user = User::from_parts(Username::parse("alice").unwrap(), hashed.clone());

        assert_eq!(user.password(), &hashed);
        assert!(user.validate_password_blocking("secret123").unwrap());
    }
}

//! Password representations.
//!
//! A password is either [`Plaintext`], which only lives in memory between
//! request parsing and hashing, or [`Hashed`], the bcrypt digest that is
//! persisted and verified against. There is no conversion back from
//! `Hashed` to `Plaintext`.

use super::Error;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Work factor used when none is configured.
pub const DEFAULT_COST: u32 = 10;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

const HASH_LENGTH: usize = 60;
const HASH_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Password as typed by the user. Redacted in `Debug` output.
#[derive(Debug)]
pub struct Plaintext(SecretString);

impl Plaintext {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::from(password.into()))
    }

    /// Salt and hash with the given cost, consuming the plaintext.
    ///
    /// # Errors
    /// Returns [`Error::PasswordTooLong`] past [`MAX_PASSWORD_BYTES`], which
    /// bcrypt would otherwise truncate. Otherwise [`Error::Hash`] with the
    /// bcrypt error untouched, e.g. when the cost is outside `4..=31`.
    pub fn hash(self, cost: u32) -> Result<Hashed, Error> {
        let password = self.0.expose_secret();
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(Error::PasswordTooLong);
        }

        let digest = bcrypt::hash(password, cost)?;
        Ok(Hashed(digest))
    }
}

impl From<String> for Plaintext {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

/// bcrypt digest in modular crypt format, e.g. `$2b$10$<salt><digest>`.
#[derive(Clone, PartialEq, Eq)]
pub struct Hashed(String);

impl Hashed {
    /// Accept a digest read back from storage.
    ///
    /// # Errors
    /// Returns [`Error::MalformedHash`] if the value is not a bcrypt digest.
    pub fn parse(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if is_bcrypt_digest(&value) {
            Ok(Self(value))
        } else {
            Err(Error::MalformedHash)
        }
    }

    /// Compare a candidate using bcrypt's own verification.
    ///
    /// A mismatch is `Ok(false)`, never an error. Candidates longer than
    /// [`MAX_PASSWORD_BYTES`] never match: nothing that long was hashed, and
    /// bcrypt would compare only their first 72 bytes.
    ///
    /// # Errors
    /// Returns [`Error::Hash`] only if bcrypt cannot decode the stored digest.
    pub fn verify(&self, candidate: &str) -> Result<bool, Error> {
        if candidate.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        Ok(bcrypt::verify(candidate, &self.0)?)
    }

    /// Work factor encoded in the digest.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.0
            .get(4..6)
            .and_then(|cost| cost.parse().ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Hashed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // algorithm and cost only
        let header = self.0.get(..7).unwrap_or_default();
        write!(f, "Hashed({header}***)")
    }
}

fn is_bcrypt_digest(value: &str) -> bool {
    if value.len() != HASH_LENGTH || !HASH_PREFIXES.iter().any(|p| value.starts_with(p)) {
        return false;
    }

    let bytes = value.as_bytes();
    let cost_ok = bytes[4..6].iter().all(u8::is_ascii_digit) && bytes[6] == b'$';
    let body_ok = bytes[7..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'.' || *b == b'/');

    cost_ok && body_ok
}

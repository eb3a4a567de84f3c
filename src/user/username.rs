use super::Error;
use serde::{Serialize, Serializer};
use std::fmt;

/// Usernames are email-like identifiers; 254 is the longest valid address.
pub const MAX_USERNAME_LENGTH: usize = 254;

/// Unique account identifier. Uniqueness itself is enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Trim and validate a raw username.
    ///
    /// # Errors
    /// Returns [`Error::InvalidUsername`] when the value is empty, too long, or
    /// contains control characters.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidUsername("must not be empty"));
        }

        if trimmed.chars().count() > MAX_USERNAME_LENGTH {
            return Err(Error::InvalidUsername("must be at most 254 characters"));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(Error::InvalidUsername("must not contain control characters"));
        }

        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Username {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

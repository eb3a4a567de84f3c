use crate::api::error::ApiError;
use crate::user::{Plaintext, Username, MAX_PASSWORD_BYTES};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Deserialize)]
pub struct PasswordChange {
    /// Current password.
    pub password: String,
    pub new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange")
            .field("password", &"***")
            .field("new_password", &"***")
            .finish()
    }
}

/// Public view of a user. Never carries the password.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserView {
    pub username: String,
}

impl From<&Username> for UserView {
    fn from(username: &Username) -> Self {
        Self {
            username: username.to_string(),
        }
    }
}

/// Validate a password from a request body before it is hashed.
///
/// # Errors
/// Returns [`ApiError::InvalidInput`] for empty passwords and passwords bcrypt
/// would silently truncate.
pub fn new_password(password: String) -> Result<Plaintext, ApiError> {
    if password.is_empty() {
        return Err(ApiError::InvalidInput(
            "Password must not be empty".to_string(),
        ));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::InvalidInput(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }

    Ok(Plaintext::new(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_password_bounds() {
        assert!(matches!(
            new_password(String::new()),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(new_password("a".repeat(MAX_PASSWORD_BYTES)).is_ok());
        assert!(matches!(
            new_password("a".repeat(MAX_PASSWORD_BYTES + 1)),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn debug_redacts_passwords() {
        let credentials = Credentials {
            username: "alice".to_string(),
            password: "secret123".to_string(),
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret123"));

        let change = PasswordChange {
            password: "secret123".to_string(),
            new_password: "n3w-secret".to_string(),
        };
        let debug = format!("{change:?}");
        assert!(!debug.contains("secret123"));
        assert!(!debug.contains("n3w-secret"));
    }
}

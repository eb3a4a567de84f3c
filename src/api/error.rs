use crate::{store, user};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Body of every non-2xx response.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    MissingPayload,
    InvalidInput(String),
    /// Unknown user and wrong password are deliberately the same error.
    InvalidCredentials,
    Conflict(String),
    Internal,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingPayload | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingPayload => "Missing payload".to_string(),
            Self::InvalidInput(message) | Self::Conflict(message) => message.clone(),
            Self::InvalidCredentials => "Invalid username or password".to_string(),
            Self::Internal => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<user::Error> for ApiError {
    fn from(err: user::Error) -> Self {
        match err {
            user::Error::InvalidUsername(reason) => Self::InvalidInput(format!("Username {reason}")),
            user::Error::PasswordTooLong => Self::InvalidInput(format!(
                "Password must be at most {} bytes",
                user::MAX_PASSWORD_BYTES
            )),
            other => {
                error!("Credential error: {}", other);
                Self::Internal
            }
        }
    }
}

impl From<store::Error> for ApiError {
    fn from(err: store::Error) -> Self {
        match err {
            store::Error::Duplicate(_) => Self::Conflict("User already exists".to_string()),
            store::Error::NotFound(_) => Self::InvalidCredentials,
            other => {
                error!("User store error: {}", other);
                Self::Internal
            }
        }
    }
}

use lambda_http::http::StatusCode;
use thiserror::Error;

use crate::envelope::{ApiEnvelope, FieldErrors};

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const CONNECTIVITY_ERROR_MESSAGE: &str = "Could not connect to the server";

/// Every failure a caller can observe. None of these escape as a fault: each
/// one ends up as a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Malformed or missing input (400)
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },
    /// Bad credentials or missing bearer token (401)
    #[error("{0}")]
    Auth(String),
    /// Unknown resource (404)
    #[error("{0}")]
    NotFound(String),
    /// Transport failure, client side only
    #[error("{0}")]
    Connectivity(String),
    /// Unexpected fault inside the simulator (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn internal() -> Self {
        Self::Internal(INTERNAL_ERROR_MESSAGE.to_string())
    }

    pub fn connectivity() -> Self {
        Self::Connectivity(CONNECTIVITY_ERROR_MESSAGE.to_string())
    }

    /// HTTP status for server-side errors; connectivity failures never reach the wire.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Validation { .. } => Some(StatusCode::BAD_REQUEST),
            Self::Auth(_) => Some(StatusCode::UNAUTHORIZED),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Internal(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Connectivity(_) => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::Auth(_) => "AuthError",
            Self::NotFound(_) => "NotFoundError",
            Self::Connectivity(_) => "ConnectivityError",
            Self::Internal(_) => "InternalError",
        }
    }

    pub fn into_envelope<T>(self) -> ApiEnvelope<T> {
        match self {
            Self::Validation { message, errors } if errors.is_empty() => {
                ApiEnvelope::failure(message)
            }
            Self::Validation { message, errors } => {
                ApiEnvelope::failure_with_errors(message, errors)
            }
            Self::Auth(message)
            | Self::NotFound(message)
            | Self::Connectivity(message)
            | Self::Internal(message) => ApiEnvelope::failure(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::validation("bad", FieldErrors::new()), Some(StatusCode::BAD_REQUEST))]
    #[case(ApiError::Auth("who".into()), Some(StatusCode::UNAUTHORIZED))]
    #[case(ApiError::NotFound("gone".into()), Some(StatusCode::NOT_FOUND))]
    #[case(ApiError::internal(), Some(StatusCode::INTERNAL_SERVER_ERROR))]
    #[case(ApiError::connectivity(), None)]
    fn maps_each_error_to_its_status(#[case] error: ApiError, #[case] expected: Option<StatusCode>) {
        assert_eq!(error.status(), expected);
    }

    #[test]
    fn validation_keeps_field_errors_in_the_envelope() {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_string(), vec!["Email is required".to_string()]);

        let envelope: ApiEnvelope<()> = ApiError::validation("Invalid data", errors.clone()).into_envelope();

        assert_eq!(envelope.message(), Some("Invalid data"));
        assert_eq!(envelope.errors(), Some(&errors));
    }

    #[test]
    fn empty_validation_map_is_dropped() {
        let envelope: ApiEnvelope<()> =
            ApiError::validation("Email is required", FieldErrors::new()).into_envelope();
        assert_eq!(envelope.errors(), None);
    }
}

/**
 * Backend Error Types
 *
 * Every failure an HTTP handler can produce, grouped the way clients see
 * them:
 *
 * - `Validation` - malformed input, rejected before any write (400)
 * - `Unauthorized` / `Forbidden` - missing or invalid session, or a
 *   principal acting on someone else's resource (401 / 403)
 * - `Persistence` - the store failed or timed out (500)
 * - `Consistency` - a write succeeded but the follow-up read found nothing
 * - `Upgrade` - `/ws` hit without a usable WebSocket handshake; keeps the
 *   status axum chose (400, 405 or 426)
 *
 * Persistence details are logged, not returned; clients get a fixed message.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed request data
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        field: String,
        message: String,
    },

    /// Missing, expired or forged session
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    /// Valid session acting outside its own resources
    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
    },

    /// Store operation failed
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// Post-write re-read did not find the record
    #[error("Consistency error: {message}")]
    Consistency {
        message: String,
    },

    /// Request could not be upgraded to a WebSocket
    #[error("Upgrade rejected: {message}")]
    Upgrade {
        status: StatusCode,
        message: String,
    },

    /// Session token could not be signed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::Invalid { field, message } => Self::Validation { field, message },
            SharedError::Malformed { message } => Self::Validation {
                field: "body".to_string(),
                message,
            },
        }
    }
}

impl BackendError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The generic rejection used for every credential failure
    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            message: "unauthorized access".to_string(),
        }
    }

    pub fn forbidden() -> Self {
        Self::Forbidden {
            message: "forbidden access".to_string(),
        }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Consistency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upgrade { status, .. } => *status,
            Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message
    pub fn message(&self) -> String {
        match self {
            Self::Validation { field, message } => format!("{}: {}", field, message),
            Self::Unauthorized { message } => message.clone(),
            Self::Forbidden { message } => message.clone(),
            Self::Persistence(StoreError::Timeout(_)) => "storage operation timed out".to_string(),
            Self::Persistence(_) => "storage operation failed".to_string(),
            Self::Consistency { message } => message.clone(),
            Self::Upgrade { message, .. } => message.clone(),
            Self::Token(_) => "failed to create session token".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BackendError::validation("id", "bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BackendError::unauthorized().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(BackendError::forbidden().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            BackendError::from(StoreError::Timeout(Duration::from_millis(5))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let upgrade = BackendError::Upgrade {
            status: StatusCode::UPGRADE_REQUIRED,
            message: "not upgradable".to_string(),
        };
        assert_eq!(upgrade.status_code(), StatusCode::UPGRADE_REQUIRED);
        assert_eq!(upgrade.message(), "not upgradable");
    }

    #[test]
    fn test_from_shared_validation_keeps_field() {
        let err: BackendError = SharedError::validation("newOrder[0]._id", "not a valid task id").into();
        match err {
            BackendError::Validation { field, .. } => assert_eq!(field, "newOrder[0]._id"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_persistence_message_hides_details() {
        let err = BackendError::from(StoreError::Unavailable("pool closed at 10.0.0.3".to_string()));
        assert_eq!(err.message(), "storage operation failed");
    }

    #[test]
    fn test_timeout_message() {
        let err = BackendError::from(StoreError::Timeout(Duration::from_secs(5)));
        assert!(err.message().contains("timed out"));
    }
}

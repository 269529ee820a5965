//! Shared Error Types
//!
//! Errors raised while reading a task, user or reorder payload, before
//! anything reaches a store. Clients decoding the same wire types see the
//! same errors.
//!
//! ```rust
//! use taskhub::shared::error::SharedError;
//!
//! let error = SharedError::validation("category", "unknown category 'Archived'");
//! assert_eq!(error.field(), Some("category"));
//! ```
use thiserror::Error;

/// A payload that could not be accepted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Body was not valid JSON for the expected type
    #[error("malformed payload: {message}")]
    Malformed { message: String },

    /// A field held a value the server refuses
    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },
}

impl SharedError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The offending field, if one can be named
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Invalid { field, .. } => Some(field),
            Self::Malformed { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::task::NewTask;

    #[test]
    fn test_invalid_names_field() {
        let error = SharedError::validation("newOrder[2]._id", "not a valid task id");
        assert_eq!(error.field(), Some("newOrder[2]._id"));
        assert_eq!(error.to_string(), "invalid newOrder[2]._id: not a valid task id");
    }

    #[test]
    fn test_bad_task_body_is_malformed() {
        let result: Result<NewTask, _> = serde_json::from_str("{ \"title\": ");
        let error: SharedError = result.unwrap_err().into();
        assert!(matches!(error, SharedError::Malformed { .. }));
        assert_eq!(error.field(), None);
        assert!(error.to_string().starts_with("malformed payload:"));
    }
}

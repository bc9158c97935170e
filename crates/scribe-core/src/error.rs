//! Error types for scribe.

use thiserror::Error;

/// Result type alias using scribe's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for scribe operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Notebook not found
    #[error("notebook with id {0} does not exist")]
    NotebookNotFound(i64),

    /// Note not found
    #[error("note with id {0} does not exist")]
    NoteNotFound(i64),

    /// Partial update named a field that is not a mutable note attribute
    #[error("no such field exists in Note: {0}")]
    IllegalField(String),

    /// Partial update attempted to modify tags
    #[error("tags must be modified through the tag operations")]
    IllegalTagModification,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_notebook_not_found() {
        let err = Error::NotebookNotFound(42);
        assert_eq!(err.to_string(), "notebook with id 42 does not exist");
    }

    #[test]
    fn test_error_display_note_not_found() {
        let err = Error::NoteNotFound(7);
        assert_eq!(err.to_string(), "note with id 7 does not exist");
    }

    #[test]
    fn test_error_display_illegal_field() {
        let err = Error::IllegalField("color".to_string());
        assert_eq!(err.to_string(), "no such field exists in Note: color");
    }

    #[test]
    fn test_error_display_illegal_tag_modification() {
        let err = Error::IllegalTagModification;
        assert!(err.to_string().contains("tag operations"));
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("cache TTL must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: cache TTL must be positive"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}

//! Error types for fuzzdex
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Uniqueness collisions during word creation are deliberately absent here:
//! they are reported as typed outcomes by the storage layer and only become an
//! error ([`Error::TooManyCollisions`]) once the retry budget is spent.

use crate::types::{EntryId, ModelId, WordId};
use std::io;
use thiserror::Error;

/// Result type alias for fuzzdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fuzzdex
#[derive(Debug, Error)]
pub enum Error {
    /// A record type was indexed without first being registered against a model id
    #[error("record type '{0}' is not registered with a model id")]
    UnregisteredModel(String),

    /// Two record types tried to claim the same model id or name
    #[error("model registration conflict: {0}")]
    DuplicateModel(String),

    /// No record source is registered for a model id found in the index
    #[error("no record source registered for model id {0}")]
    UnknownModelId(ModelId),

    /// Word creation lost the uniqueness race more often than the retry budget allows
    #[error("too many word uniqueness collisions after {attempts} attempts")]
    TooManyCollisions {
        /// Total attempts made, including the first
        attempts: usize,
    },

    /// Record id is too wide to be packed into a row key
    #[error("record id {0} does not fit in a row key")]
    RecordIdOutOfRange(u64),

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Word row not found
    #[error("word not found: {0}")]
    WordNotFound(WordId),

    /// Entry row not found
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl Error {
    /// Whether this error means the configuration or registration is wrong
    /// (fatal, never worth retrying).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnregisteredModel(_)
                | Error::DuplicateModel(_)
                | Error::UnknownModelId(_)
                | Error::InvalidConfig(_)
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unregistered() {
        let err = Error::UnregisteredModel("Foo".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Foo"));
        assert!(msg.contains("not registered"));
    }

    #[test]
    fn test_error_display_collisions() {
        let err = Error::TooManyCollisions { attempts: 5 };
        let msg = err.to_string();
        assert!(msg.contains("too many"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_error_display_row_key() {
        let err = Error::RecordIdOutOfRange(u64::MAX);
        assert!(err.to_string().contains("row key"));
    }

    #[test]
    fn test_error_display_not_found() {
        assert!(Error::WordNotFound(WordId(7)).to_string().contains('7'));
        assert!(Error::EntryNotFound(EntryId(9)).to_string().contains('9'));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("= broken");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::SerializationError(_)));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(Error::UnregisteredModel("x".into()).is_configuration());
        assert!(Error::InvalidConfig("x".into()).is_configuration());
        assert!(!Error::TooManyCollisions { attempts: 1 }.is_configuration());
        assert!(!Error::StorageError("x".into()).is_configuration());
    }
}

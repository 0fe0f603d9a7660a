//! Error types for the cube store.

use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cube not found: {0}")]
    CubeNotFound(String),

    #[error("Cube already exists: {0}")]
    CubeExists(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),
}

/// Coarse classification of a [`StoreError`], used by callers that need to
/// pick a response (status code, retry policy) without matching every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The targeted cube does not exist.
    NotFound,
    /// The cube being added is already in the catalog.
    Conflict,
    /// A mutation payload is malformed or misses a required field.
    Validation,
    /// The backing document could not be read or written.
    Storage,
    /// The backing document exists but is not a valid document.
    Corrupt,
}

impl ErrorKind {
    /// Whether the caller can fix the request and try again.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::Validation
        )
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::CubeNotFound(_) => ErrorKind::NotFound,
            StoreError::CubeExists(_) => ErrorKind::Conflict,
            StoreError::InvalidPayload(_) => ErrorKind::Validation,
            StoreError::Io(_) | StoreError::Serialization(_) => ErrorKind::Storage,
            StoreError::Corruption(_) => ErrorKind::Corrupt,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            StoreError::CubeNotFound("3x3".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(StoreError::CubeExists("3x3".into()).kind(), ErrorKind::Conflict);
        assert_eq!(
            StoreError::InvalidPayload("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).kind(),
            ErrorKind::Storage
        );
        assert_eq!(StoreError::Corruption("x".into()).kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn test_recoverable() {
        assert!(ErrorKind::NotFound.is_recoverable());
        assert!(ErrorKind::Conflict.is_recoverable());
        assert!(ErrorKind::Validation.is_recoverable());
        assert!(!ErrorKind::Storage.is_recoverable());
        assert!(!ErrorKind::Corrupt.is_recoverable());
    }
}

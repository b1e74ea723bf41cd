//! Error types for the toy store.

use crate::types::{MessageId, ToyId};
use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Toy not found: {0}")]
    ToyNotFound(ToyId),

    #[error("Message {message} not found on toy {toy}")]
    MessageNotFound { toy: ToyId, message: MessageId },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid sort key: {0}")]
    InvalidSortKey(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("No free id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },

    #[error("Store is locked by another process")]
    Locked,

    #[error("Store not initialized")]
    NotInitialized,
}

/// Coarse classification of a [`StoreError`], for callers that translate
/// errors into their own protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced toy or message does not exist.
    NotFound,
    /// Malformed input.
    Validation,
    /// Backing file could not be read or written.
    Persistence,
    /// Id generation could not find a free id.
    Conflict,
}

impl ErrorKind {
    /// HTTP-equivalent status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Persistence | ErrorKind::Conflict => 500,
        }
    }
}

impl StoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::ToyNotFound(_) | StoreError::MessageNotFound { .. } => ErrorKind::NotFound,
            StoreError::Validation(_) | StoreError::InvalidSortKey(_) => ErrorKind::Validation,
            StoreError::IdSpaceExhausted { .. } => ErrorKind::Conflict,
            StoreError::Io(_)
            | StoreError::Serialization(_)
            | StoreError::Deserialization(_)
            | StoreError::Corruption(_)
            | StoreError::Locked
            | StoreError::NotInitialized => ErrorKind::Persistence,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

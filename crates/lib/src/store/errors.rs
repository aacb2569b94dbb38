//! Error types for the document store.

use thiserror::Error;

/// Errors raised by [`DocumentStore`](super::DocumentStore) lookups.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document is registered under the key
    #[error("Unknown document: {key}")]
    UnknownDocument { key: String },

    /// A document is already registered under the key
    #[error("Document already exists: {key}")]
    DocumentExists { key: String },
}

impl StoreError {
    /// Check if this error indicates a document was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::UnknownDocument { .. })
    }

    /// Check if this error indicates the key is already taken
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::DocumentExists { .. })
    }

    /// The key the error refers to
    pub fn key(&self) -> &str {
        match self {
            StoreError::UnknownDocument { key } | StoreError::DocumentExists { key } => key,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}

//! Error types for document reads, writes and persistence.

use thiserror::Error;

/// Errors raised while resolving or mutating a path.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A map key on the path does not exist
    #[error("Unknown field '{field}' in path '{path}'")]
    UnknownField { path: String, field: String },

    /// A list index on the path is past the end of the list
    #[error("Index {index} out of range for length {len} in path '{path}'")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// The value at the path is of the wrong kind for the operation
    #[error("Type mismatch at '{path}': expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// The operation cannot be performed on this target
    #[error("Invalid operation {operation} on '{path}': {reason}")]
    InvalidOperation {
        operation: String,
        path: String,
        reason: String,
    },
}

impl DocumentError {
    pub(crate) fn type_mismatch(
        path: impl ToString,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        DocumentError::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn invalid(
        operation: impl Into<String>,
        path: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        DocumentError::InvalidOperation {
            operation: operation.into(),
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this error reports a missing field.
    pub fn is_unknown_field(&self) -> bool {
        matches!(self, DocumentError::UnknownField { .. })
    }

    /// Check if this error reports an index past the end of a list.
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self, DocumentError::IndexOutOfRange { .. })
    }

    /// Check if this error reports a type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, DocumentError::TypeMismatch { .. })
    }

    /// Check if this error reports an invalid operation.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, DocumentError::InvalidOperation { .. })
    }

    /// The path the error was raised for.
    pub fn path(&self) -> &str {
        match self {
            DocumentError::UnknownField { path, .. }
            | DocumentError::IndexOutOfRange { path, .. }
            | DocumentError::TypeMismatch { path, .. }
            | DocumentError::InvalidOperation { path, .. } => path,
        }
    }
}

impl From<DocumentError> for crate::Error {
    fn from(err: DocumentError) -> Self {
        crate::Error::Document(err)
    }
}

/// Errors raised while saving or loading a document.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The saved bytes are not a valid document
    #[error("Failed to decode document: {reason}")]
    DecodeError { reason: String },

    /// The document could not be encoded
    #[error("Failed to encode document: {reason}")]
    EncodeError { reason: String },
}

impl PersistenceError {
    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        PersistenceError::DecodeError {
            reason: reason.into(),
        }
    }

    /// Check if this error reports undecodable input.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, PersistenceError::DecodeError { .. })
    }
}

impl From<PersistenceError> for crate::Error {
    fn from(err: PersistenceError) -> Self {
        crate::Error::Persistence(err)
    }
}

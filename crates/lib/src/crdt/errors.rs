//! Error types for CRDT operations.
//!
//! These errors are raised while checking or folding a single op into the
//! object table: references to objects or elements that do not exist, or ops
//! that do not fit the kind of object they target.

use thiserror::Error;

/// Structured error types for CRDT operations.
///
/// An op that triggers one of these is never partially applied; the change
/// carrying it is rejected as a whole.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CRDTError {
    /// The op targets an object that does not exist
    #[error("CRDT object not found: {obj}")]
    ObjectNotFound { obj: String },

    /// The op references a sequence element that does not exist
    #[error("CRDT element {elem} not found in {obj}")]
    ElementNotFound { obj: String, elem: String },

    /// Type mismatch between the op and its target
    #[error("CRDT type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The op is well-formed but not meaningful for its target
    #[error("Invalid CRDT operation {operation}: {reason}")]
    InvalidOperation { operation: String, reason: String },
}

impl CRDTError {
    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, CRDTError::TypeMismatch { .. })
    }

    /// Check if this error is related to object or element lookup
    pub fn is_not_found_error(&self) -> bool {
        matches!(
            self,
            CRDTError::ObjectNotFound { .. } | CRDTError::ElementNotFound { .. }
        )
    }

    /// Check if this error reports an op that does not fit its target
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, CRDTError::InvalidOperation { .. })
    }

    /// Get the operation name if this is an operation-specific error
    pub fn operation(&self) -> Option<&str> {
        match self {
            CRDTError::InvalidOperation { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

// Conversion from CRDTError to the main Error type
impl From<CRDTError> for crate::Error {
    fn from(err: CRDTError) -> Self {
        crate::Error::CRDT(err)
    }
}

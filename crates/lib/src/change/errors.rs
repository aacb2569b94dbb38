//! Change-specific error types.

use thiserror::Error;

/// Errors produced while decoding or validating a change.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChangeError {
    /// Bytes handed to `apply` are not a valid change
    #[error("Malformed change: {reason}")]
    MalformedChange {
        /// What was wrong with the input
        reason: String,
    },

    /// A change hash string could not be parsed
    #[error("Invalid change hash '{hash}': {reason}")]
    InvalidHash { hash: String, reason: String },

    /// An actor id string could not be parsed
    #[error("Invalid actor id '{actor}': {reason}")]
    InvalidActor { actor: String, reason: String },

    /// The change could not be encoded
    #[error("Change serialization failed: {reason}")]
    SerializationFailed { reason: String },

    /// The ops of a change would run past the largest representable counter
    #[error("Op counters starting at {start_op} cannot hold {ops} more ops")]
    CounterOverflow { start_op: u64, ops: usize },
}

impl ChangeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ChangeError::MalformedChange {
            reason: reason.into(),
        }
    }

    /// Check if this error reports a malformed change.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ChangeError::MalformedChange { .. })
    }

    /// Check if this error reports an unparsable hash.
    pub fn is_invalid_hash(&self) -> bool {
        matches!(self, ChangeError::InvalidHash { .. })
    }

    /// Check if this error reports exhausted op counters.
    pub fn is_counter_overflow(&self) -> bool {
        matches!(self, ChangeError::CounterOverflow { .. })
    }

    /// Check if this error reports an unparsable actor id.
    pub fn is_invalid_actor(&self) -> bool {
        matches!(self, ChangeError::InvalidActor { .. })
    }
}

impl From<ChangeError> for crate::Error {
    fn from(err: ChangeError) -> Self {
        crate::Error::Change(err)
    }
}

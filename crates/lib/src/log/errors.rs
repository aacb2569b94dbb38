//! Error types for change log operations.

use thiserror::Error;

use crate::change::{ActorId, ChangeHash};

/// Errors raised when a change cannot enter the log.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LogError {
    /// One or more dependencies have not been applied yet
    #[error("Missing {} dependencies: {}", .missing.len(), short_list(.missing))]
    MissingDependency {
        /// Hashes the pending changes depend on but the log does not contain
        missing: Vec<ChangeHash>,
    },

    /// A different change already claimed this actor's sequence number
    #[error("Actor {actor} already has a different change with seq {seq}")]
    SeqConflict { actor: ActorId, seq: u64 },

    /// An actor's change does not directly follow its previous one
    #[error("Actor {actor} sent seq {seq}, expected seq {expected}")]
    SeqGap {
        actor: ActorId,
        expected: u64,
        seq: u64,
    },

    /// An actor's change reuses op counters it already spent
    #[error("Actor {actor} starts ops at {start_op} but already used counters up to {max_op}")]
    OpCounterReused {
        actor: ActorId,
        start_op: u64,
        max_op: u64,
    },

    /// The same change appears twice in a history being loaded
    #[error("Duplicate change {hash}")]
    DuplicateChange { hash: ChangeHash },

    /// The dependency graph of a history contains a cycle
    #[error("Dependency cycle among {count} changes")]
    CycleDetected { count: usize },
}

fn short_list(hashes: &[ChangeHash]) -> String {
    hashes
        .iter()
        .map(ChangeHash::short)
        .collect::<Vec<_>>()
        .join(", ")
}

impl LogError {
    /// Check if this error reports unmet dependencies.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, LogError::MissingDependency { .. })
    }

    /// Check if this error reports a corrupt history.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            LogError::SeqConflict { .. }
                | LogError::SeqGap { .. }
                | LogError::OpCounterReused { .. }
                | LogError::DuplicateChange { .. }
                | LogError::CycleDetected { .. }
        )
    }

    /// The missing hashes, if this is a dependency error.
    pub fn missing(&self) -> &[ChangeHash] {
        match self {
            LogError::MissingDependency { missing } => missing,
            _ => &[],
        }
    }
}

impl From<LogError> for crate::Error {
    fn from(err: LogError) -> Self {
        crate::Error::Log(err)
    }
}

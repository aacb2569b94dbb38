//!
//! replidoc: an embeddable replicated document engine.
//!
//! Replicas of a JSON-like document are edited independently, possibly
//! offline, exchange opaque change records in any order and grouping, and
//! converge to the same state without coordination.
//!
//! ## Core Concepts
//!
//! * **Documents (`document::Document`)**: A tree of maps, lists and text rooted at an implicit map, plus the history that produced it.
//! * **Changes (`change::Change`)**: The unit of replication. A content-hashed bundle of ops authored by one actor, linked to the changes it causally follows.
//! * **Change log (`log::ChangeLog`)**: The causal history of a document, admitted strictly in dependency order.
//! * **CRDTs (`crdt`)**: Multi-value registers, RGA sequences and maps that fold ops deterministically, independent of arrival order.
//! * **Text (`document::text`)**: Character splices, range marks anchored to characters, and unified-diff patches.
//! * **Paths (`path::Path`)**: Dotted keys and bracketed indices such as `user.tags[1]` for addressing values.
//! * **Document store (`store::DocumentStore`)**: A keyed registry for hosts that manage many documents.
//!
//! ## Example
//!
//! ```
//! use replidoc::Document;
//!
//! let mut a = Document::new();
//! let mut b = Document::new();
//!
//! let from_a = a.put_int("score", 1)?;
//! let from_b = b.put_int("score", 2)?;
//! a.apply(&from_b)?;
//! b.apply(&from_a)?;
//!
//! assert_eq!(a.get_int("score")?, b.get_int("score")?);
//! assert_eq!(a.to_json(), b.to_json());
//! # Ok::<(), replidoc::Error>(())
//! ```

pub mod change;
pub mod clock;
pub mod constants;
pub mod crdt;
pub mod document;
pub mod log;
pub mod path;
pub mod store;

pub use change::{ActorId, Change, ChangeHash};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use crdt::Value;
pub use document::{Document, ObjectRef};
pub use store::DocumentStore;

/// Result type used throughout the replidoc library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the replidoc library.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured path parsing errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Structured change decoding errors from the change module
    #[error(transparent)]
    Change(change::ChangeError),

    /// Structured causal ordering errors from the log module
    #[error(transparent)]
    Log(log::LogError),

    /// Structured CRDT errors from the crdt module
    #[error(transparent)]
    CRDT(crdt::CRDTError),

    /// Structured read/write errors from the document module
    #[error(transparent)]
    Document(document::DocumentError),

    /// Structured save/load errors from the document module
    #[error(transparent)]
    Persistence(document::PersistenceError),

    /// Structured lookup errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Path(_) => "path",
            Error::Change(_) => "change",
            Error::Log(_) => "log",
            Error::CRDT(_) => "crdt",
            Error::Document(_) => "document",
            Error::Persistence(_) => "persistence",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_unknown_field(),
            Error::CRDT(crdt_err) => crdt_err.is_not_found_error(),
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error reports a value of the wrong kind.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_type_mismatch(),
            Error::CRDT(crdt_err) => crdt_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error reports a list index past the end.
    pub fn is_out_of_range(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_index_out_of_range(),
            _ => false,
        }
    }

    /// Check if this error reports an operation that does not fit its target.
    pub fn is_invalid_operation(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_invalid_operation(),
            Error::CRDT(crdt_err) => crdt_err.is_invalid_operation(),
            _ => false,
        }
    }

    /// Check if this error reports a malformed path.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Error::Path(_))
    }

    /// Check if this error reports bytes that are not a valid change.
    pub fn is_malformed_change(&self) -> bool {
        match self {
            Error::Change(change_err) => change_err.is_malformed(),
            _ => false,
        }
    }

    /// Check if this error reports a change whose deps are not yet applied.
    pub fn is_missing_dependency(&self) -> bool {
        match self {
            Error::Log(log_err) => log_err.is_missing_dependency(),
            _ => false,
        }
    }

    /// Check if this error reports a saved document that cannot be loaded.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::Persistence(persist_err) => persist_err.is_decode_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a corrupt history.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Log(log_err) => log_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

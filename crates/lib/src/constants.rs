//! Constants used throughout the replidoc library.
//!
//! Central definitions for wire-format markers and reserved names.

/// Leading bytes of an encoded change.
pub const CHANGE_MAGIC: &[u8; 4] = b"RCHG";

/// Leading bytes of a saved document.
pub const DOCUMENT_MAGIC: &[u8; 4] = b"RDOC";

/// Version byte written after either magic. Bump on any incompatible change
/// to the encoded layout.
pub const FORMAT_VERSION: u8 = 1;

/// Display name of the implicit root map.
pub const ROOT: &str = "_root";

/// Path prefix accepted (and ignored) by the path parser.
pub const PATH_ROOT: &str = "$";

/// Largest op counter accepted in a change from another replica.
///
/// Counters above this are reserved, so a document that has seen the largest
/// accepted counter can still advance its Lamport clock for local edits.
pub const MAX_OP_COUNTER: u64 = 1 << 62;

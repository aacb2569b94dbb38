//! Conflict-free replicated data types backing a document.
//!
//! This module holds the materialized state a document folds its changes
//! into. Every type here is deterministic given the set of ops applied to
//! it, whatever order those ops arrived in, as long as each op arrives after
//! the ops it causally depends on.
//!
//! # Core Types
//!
//! - [`Register`] - Multi-value slot; greatest op id wins, conflicts kept
//! - [`MapObject`] - String keys to registers
//! - [`Sequence`] - RGA-ordered elements for lists and text
//! - [`MarkSpan`] - A run of text carrying one mark value
//! - [`ObjectTable`] - Flat arena of all containers, keyed by [`ObjId`]
//! - [`Value`] - What a read returns
//!
//! [`ObjId`]: crate::change::ObjId

pub mod errors;
pub mod map;
pub mod mark;
pub mod object;
pub mod register;
pub mod seq;
pub mod value;

pub use errors::CRDTError;
pub use map::MapObject;
pub use mark::{MarkEntry, MarkSpan};
pub use object::{Object, ObjectTable};
pub use register::{Register, RegisterEntry};
pub use seq::{Element, Sequence};
pub use value::Value;

//! Primitive operations carried by a change.
//!
//! An [`Op`] is one mutation against one object. Ops never carry their own id:
//! the id of the `i`-th op in a change is `(change.start_op + i, change.actor)`,
//! see [`Change::op_id`](super::Change::op_id).

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

use super::actor::ActorId;
use crate::constants::ROOT;

/// Globally unique identifier of an operation.
///
/// `counter` is a Lamport clock: an author always picks a counter larger than
/// every counter it has observed. Ids are totally ordered by counter first and
/// actor second; "later" in this order means "wins" for register conflicts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId {
    pub counter: u64,
    pub actor: ActorId,
}

impl OpId {
    pub fn new(counter: u64, actor: ActorId) -> Self {
        Self { counter, actor }
    }
}

impl PartialOrd for OpId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counter
            .cmp(&other.counter)
            .then_with(|| self.actor.cmp(&other.actor))
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.counter, self.actor)
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.counter, &self.actor.to_hex()[..8])
    }
}

/// Identifier of a container object.
///
/// The root map exists implicitly in every document; every other container is
/// named by the op that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjId {
    Root,
    Op(OpId),
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjId::Root => write!(f, "{ROOT}"),
            ObjId::Op(id) => write!(f, "{id}"),
        }
    }
}

impl fmt::Debug for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjId::Root => write!(f, "{ROOT}"),
            ObjId::Op(id) => write!(f, "{id:?}"),
        }
    }
}

impl From<OpId> for ObjId {
    fn from(id: OpId) -> Self {
        ObjId::Op(id)
    }
}

/// Reference to a sequence position: the list head or an existing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElemRef {
    Head,
    Elem(OpId),
}

/// The slot an op targets inside its object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A map key.
    Map(String),
    /// A sequence position. For `Insert` this is the left neighbour; for the
    /// other actions it names the element being written.
    Seq(ElemRef),
}

/// Container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjType {
    Map,
    List,
    Text,
}

impl ObjType {
    pub fn is_sequence(&self) -> bool {
        matches!(self, ObjType::List | ObjType::Text)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObjType::Map => "map",
            ObjType::List => "list",
            ObjType::Text => "text",
        }
    }
}

/// Primitive values an op can write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    F64(f64),
    Str(String),
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// Initial value of a counter; increments accumulate on top of it.
    Counter(i64),
}

impl ScalarValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int(_) => "int",
            ScalarValue::F64(_) => "double",
            ScalarValue::Str(_) => "str",
            ScalarValue::Bytes(_) => "bytes",
            ScalarValue::Timestamp(_) => "timestamp",
            ScalarValue::Counter(_) => "counter",
        }
    }
}

/// Payload of a `Put` or `Insert`: a scalar, or a fresh empty container whose
/// id will be the id of the op itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NewValue {
    Scalar(ScalarValue),
    Object(ObjType),
}

impl From<ScalarValue> for NewValue {
    fn from(value: ScalarValue) -> Self {
        NewValue::Scalar(value)
    }
}

impl From<ObjType> for NewValue {
    fn from(obj: ObjType) -> Self {
        NewValue::Object(obj)
    }
}

/// How a mark grows when text is inserted right at one of its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpandMark {
    /// Text typed just before the mark joins it.
    Before,
    /// Text typed just after the mark joins it.
    After,
    /// Neither edge grows.
    #[default]
    None,
    Both,
}

impl ExpandMark {
    pub fn before(&self) -> bool {
        matches!(self, ExpandMark::Before | ExpandMark::Both)
    }

    pub fn after(&self) -> bool {
        matches!(self, ExpandMark::After | ExpandMark::Both)
    }
}

/// A boundary between sequence elements, pinned to element identity so it
/// moves with the text around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// The very start of the sequence.
    Head,
    /// The boundary in front of an element.
    Before(OpId),
    /// The boundary behind an element.
    After(OpId),
    /// The very end of the sequence.
    Tail,
}

impl Anchor {
    /// The element this anchor is pinned to, if any.
    pub fn elem(&self) -> Option<OpId> {
        match self {
            Anchor::Before(id) | Anchor::After(id) => Some(*id),
            Anchor::Head | Anchor::Tail => None,
        }
    }
}

/// Payload of a `Mark`: a named value over the range `start..end` of a text.
/// A `Null` value clears the mark over that range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkRange {
    pub start: Anchor,
    pub end: Anchor,
    pub value: ScalarValue,
}

/// What an op does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpAction {
    /// Write a value into a map key or an existing sequence element.
    Put(NewValue),
    /// Insert a new sequence element after the referenced position.
    Insert(NewValue),
    /// Remove the entries listed in `pred`.
    Delete,
    /// Add a delta to the counter entries listed in `pred`.
    Increment(i64),
    /// Annotate a range of a text object. The op's key is the mark name.
    Mark(MarkRange),
}

impl OpAction {
    pub fn name(&self) -> &'static str {
        match self {
            OpAction::Put(_) => "put",
            OpAction::Insert(_) => "insert",
            OpAction::Delete => "delete",
            OpAction::Increment(_) => "increment",
            OpAction::Mark(_) => "mark",
        }
    }
}

/// One primitive mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
    pub obj: ObjId,
    pub key: Key,
    pub action: OpAction,
    /// Entries this op supersedes (put/delete) or adds to (increment),
    /// exactly as the author observed them. Kept sorted.
    pub pred: Vec<OpId>,
}

impl Op {
    /// The container this op creates, if any, given the op's own id.
    pub fn creates(&self, id: OpId) -> Option<(ObjId, ObjType)> {
        match &self.action {
            OpAction::Put(NewValue::Object(obj)) | OpAction::Insert(NewValue::Object(obj)) => {
                Some((ObjId::Op(id), *obj))
            }
            _ => None,
        }
    }
}

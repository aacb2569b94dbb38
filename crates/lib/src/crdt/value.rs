//! Value types returned by document reads.
//!
//! A [`Value`] is the resolved content at a path: either a scalar (with
//! counters already summed) or a handle to a container object that can be
//! read further through the document.

use std::fmt;

use super::register::RegisterEntry;
use crate::change::{NewValue, ObjId, ObjType, ScalarValue};

/// Values visible in a document.
///
/// # Value Types
///
/// ## Scalars
/// - [`Value::Null`], [`Value::Bool`], [`Value::Int`], [`Value::Double`]
/// - [`Value::Str`] - an atomic string, replaced as a whole on write
/// - [`Value::Bytes`] - opaque binary data
/// - [`Value::Timestamp`] - milliseconds since the Unix epoch
/// - [`Value::Counter`] - the current sum of a counter
///
/// ## Containers
/// - [`Value::Map`], [`Value::List`], [`Value::Text`] carry the id of the
///   object; the content is read through the owning document
///
/// # Direct Comparisons
///
/// ```
/// # use replidoc::Value;
/// assert!(Value::Int(42) == 42);
/// assert!(Value::Str("hi".into()) == "hi");
/// assert!(!(Value::Int(1) == "1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    Timestamp(i64),
    Counter(i64),
    Map(ObjId),
    List(ObjId),
    Text(ObjId),
}

impl Value {
    /// Resolves the content of a register entry.
    pub fn from_entry(entry: &RegisterEntry) -> Self {
        match &entry.value {
            NewValue::Object(ObjType::Map) => Value::Map(ObjId::Op(entry.id)),
            NewValue::Object(ObjType::List) => Value::List(ObjId::Op(entry.id)),
            NewValue::Object(ObjType::Text) => Value::Text(ObjId::Op(entry.id)),
            NewValue::Scalar(scalar) => match scalar {
                ScalarValue::Null => Value::Null,
                ScalarValue::Bool(b) => Value::Bool(*b),
                ScalarValue::Int(n) => Value::Int(*n),
                ScalarValue::F64(f) => Value::Double(*f),
                ScalarValue::Str(s) => Value::Str(s.clone()),
                ScalarValue::Bytes(b) => Value::Bytes(b.clone()),
                ScalarValue::Timestamp(t) => Value::Timestamp(*t),
                ScalarValue::Counter(start) => Value::Counter(start.wrapping_add(entry.increments)),
            },
        }
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Counter(_) => "counter",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Text(_) => "text",
        }
    }

    /// Id of the container, if this value is one.
    pub fn obj_id(&self) -> Option<ObjId> {
        match self {
            Value::Map(id) | Value::List(id) | Value::Text(id) => Some(*id),
            _ => None,
        }
    }

    /// Kind of the container, if this value is one.
    pub fn obj_type(&self) -> Option<ObjType> {
        match self {
            Value::Map(_) => Some(ObjType::Map),
            Value::List(_) => Some(ObjType::List),
            Value::Text(_) => Some(ObjType::Text),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        self.obj_id().is_some()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// The string content of a [`Value::Str`]. Text objects are read through
    /// the document.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_counter(&self) -> Option<i64> {
        match self {
            Value::Counter(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) | Value::Counter(n) | Value::Timestamp(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Map(id) => write!(f, "<map {id}>"),
            Value::List(id) => write!(f, "<list {id}>"),
            Value::Text(id) => write!(f, "<text {id}>"),
        }
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(n) | Value::Counter(n) if n == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

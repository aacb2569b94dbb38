//! Path resolution against the materialized tree.

use super::{Document, DocumentError};
use crate::{
    Result,
    change::{ElemRef, Key, ObjId, OpId},
    crdt::{Object, Register, Value},
    path::{Path, Segment},
};

/// Where a path points and what is visible there.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    /// Container and key holding the value; `None` for the root.
    pub slot: Option<(ObjId, Key)>,
    /// The winning value in the slot.
    pub value: Value,
}

impl ObjectRef {
    fn root() -> Self {
        Self {
            slot: None,
            value: Value::Map(ObjId::Root),
        }
    }
}

/// A register found by a single lookup step.
pub(crate) struct Slot<'a> {
    pub obj: ObjId,
    pub key: Key,
    pub register: &'a Register,
}

impl Slot<'_> {
    pub fn value(&self) -> Option<Value> {
        self.register.winner().map(Value::from_entry)
    }

    /// Entries a new write to this slot supersedes.
    pub fn pred(&self) -> Vec<OpId> {
        self.register.ids()
    }
}

fn expected_container(segment: &Segment) -> &'static str {
    match segment {
        Segment::Key(_) => "map",
        Segment::Index(_) => "list",
    }
}

impl Document {
    /// Resolves a path string.
    ///
    /// # Errors
    /// - [`PathError::InvalidPath`](crate::path::PathError::InvalidPath) for malformed syntax
    /// - [`DocumentError::UnknownField`] if a map key is absent
    /// - [`DocumentError::IndexOutOfRange`] if an index is past the visible length
    /// - [`DocumentError::TypeMismatch`] when stepping into a scalar, using a
    ///   key on a list or an index on a map
    pub fn resolve(&self, path: &str) -> Result<ObjectRef> {
        self.resolve_path(&Self::parse_path(path)?)
    }

    pub(crate) fn resolve_path(&self, path: &Path) -> Result<ObjectRef> {
        let mut current = ObjectRef::root();
        for segment in path.segments() {
            let obj = current.value.obj_id().ok_or_else(|| {
                DocumentError::type_mismatch(
                    path,
                    expected_container(segment),
                    current.value.type_name(),
                )
            })?;
            let slot = self
                .lookup(obj, segment, path)?
                .ok_or_else(|| unknown_field(path, segment))?;
            let value = slot.value().ok_or_else(|| unknown_field(path, segment))?;
            current = ObjectRef {
                slot: Some((slot.obj, slot.key)),
                value,
            };
        }
        Ok(current)
    }

    /// Looks up one segment inside container `obj`.
    ///
    /// Returns `Ok(None)` only for a map key that is absent, which writers
    /// may create; every other failure is an error.
    pub(crate) fn lookup(
        &self,
        obj: ObjId,
        segment: &Segment,
        path: &Path,
    ) -> Result<Option<Slot<'_>>> {
        match (segment, self.object(obj)?) {
            (Segment::Key(key), Object::Map(map)) => Ok(map.get(key).map(|register| Slot {
                obj,
                key: Key::Map(key.clone()),
                register,
            })),
            (Segment::Index(index), Object::List(seq) | Object::Text(seq)) => {
                let element = seq.nth(*index).ok_or_else(|| DocumentError::IndexOutOfRange {
                    path: path.to_string(),
                    index: *index,
                    len: seq.len(),
                })?;
                Ok(Some(Slot {
                    obj,
                    key: Key::Seq(ElemRef::Elem(element.id)),
                    register: &element.register,
                }))
            }
            (Segment::Key(_), other) => Err(DocumentError::type_mismatch(
                path,
                "map",
                other.obj_type().name(),
            )
            .into()),
            (Segment::Index(_), other) => Err(DocumentError::type_mismatch(
                path,
                "list",
                other.obj_type().name(),
            )
            .into()),
        }
    }
}

fn unknown_field(path: &Path, segment: &Segment) -> crate::Error {
    DocumentError::UnknownField {
        path: path.to_string(),
        field: segment.to_string(),
    }
    .into()
}

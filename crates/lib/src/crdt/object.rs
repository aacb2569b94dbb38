//! The object table.
//!
//! Every container in a document lives in one flat table keyed by [`ObjId`];
//! parents refer to children by id only. The root map is always present.
//!
//! Folding a change is split in two: [`ObjectTable::check_ops`] validates the
//! whole op list against the current table (plus whatever earlier ops in the
//! same list create) without touching anything, and only then does
//! [`ObjectTable::apply_op`] mutate. A change that fails the check leaves the
//! table exactly as it was.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::{
    errors::CRDTError,
    map::MapObject,
    mark::MarkEntry,
    register::{Register, RegisterEntry},
    seq::Sequence,
};
use crate::change::{ElemRef, Key, NewValue, ObjId, ObjType, Op, OpAction, OpId, ScalarValue};

/// A container and its content.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Map(MapObject),
    List(Sequence),
    Text(Sequence),
}

impl Object {
    pub fn new(obj_type: ObjType) -> Self {
        match obj_type {
            ObjType::Map => Object::Map(MapObject::new()),
            ObjType::List => Object::List(Sequence::new()),
            ObjType::Text => Object::Text(Sequence::new()),
        }
    }

    pub fn obj_type(&self) -> ObjType {
        match self {
            Object::Map(_) => ObjType::Map,
            Object::List(_) => ObjType::List,
            Object::Text(_) => ObjType::Text,
        }
    }

    pub fn as_map(&self) -> Option<&MapObject> {
        match self {
            Object::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Sequence> {
        match self {
            Object::List(seq) | Object::Text(seq) => Some(seq),
            Object::Map(_) => None,
        }
    }

    /// Number of visible keys or elements.
    pub fn len(&self) -> usize {
        match self {
            Object::Map(map) => map.len(),
            Object::List(seq) | Object::Text(seq) => seq.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register addressed by `key`, if it exists.
    pub fn register(&self, key: &Key) -> Option<&Register> {
        match (self, key) {
            (Object::Map(map), Key::Map(k)) => map.get(k),
            (Object::List(seq) | Object::Text(seq), Key::Seq(ElemRef::Elem(id))) => {
                seq.get(id).map(|e| &e.register)
            }
            _ => None,
        }
    }
}

/// Objects and elements created by ops that have been checked but not yet
/// applied.
#[derive(Debug, Default)]
struct Pending {
    objects: HashMap<ObjId, ObjType>,
    elements: HashSet<(ObjId, OpId)>,
}

/// Flat table of every container in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTable {
    objects: HashMap<ObjId, Object>,
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTable {
    /// A table holding only the empty root map.
    pub fn new() -> Self {
        let mut objects = HashMap::new();
        objects.insert(ObjId::Root, Object::new(ObjType::Map));
        Self { objects }
    }

    pub fn get(&self, obj: &ObjId) -> Option<&Object> {
        self.objects.get(obj)
    }

    pub fn root(&self) -> Option<&MapObject> {
        self.get(&ObjId::Root).and_then(Object::as_map)
    }

    /// Number of objects ever created, root included. Objects that were
    /// overwritten stay in the table.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Validates a list of ops as one unit.
    pub fn check_ops<'a>(
        &self,
        ops: impl IntoIterator<Item = (OpId, &'a Op)>,
    ) -> Result<(), CRDTError> {
        let mut pending = Pending::default();
        for (id, op) in ops {
            self.check_op(id, op, &pending)?;
            if let Some((obj, obj_type)) = op.creates(id) {
                pending.objects.insert(obj, obj_type);
            }
            if matches!(op.action, OpAction::Insert(_)) {
                pending.elements.insert((op.obj, id));
            }
        }
        Ok(())
    }

    fn check_op(&self, id: OpId, op: &Op, pending: &Pending) -> Result<(), CRDTError> {
        let obj_type = self
            .objects
            .get(&op.obj)
            .map(Object::obj_type)
            .or_else(|| pending.objects.get(&op.obj).copied())
            .ok_or_else(|| CRDTError::ObjectNotFound {
                obj: op.obj.to_string(),
            })?;

        let invalid = |reason: &str| CRDTError::InvalidOperation {
            operation: format!("{} {id}", op.action.name()),
            reason: reason.to_string(),
        };

        match (&op.key, obj_type) {
            (Key::Map(_), ObjType::Map) => match op.action {
                OpAction::Insert(_) => return Err(invalid("maps have no positions to insert at")),
                OpAction::Mark(_) => return Err(invalid("only text carries marks")),
                _ => {}
            },
            (Key::Map(name), ObjType::Text) => {
                let OpAction::Mark(range) = &op.action else {
                    return Err(CRDTError::TypeMismatch {
                        expected: "map".to_string(),
                        actual: obj_type.name().to_string(),
                    });
                };
                if name.is_empty() {
                    return Err(invalid("marks need a name"));
                }
                for target in [range.start.elem(), range.end.elem()].into_iter().flatten() {
                    let known = self
                        .objects
                        .get(&op.obj)
                        .and_then(Object::as_seq)
                        .is_some_and(|seq| seq.contains(&target))
                        || pending.elements.contains(&(op.obj, target));
                    if !known {
                        return Err(CRDTError::ElementNotFound {
                            obj: op.obj.to_string(),
                            elem: target.to_string(),
                        });
                    }
                }
            }
            (Key::Seq(elem), ObjType::List | ObjType::Text) => {
                match (&op.action, elem) {
                    (OpAction::Mark(_), _) => {
                        return Err(invalid("marks are keyed by name, not position"));
                    }
                    (OpAction::Insert(_), ElemRef::Head) => {}
                    (_, ElemRef::Head) => {
                        return Err(invalid("only inserts may reference the sequence head"));
                    }
                    (_, ElemRef::Elem(target)) => {
                        let known = self
                            .objects
                            .get(&op.obj)
                            .and_then(Object::as_seq)
                            .is_some_and(|seq| seq.contains(target))
                            || pending.elements.contains(&(op.obj, *target));
                        if !known {
                            return Err(CRDTError::ElementNotFound {
                                obj: op.obj.to_string(),
                                elem: target.to_string(),
                            });
                        }
                    }
                }
                if obj_type == ObjType::Text {
                    check_text_value(&op.action)?;
                }
            }
            (Key::Map(_), actual) => {
                return Err(CRDTError::TypeMismatch {
                    expected: "map".to_string(),
                    actual: actual.name().to_string(),
                });
            }
            (Key::Seq(_), actual) => {
                return Err(CRDTError::TypeMismatch {
                    expected: "list or text".to_string(),
                    actual: actual.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Folds one op into the table.
    ///
    /// Ops are expected to have passed [`check_ops`](Self::check_ops); an op
    /// that does not fit the table still fails cleanly instead of panicking.
    pub fn apply_op(&mut self, id: OpId, op: &Op) -> Result<(), CRDTError> {
        trace!(op = %id, obj = %op.obj, action = op.action.name(), "Folding op");

        let object = self
            .objects
            .get_mut(&op.obj)
            .ok_or_else(|| CRDTError::ObjectNotFound {
                obj: op.obj.to_string(),
            })?;

        match (object, &op.key) {
            (Object::Map(map), Key::Map(key)) => match &op.action {
                OpAction::Put(value) => map.put(key, RegisterEntry::new(id, value.clone()), &op.pred),
                OpAction::Delete => map.delete(key, &op.pred),
                OpAction::Increment(delta) => map.increment(key, *delta, &op.pred),
                OpAction::Insert(_) => {
                    return Err(CRDTError::InvalidOperation {
                        operation: format!("insert {id}"),
                        reason: "maps have no positions to insert at".to_string(),
                    });
                }
                OpAction::Mark(_) => {
                    return Err(CRDTError::InvalidOperation {
                        operation: format!("mark {id}"),
                        reason: "only text carries marks".to_string(),
                    });
                }
            },
            (Object::Text(seq), Key::Map(name)) => {
                let OpAction::Mark(range) = &op.action else {
                    return Err(CRDTError::TypeMismatch {
                        expected: "map".to_string(),
                        actual: ObjType::Text.name().to_string(),
                    });
                };
                seq.add_mark(MarkEntry {
                    id,
                    name: name.clone(),
                    range: range.clone(),
                });
            }
            (Object::List(seq) | Object::Text(seq), Key::Seq(elem)) => match &op.action {
                OpAction::Insert(value) => {
                    seq.insert(op.obj, *elem, RegisterEntry::new(id, value.clone()))?;
                }
                OpAction::Mark(_) => {
                    return Err(CRDTError::InvalidOperation {
                        operation: format!("mark {id}"),
                        reason: "marks are keyed by name, not position".to_string(),
                    });
                }
                action => {
                    let ElemRef::Elem(target) = elem else {
                        return Err(CRDTError::InvalidOperation {
                            operation: format!("{} {id}", action.name()),
                            reason: "only inserts may reference the sequence head".to_string(),
                        });
                    };
                    let element =
                        seq.get_mut(target)
                            .ok_or_else(|| CRDTError::ElementNotFound {
                                obj: op.obj.to_string(),
                                elem: target.to_string(),
                            })?;
                    match action {
                        OpAction::Put(value) => element
                            .register
                            .put(RegisterEntry::new(id, value.clone()), &op.pred),
                        OpAction::Delete => element.register.remove(&op.pred),
                        OpAction::Increment(delta) => element.register.increment(*delta, &op.pred),
                        OpAction::Insert(_) | OpAction::Mark(_) => {}
                    }
                }
            },
            (object, _) => {
                return Err(CRDTError::TypeMismatch {
                    expected: if object.obj_type() == ObjType::Map {
                        "sequence key".to_string()
                    } else {
                        "map key".to_string()
                    },
                    actual: object.obj_type().name().to_string(),
                });
            }
        }

        if let Some((created, obj_type)) = op.creates(id) {
            self.objects
                .entry(created)
                .or_insert_with(|| Object::new(obj_type));
        }
        Ok(())
    }
}

/// Text elements hold exactly one character each.
fn check_text_value(action: &OpAction) -> Result<(), CRDTError> {
    let value = match action {
        OpAction::Put(value) | OpAction::Insert(value) => value,
        OpAction::Delete | OpAction::Increment(_) | OpAction::Mark(_) => return Ok(()),
    };
    match value {
        NewValue::Scalar(ScalarValue::Str(s)) if s.chars().count() == 1 => Ok(()),
        NewValue::Scalar(scalar) => Err(CRDTError::TypeMismatch {
            expected: "single character".to_string(),
            actual: scalar.type_name().to_string(),
        }),
        NewValue::Object(obj) => Err(CRDTError::TypeMismatch {
            expected: "single character".to_string(),
            actual: obj.name().to_string(),
        }),
    }
}

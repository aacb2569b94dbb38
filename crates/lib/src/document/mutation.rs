//! Local edits.
//!
//! Every public method here records exactly one change, folds it into the
//! document through the same path remote changes take, and returns the
//! encoded change so the host can hand it to other replicas. Text edits live
//! in the `text` module.
//!
//! Writes to a path whose intermediate map keys do not exist yet create those
//! maps inside the same change. Lists are never created implicitly; list
//! indices on a write path must already exist.

use tracing::debug;

use super::{Document, DocumentError};
use crate::{
    Result,
    change::{
        ChangeBuilder, ElemRef, Key, NewValue, ObjId, ObjType, Op, OpAction, OpId, ScalarValue,
    },
    crdt::Value,
    path::{Path, Segment},
};

/// Container a write lands in.
struct Target {
    obj: ObjId,
    obj_type: ObjType,
    /// Created by the change under construction, so known to be empty.
    fresh: bool,
}

impl Document {
    /// Starts a local change on top of the current heads.
    pub(crate) fn begin(&self) -> ChangeBuilder {
        ChangeBuilder::new(
            self.actor,
            self.log.max_seq(&self.actor) + 1,
            self.log.max_op().saturating_add(1),
        )
        .time(self.clock().now_millis())
        .deps(self.log.heads())
    }

    /// Finalizes a local change, folds it in and returns its encoding.
    pub(crate) fn commit(&mut self, builder: ChangeBuilder) -> Result<Vec<u8>> {
        let change = builder.build()?;
        let bytes = change.encode()?;
        debug!(
            actor = %self.actor,
            seq = change.seq(),
            ops = change.len(),
            hash = %change.hash(),
            "Recording local change"
        );
        self.apply_change(change)?;
        Ok(bytes)
    }

    /// Walks `parent`, creating missing map keys as empty maps in `tx`.
    fn vivify(&self, tx: &mut ChangeBuilder, path: &Path, parent: &Path) -> Result<Target> {
        let mut target = Target {
            obj: ObjId::Root,
            obj_type: ObjType::Map,
            fresh: false,
        };

        let segments = path.segments();
        for (i, segment) in parent.segments().iter().enumerate() {
            let existing = if target.fresh {
                None
            } else {
                self.lookup(target.obj, segment, path)?
            };

            target = match existing {
                Some(slot) => {
                    let value = slot.value().unwrap_or(Value::Null);
                    match (value.obj_id(), value.obj_type()) {
                        (Some(obj), Some(obj_type)) => Target {
                            obj,
                            obj_type,
                            fresh: false,
                        },
                        _ => {
                            return Err(DocumentError::type_mismatch(
                                path,
                                "map or list",
                                value.type_name(),
                            )
                            .into());
                        }
                    }
                }
                None => {
                    let Segment::Key(key) = segment else {
                        return Err(DocumentError::type_mismatch(path, "list", "map").into());
                    };
                    // Only maps are created implicitly.
                    if matches!(segments.get(i + 1), Some(Segment::Index(_))) {
                        return Err(DocumentError::UnknownField {
                            path: path.to_string(),
                            field: key.clone(),
                        }
                        .into());
                    }
                    let id = tx.push(Op {
                        obj: target.obj,
                        key: Key::Map(key.clone()),
                        action: OpAction::Put(ObjType::Map.into()),
                        pred: vec![],
                    });
                    Target {
                        obj: ObjId::Op(id),
                        obj_type: ObjType::Map,
                        fresh: true,
                    }
                }
            };
        }
        Ok(target)
    }

    /// Key and superseded entries for writing `last` inside `target`.
    fn write_slot(
        &self,
        target: &Target,
        last: &Segment,
        path: &Path,
    ) -> Result<(Key, Vec<OpId>)> {
        if target.obj_type == ObjType::Text {
            return Err(DocumentError::type_mismatch(path, "map or list", "text").into());
        }
        if target.fresh {
            return match last {
                Segment::Key(key) => Ok((Key::Map(key.clone()), vec![])),
                Segment::Index(_) => Err(DocumentError::type_mismatch(path, "list", "map").into()),
            };
        }
        match self.lookup(target.obj, last, path)? {
            Some(slot) => {
                let pred = slot.pred();
                Ok((slot.key, pred))
            }
            None => match last {
                Segment::Key(key) => Ok((Key::Map(key.clone()), vec![])),
                Segment::Index(_) => Err(DocumentError::type_mismatch(path, "list", "map").into()),
            },
        }
    }

    /// Writes `value` at `path` in a single change.
    fn put_value(&mut self, operation: &str, path: &str, value: NewValue) -> Result<Vec<u8>> {
        let path = Self::parse_path(path)?;
        let (parent, last) = path
            .split_last()
            .ok_or_else(|| DocumentError::invalid(operation, &path, "the root cannot be overwritten"))?;
        if matches!(value, NewValue::Object(_)) && matches!(last, Segment::Index(_)) {
            return Err(DocumentError::invalid(
                operation,
                &path,
                "containers can only be created at a map key",
            )
            .into());
        }

        let mut tx = self.begin();
        let target = self.vivify(&mut tx, &path, &parent)?;
        let (key, pred) = self.write_slot(&target, last, &path)?;
        tx.push(Op {
            obj: target.obj,
            key,
            action: OpAction::Put(value),
            pred,
        });
        self.commit(tx)
    }

    pub fn put_text(&mut self, path: &str, value: &str) -> Result<Vec<u8>> {
        self.put_value("put_text", path, ScalarValue::Str(value.to_string()).into())
    }

    pub fn put_int(&mut self, path: &str, value: i64) -> Result<Vec<u8>> {
        self.put_value("put_int", path, ScalarValue::Int(value).into())
    }

    pub fn put_double(&mut self, path: &str, value: f64) -> Result<Vec<u8>> {
        self.put_value("put_double", path, ScalarValue::F64(value).into())
    }

    pub fn put_bool(&mut self, path: &str, value: bool) -> Result<Vec<u8>> {
        self.put_value("put_bool", path, ScalarValue::Bool(value).into())
    }

    pub fn put_bytes(&mut self, path: &str, value: &[u8]) -> Result<Vec<u8>> {
        self.put_value("put_bytes", path, ScalarValue::Bytes(value.to_vec()).into())
    }

    pub fn put_null(&mut self, path: &str) -> Result<Vec<u8>> {
        self.put_value("put_null", path, ScalarValue::Null.into())
    }

    /// Writes a counter starting at `initial`.
    pub fn put_counter(&mut self, path: &str, initial: i64) -> Result<Vec<u8>> {
        self.put_value("put_counter", path, ScalarValue::Counter(initial).into())
    }

    /// Writes a timestamp in milliseconds since the Unix epoch.
    pub fn put_timestamp(&mut self, path: &str, millis: i64) -> Result<Vec<u8>> {
        self.put_value("put_timestamp", path, ScalarValue::Timestamp(millis).into())
    }

    /// Writes the document clock's current time as a timestamp.
    pub fn put_timestamp_now(&mut self, path: &str) -> Result<Vec<u8>> {
        let now = self.clock().now_millis();
        self.put_timestamp(path, now)
    }

    /// Replaces the value at `path` with a new empty list.
    pub fn create_list(&mut self, path: &str) -> Result<Vec<u8>> {
        self.put_value("create_list", path, ObjType::List.into())
    }

    /// Replaces the value at `path` with a new empty text object.
    pub fn create_text(&mut self, path: &str) -> Result<Vec<u8>> {
        self.put_value("create_text", path, ObjType::Text.into())
    }

    /// Replaces the value at `path` with a new empty map.
    pub fn create_map(&mut self, path: &str) -> Result<Vec<u8>> {
        self.put_value("create_map", path, ObjType::Map.into())
    }

    /// Adds `delta` to the counter at `path`.
    ///
    /// The counter must already exist; unlike puts, increments never create
    /// anything along the path.
    pub fn inc_counter(&mut self, path: &str, delta: i64) -> Result<Vec<u8>> {
        let parsed = Self::parse_path(path)?;
        let resolved = self.resolve_path(&parsed)?;
        if !matches!(resolved.value, Value::Counter(_)) {
            return Err(
                DocumentError::type_mismatch(&parsed, "counter", resolved.value.type_name()).into(),
            );
        }
        let Some((obj, key)) = resolved.slot else {
            return Err(DocumentError::type_mismatch(&parsed, "counter", "map").into());
        };
        let pred = self
            .object(obj)?
            .register(&key)
            .map(|r| r.counter_ids())
            .unwrap_or_default();

        let mut tx = self.begin();
        tx.push(Op {
            obj,
            key,
            action: OpAction::Increment(delta),
            pred,
        });
        self.commit(tx)
    }

    /// Inserts `value` after the last element of the list at `path`.
    fn append_value(&mut self, path: &str, value: ScalarValue) -> Result<Vec<u8>> {
        let obj = match self.get(path)? {
            Value::List(obj) => obj,
            other => {
                return Err(DocumentError::type_mismatch(path, "list", other.type_name()).into());
            }
        };
        let after = self
            .object(obj)?
            .as_seq()
            .map_or(ElemRef::Head, |seq| seq.last_ref());

        let mut tx = self.begin();
        tx.push(Op {
            obj,
            key: Key::Seq(after),
            action: OpAction::Insert(value.into()),
            pred: vec![],
        });
        self.commit(tx)
    }

    pub fn append_text(&mut self, path: &str, value: &str) -> Result<Vec<u8>> {
        self.append_value(path, ScalarValue::Str(value.to_string()))
    }

    pub fn append_int(&mut self, path: &str, value: i64) -> Result<Vec<u8>> {
        self.append_value(path, ScalarValue::Int(value))
    }

    pub fn append_double(&mut self, path: &str, value: f64) -> Result<Vec<u8>> {
        self.append_value(path, ScalarValue::F64(value))
    }

    pub fn append_bool(&mut self, path: &str, value: bool) -> Result<Vec<u8>> {
        self.append_value(path, ScalarValue::Bool(value))
    }

    /// Removes the map key or list element at `path`.
    pub fn delete(&mut self, path: &str) -> Result<Vec<u8>> {
        let parsed = Self::parse_path(path)?;
        let resolved = self.resolve_path(&parsed)?;
        let Some((obj, key)) = resolved.slot else {
            return Err(DocumentError::invalid("delete", &parsed, "the root cannot be deleted").into());
        };
        let pred = self
            .object(obj)?
            .register(&key)
            .map(|r| r.ids())
            .unwrap_or_default();

        let mut tx = self.begin();
        tx.push(Op {
            obj,
            key,
            action: OpAction::Delete,
            pred,
        });
        self.commit(tx)
    }
}

//! Replicated documents.
//!
//! A [`Document`] is a tree of maps, lists and text rooted at an implicit map,
//! together with the causal log of every change that built it. Local edits go
//! through the mutation methods, each of which records exactly one change and
//! returns its encoded bytes for the host to publish. Remote changes enter
//! through [`Document::apply`]. Both paths fold changes into the tree with the
//! same code, so replicas that have seen the same set of changes hold the same
//! tree, whatever order the changes arrived in.
//!
//! # Example
//!
//! ```
//! use replidoc::Document;
//!
//! let mut alice = Document::new();
//! let change = alice.put_text("user.name", "Alice")?;
//!
//! let mut bob = Document::new();
//! bob.apply(&change)?;
//! assert_eq!(bob.get_text("user.name")?, "Alice");
//! # Ok::<(), replidoc::Error>(())
//! ```

pub mod apply;
mod diff;
pub mod errors;
pub mod export;
mod json;
pub mod mutation;
pub mod persistence;
pub mod resolve;
pub mod text;


use std::sync::Arc;

pub use errors::{DocumentError, PersistenceError};
pub use resolve::ObjectRef;

use crate::{
    Result,
    change::{ActorId, ObjId, ObjType},
    clock::{Clock, SystemClock},
    crdt::{Object, ObjectTable, Value},
    log::ChangeLog,
    path::Path,
};

/// A replica of one replicated document.
///
/// Documents are plain owned values: mutation takes `&mut self`, and distinct
/// documents share no state, so hosts may work on different documents from
/// different threads.
#[derive(Clone, Debug)]
pub struct Document {
    actor: ActorId,
    clock: Arc<dyn Clock>,
    log: ChangeLog,
    objects: ObjectTable,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with a fresh random actor.
    pub fn new() -> Self {
        Self::with_actor(ActorId::random())
    }

    /// Creates an empty document authoring as `actor`.
    ///
    /// Two live documents must never share an actor; reuse an actor only to
    /// continue a stream that is known to have stopped elsewhere.
    pub fn with_actor(actor: ActorId) -> Self {
        Self {
            actor,
            clock: Arc::new(SystemClock),
            log: ChangeLog::new(),
            objects: ObjectTable::new(),
        }
    }

    /// Replaces the clock used to timestamp local changes.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A copy of this document that authors under a fresh actor.
    pub fn fork(&self) -> Self {
        self.fork_with_actor(ActorId::random())
    }

    pub fn fork_with_actor(&self, actor: ActorId) -> Self {
        let mut forked = self.clone();
        forked.actor = actor;
        forked
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The causal log of applied changes.
    pub fn log(&self) -> &ChangeLog {
        &self.log
    }

    pub(crate) fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    pub(crate) fn object(&self, obj: ObjId) -> Result<&Object> {
        self.objects.get(&obj).ok_or_else(|| {
            crate::crdt::CRDTError::ObjectNotFound {
                obj: obj.to_string(),
            }
            .into()
        })
    }

    /// Reads the value at `path`.
    ///
    /// Containers come back as handles ([`Value::Map`], [`Value::List`],
    /// [`Value::Text`]) that identify the object; use the other read methods
    /// with a path to look inside them.
    pub fn get(&self, path: &str) -> Result<Value> {
        Ok(self.resolve(path)?.value)
    }

    fn get_as<T>(
        &self,
        path: &str,
        expected: &str,
        extract: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<T> {
        let value = self.get(path)?;
        extract(&value).ok_or_else(|| {
            DocumentError::type_mismatch(path, expected, value.type_name()).into()
        })
    }

    /// Reads a string, from either a plain string value or a text object.
    pub fn get_text(&self, path: &str) -> Result<String> {
        match self.get(path)? {
            Value::Str(s) => Ok(s),
            Value::Text(obj) => self.text_content(obj),
            other => Err(DocumentError::type_mismatch(path, "str or text", other.type_name()).into()),
        }
    }

    pub fn get_int(&self, path: &str) -> Result<i64> {
        self.get_as(path, "int", Value::as_int)
    }

    pub fn get_double(&self, path: &str) -> Result<f64> {
        self.get_as(path, "double", Value::as_double)
    }

    pub fn get_bool(&self, path: &str) -> Result<bool> {
        self.get_as(path, "bool", Value::as_bool)
    }

    /// Reads the current sum of a counter.
    pub fn get_counter(&self, path: &str) -> Result<i64> {
        self.get_as(path, "counter", Value::as_counter)
    }

    /// Reads a timestamp in milliseconds since the Unix epoch.
    pub fn get_timestamp(&self, path: &str) -> Result<i64> {
        self.get_as(path, "timestamp", Value::as_timestamp)
    }

    pub fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.get_as(path, "bytes", |v| v.as_bytes().map(<[u8]>::to_vec))
    }

    /// Resolves `path` to a container of one of the given kinds.
    fn container(&self, path: &str, kinds: &[ObjType], expected: &str) -> Result<&Object> {
        let value = self.get(path)?;
        match value.obj_id() {
            Some(obj) if value.obj_type().is_some_and(|t| kinds.contains(&t)) => self.object(obj),
            _ => Err(DocumentError::type_mismatch(path, expected, value.type_name()).into()),
        }
    }

    /// Number of visible elements of a list, or characters of a text.
    pub fn list_len(&self, path: &str) -> Result<usize> {
        Ok(self
            .container(path, &[ObjType::List, ObjType::Text], "list or text")?
            .len())
    }

    /// Number of keys in a map. The empty path (or `$`) is the root.
    pub fn map_size(&self, path: &str) -> Result<usize> {
        Ok(self.container(path, &[ObjType::Map], "map")?.len())
    }

    /// Keys of a map, in sorted order.
    pub fn keys(&self, path: &str) -> Result<Vec<String>> {
        let object = self.container(path, &[ObjType::Map], "map")?;
        Ok(object
            .as_map()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Values of a map in key order, or of a list or text in sequence order.
    pub fn values(&self, path: &str) -> Result<Vec<Value>> {
        let object = self.container(
            path,
            &[ObjType::Map, ObjType::List, ObjType::Text],
            "map, list or text",
        )?;
        let values = match object {
            Object::Map(map) => map
                .iter()
                .filter_map(|(_, register)| register.winner().map(Value::from_entry))
                .collect(),
            Object::List(seq) | Object::Text(seq) => seq
                .visible()
                .filter_map(|e| e.register.winner().map(Value::from_entry))
                .collect(),
        };
        Ok(values)
    }

    /// Every concurrently written value at `path`, lowest op id first. The
    /// last one is what [`get`](Self::get) returns.
    pub fn conflicts(&self, path: &str) -> Result<Vec<Value>> {
        let resolved = self.resolve(path)?;
        let Some((obj, key)) = resolved.slot else {
            return Ok(vec![resolved.value]);
        };
        let register = self.object(obj)?.register(&key);
        Ok(register
            .map(|r| r.entries().iter().map(Value::from_entry).collect())
            .unwrap_or_default())
    }

    /// Renders the visible characters of a text object.
    pub(crate) fn text_content(&self, obj: ObjId) -> Result<String> {
        let seq = self.object(obj)?.as_seq().ok_or_else(|| {
            DocumentError::type_mismatch(obj.to_string(), "text", "map")
        })?;
        Ok(seq
            .visible()
            .filter_map(|e| e.register.winner())
            .filter_map(|entry| match Value::from_entry(entry) {
                Value::Str(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    /// Parses a path string.
    pub(crate) fn parse_path(path: &str) -> Result<Path> {
        Ok(Path::parse(path)?)
    }
}

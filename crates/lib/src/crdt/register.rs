//! Multi-value registers.
//!
//! A [`Register`] is the slot behind one map key or one sequence element. It
//! keeps every concurrently written entry instead of picking one up front, so
//! the final value does not depend on the order ops arrive in: an op only ever
//! removes the entries its author had observed (its `pred`), and the winner is
//! whichever surviving entry has the greatest [`OpId`].

use crate::change::{NewValue, ObjType, OpId, ScalarValue};

/// One live write in a register.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterEntry {
    /// Id of the op that wrote this entry.
    pub id: OpId,
    pub value: NewValue,
    /// Sum of increments applied to a counter entry.
    pub increments: i64,
}

impl RegisterEntry {
    pub fn new(id: OpId, value: NewValue) -> Self {
        Self {
            id,
            value,
            increments: 0,
        }
    }

    /// Container this entry holds, if any. Its id is the entry's own id.
    pub fn object(&self) -> Option<ObjType> {
        match self.value {
            NewValue::Object(obj) => Some(obj),
            NewValue::Scalar(_) => None,
        }
    }

    pub fn is_counter(&self) -> bool {
        matches!(self.value, NewValue::Scalar(ScalarValue::Counter(_)))
    }
}

/// Conflict set of entries, sorted by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Register {
    entries: Vec<RegisterEntry>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    /// A register holding a single entry.
    pub fn with_entry(entry: RegisterEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    /// An empty register is a deleted key or a tombstoned element.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The entry with the greatest id.
    pub fn winner(&self) -> Option<&RegisterEntry> {
        self.entries.last()
    }

    /// All live entries, lowest id first.
    pub fn entries(&self) -> &[RegisterEntry] {
        &self.entries
    }

    /// Ids of all live entries; what a new local write supersedes.
    pub fn ids(&self) -> Vec<OpId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Ids of the live counter entries; what a local increment targets.
    pub fn counter_ids(&self) -> Vec<OpId> {
        self.entries
            .iter()
            .filter(|e| e.is_counter())
            .map(|e| e.id)
            .collect()
    }

    /// Records a write that supersedes `pred`.
    pub fn put(&mut self, entry: RegisterEntry, pred: &[OpId]) {
        self.remove(pred);
        match self.entries.binary_search_by(|e| e.id.cmp(&entry.id)) {
            Ok(_) => {}
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    /// Drops the entries listed in `pred`. Entries a concurrent op wrote
    /// survive.
    pub fn remove(&mut self, pred: &[OpId]) {
        if !pred.is_empty() {
            self.entries.retain(|e| !pred.contains(&e.id));
        }
    }

    /// Adds `delta` to each counter entry in `pred` that is still live.
    pub fn increment(&mut self, delta: i64, pred: &[OpId]) {
        for entry in &mut self.entries {
            if entry.is_counter() && pred.contains(&entry.id) {
                entry.increments = entry.increments.wrapping_add(delta);
            }
        }
    }
}

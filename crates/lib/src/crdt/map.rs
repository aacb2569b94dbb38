//! Replicated maps.
//!
//! Each key owns a [`Register`]; keys whose register empties out are dropped,
//! so iteration only ever sees live keys.

use std::collections::BTreeMap;

use super::register::{Register, RegisterEntry};
use crate::change::OpId;

/// A map from string keys to registers, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapObject {
    entries: BTreeMap<String, Register>,
}

impl MapObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Register> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Register)> {
        self.entries.iter()
    }

    /// Records a write to `key` superseding `pred`.
    pub fn put(&mut self, key: &str, entry: RegisterEntry, pred: &[OpId]) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .put(entry, pred);
    }

    /// Removes the `pred` entries of `key`, dropping the key once empty.
    pub fn delete(&mut self, key: &str, pred: &[OpId]) {
        if let Some(register) = self.entries.get_mut(key) {
            register.remove(pred);
            if register.is_empty() {
                self.entries.remove(key);
            }
        }
    }

    pub fn increment(&mut self, key: &str, delta: i64, pred: &[OpId]) {
        if let Some(register) = self.entries.get_mut(key) {
            register.increment(delta, pred);
        }
    }
}

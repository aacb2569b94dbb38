//! A keyed registry of documents for hosts that manage many of them.
//!
//! The store owns its documents outright; documents under different keys share
//! no state. Hosts that need to reach documents from several threads wrap the
//! store (or individual documents) in their own locks.

mod errors;
pub use errors::StoreError;

use std::collections::HashMap;

use tracing::debug;

use crate::{Document, Result};

/// Documents addressed by string key.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: HashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.docs.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.docs.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Registers a new empty document under `key`.
    pub fn create(&mut self, key: &str) -> Result<&mut Document> {
        self.insert(key, Document::new())
    }

    /// Registers `doc` under `key`.
    pub fn insert(&mut self, key: &str, doc: Document) -> Result<&mut Document> {
        if self.docs.contains_key(key) {
            return Err(StoreError::DocumentExists {
                key: key.to_string(),
            }
            .into());
        }
        debug!(key, actor = %doc.actor(), "Registered document");
        Ok(self.docs.entry(key.to_string()).or_insert(doc))
    }

    /// Registers the document saved in `bytes` under `key`.
    pub fn load(&mut self, key: &str, bytes: &[u8]) -> Result<&mut Document> {
        if self.docs.contains_key(key) {
            return Err(StoreError::DocumentExists {
                key: key.to_string(),
            }
            .into());
        }
        let doc = Document::load(bytes)?;
        self.insert(key, doc)
    }

    pub fn get(&self, key: &str) -> Result<&Document> {
        self.docs.get(key).ok_or_else(|| unknown(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Document> {
        self.docs.get_mut(key).ok_or_else(|| unknown(key))
    }

    /// Unregisters and returns the document under `key`.
    pub fn remove(&mut self, key: &str) -> Result<Document> {
        self.docs.remove(key).ok_or_else(|| unknown(key))
    }
}

fn unknown(key: &str) -> crate::Error {
    StoreError::UnknownDocument {
        key: key.to_string(),
    }
    .into()
}

//! Exporting history for synchronization.

use super::Document;
use crate::{
    Result,
    change::{Change, ChangeHash},
    log::traversal::ancestors,
};

impl Document {
    /// Every applied change, wire encoded, in causal order.
    ///
    /// Applying the result to an empty document (as one batch, or one by one
    /// in this order) reproduces this document's state.
    pub fn changes(&self) -> Result<Vec<Vec<u8>>> {
        self.log
            .iter()
            .map(|c| c.encode().map_err(Into::into))
            .collect()
    }

    pub fn num_changes(&self) -> usize {
        self.log.len()
    }

    /// Hashes of the changes nothing else depends on yet, sorted.
    pub fn heads(&self) -> Vec<ChangeHash> {
        self.log.heads()
    }

    /// Hashes of every applied change, in causal order.
    pub fn change_hashes(&self) -> Vec<ChangeHash> {
        self.log.iter().map(Change::hash).collect()
    }

    /// Encoded changes a peer whose heads are `have` is missing.
    ///
    /// Heads this document does not know are ignored, so an empty `have`
    /// (or one made only of unknown hashes) returns the full history.
    pub fn changes_since(&self, have: &[ChangeHash]) -> Result<Vec<Vec<u8>>> {
        let covered = ancestors(&self.log, have);
        self.log
            .iter()
            .filter(|c| !covered.contains(&c.hash()))
            .map(|c| c.encode().map_err(Into::into))
            .collect()
    }

    /// A single applied change.
    pub fn get_change(&self, hash: &ChangeHash) -> Option<&Change> {
        self.log.get(hash)
    }
}

//! Applying changes from other replicas.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace, warn};

use super::Document;
use crate::{
    Result,
    change::{Change, ChangeHash},
    log::LogError,
};

impl Document {
    /// Applies one encoded change.
    ///
    /// A change that is already in the log is accepted without effect. A change
    /// whose deps are not all present is rejected with
    /// [`LogError::MissingDependency`] and leaves the document untouched, so the
    /// host can buffer it and retry once the deps arrive.
    ///
    /// # Errors
    /// - [`ChangeError::MalformedChange`](crate::change::ChangeError::MalformedChange)
    ///   if the bytes do not decode or the hash does not match
    /// - [`LogError::MissingDependency`] if deps are missing
    /// - a CRDT error if an op references objects or elements that do not exist
    pub fn apply(&mut self, bytes: &[u8]) -> Result<()> {
        let change = Change::decode(bytes)?;
        self.apply_change(change)?;
        Ok(())
    }

    /// Applies a batch of encoded changes in any order.
    ///
    /// Every blob is decoded before anything is applied, so a malformed blob
    /// rejects the whole batch. The rest is applied repeatedly until no more
    /// changes become ready. Changes whose deps are still missing at that
    /// point are reported together in one [`LogError::MissingDependency`];
    /// everything else in the batch has been applied by then.
    ///
    /// Returns the number of changes that were new to this document.
    pub fn apply_changes<I, B>(&mut self, batch: I) -> Result<usize>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut pending = batch
            .into_iter()
            .map(|bytes| Change::decode(bytes.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut applied = 0;
        loop {
            let mut progressed = false;
            let mut waiting = Vec::with_capacity(pending.len());
            for change in pending {
                if self.log.contains(&change.hash()) {
                    continue;
                }
                if !self.log.missing_deps(&change).is_empty() {
                    waiting.push(change);
                    continue;
                }
                if self.apply_change(change)? {
                    applied += 1;
                }
                progressed = true;
            }
            pending = waiting;
            if pending.is_empty() || !progressed {
                break;
            }
        }

        if !pending.is_empty() {
            let queued: HashSet<ChangeHash> = pending.iter().map(Change::hash).collect();
            let mut missing: BTreeSet<ChangeHash> = pending
                .iter()
                .flat_map(|c| c.deps().iter().copied())
                .filter(|dep| !self.log.contains(dep) && !queued.contains(dep))
                .collect();
            if missing.is_empty() {
                missing = pending
                    .iter()
                    .flat_map(|c| self.log.missing_deps(c))
                    .collect();
            }
            warn!(
                pending = pending.len(),
                missing = missing.len(),
                "Batch left changes with unmet dependencies"
            );
            return Err(LogError::MissingDependency {
                missing: missing.into_iter().collect(),
            }
            .into());
        }

        Ok(applied)
    }

    /// Brings in every change `other` has that this document lacks.
    ///
    /// Returns the number of changes applied.
    pub fn merge(&mut self, other: &Document) -> Result<usize> {
        let mut applied = 0;
        for change in other.log.iter() {
            if !self.log.contains(&change.hash()) && self.apply_change(change.clone())? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Checks, folds and records one decoded change.
    ///
    /// Returns `false` for a change that was already applied. Nothing is
    /// modified unless every op passes validation.
    pub(crate) fn apply_change(&mut self, change: Change) -> Result<bool> {
        let hash = change.hash();
        if self.log.contains(&hash) {
            trace!(hash = %hash, "Change already applied");
            return Ok(false);
        }

        if let Err(err) = self.log.check(&change) {
            warn!(hash = %hash, actor = %change.actor(), seq = change.seq(), error = %err, "Rejected change");
            return Err(err.into());
        }
        if let Err(err) = self.objects.check_ops(change.ops_with_ids()) {
            warn!(hash = %hash, actor = %change.actor(), seq = change.seq(), error = %err, "Rejected change");
            return Err(err.into());
        }

        for (id, op) in change.ops_with_ids() {
            self.objects.apply_op(id, op)?;
        }

        debug!(
            hash = %hash,
            actor = %change.actor(),
            seq = change.seq(),
            ops = change.len(),
            deps = change.deps().len(),
            "Applied change"
        );
        self.log.append(change)?;
        Ok(true)
    }
}

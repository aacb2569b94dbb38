//! The causal change log.
//!
//! A [`ChangeLog`] holds every change a document has applied, in the order it
//! applied them. Because a change is only admitted once all of its deps are
//! present, that order is always a valid topological order of the change DAG.

pub mod errors;
pub mod traversal;

use std::collections::{BTreeSet, HashMap};

pub use errors::LogError;

use crate::change::{ActorId, Change, ChangeHash};

/// Per-actor progress through its own change stream.
#[derive(Clone, Copy, Debug, Default)]
struct ActorProgress {
    seq: u64,
    max_op: u64,
}

/// Append-only record of applied changes.
///
/// Besides causal order, the log enforces that each actor's changes form one
/// unbroken stream: seq numbers go up by exactly one, and every change starts
/// its op counters above all counters the same actor used before. Together
/// these keep op ids unique across the whole history.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    changes: Vec<Change>,
    index: HashMap<ChangeHash, usize>,
    by_seq: HashMap<(ActorId, u64), ChangeHash>,
    actors: HashMap<ActorId, ActorProgress>,
    max_op: u64,
    heads: BTreeSet<ChangeHash>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn contains(&self, hash: &ChangeHash) -> bool {
        self.index.contains_key(hash)
    }

    pub fn get(&self, hash: &ChangeHash) -> Option<&Change> {
        self.index.get(hash).map(|&i| &self.changes[i])
    }

    /// Changes in application order.
    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Hashes of the changes no other applied change depends on, sorted.
    pub fn heads(&self) -> Vec<ChangeHash> {
        self.heads.iter().copied().collect()
    }

    /// Largest op counter seen in any applied change.
    pub fn max_op(&self) -> u64 {
        self.max_op
    }

    /// Highest sequence number applied for `actor`, or 0.
    pub fn max_seq(&self, actor: &ActorId) -> u64 {
        self.actors.get(actor).map_or(0, |p| p.seq)
    }

    /// Largest op counter `actor` has used in an applied change, or 0.
    pub fn actor_max_op(&self, actor: &ActorId) -> u64 {
        self.actors.get(actor).map_or(0, |p| p.max_op)
    }

    /// Dependencies of `change` this log does not contain.
    pub fn missing_deps(&self, change: &Change) -> Vec<ChangeHash> {
        change
            .deps()
            .iter()
            .filter(|dep| !self.contains(dep))
            .copied()
            .collect()
    }

    /// Checks that `change` may be appended: every dep is present, no other
    /// change holds its `(actor, seq)` slot, its seq directly follows the
    /// actor's last one and its op counters are all new for that actor.
    /// Duplicates pass; callers test [`contains`](Self::contains) first.
    pub fn check(&self, change: &Change) -> Result<(), LogError> {
        let missing = self.missing_deps(change);
        if !missing.is_empty() {
            return Err(LogError::MissingDependency { missing });
        }

        let actor = *change.actor();
        if let Some(existing) = self.by_seq.get(&(actor, change.seq()))
            && *existing != change.hash()
        {
            return Err(LogError::SeqConflict {
                actor,
                seq: change.seq(),
            });
        }

        let progress = self.actors.get(&actor).copied().unwrap_or_default();
        if change.seq() != progress.seq + 1 {
            return Err(LogError::SeqGap {
                actor,
                expected: progress.seq + 1,
                seq: change.seq(),
            });
        }
        if change.start_op() <= progress.max_op {
            return Err(LogError::OpCounterReused {
                actor,
                start_op: change.start_op(),
                max_op: progress.max_op,
            });
        }
        Ok(())
    }

    /// Appends a change. Returns `false` (and does nothing) if it is already
    /// present.
    pub fn append(&mut self, change: Change) -> Result<bool, LogError> {
        let hash = change.hash();
        if self.contains(&hash) {
            return Ok(false);
        }
        self.check(&change)?;

        for dep in change.deps() {
            self.heads.remove(dep);
        }
        self.heads.insert(hash);

        let actor = *change.actor();
        self.by_seq.insert((actor, change.seq()), hash);
        let progress = self.actors.entry(actor).or_default();
        progress.seq = change.seq();
        progress.max_op = progress.max_op.max(change.max_op());
        self.max_op = self.max_op.max(change.max_op());

        self.index.insert(hash, self.changes.len());
        self.changes.push(change);
        Ok(true)
    }
}

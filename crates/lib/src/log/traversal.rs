//! Traversal of the change DAG.
//!
//! Ordering a loose set of changes so each follows its deps, and walking
//! backwards from a set of heads to find everything they already cover.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::trace;

use super::{ChangeLog, LogError};
use crate::change::{Change, ChangeHash};

/// Orders `changes` so that every change comes after all of its deps.
///
/// Deps that are not part of `changes` must be in `known`; anything else is
/// reported as [`LogError::MissingDependency`]. Among changes that are ready at
/// the same time the input order is kept, so an already causal sequence comes
/// back unchanged.
///
/// # Errors
/// - [`LogError::DuplicateChange`] if the same hash appears twice
/// - [`LogError::MissingDependency`] for deps found nowhere
/// - [`LogError::CycleDetected`] if the deps form a cycle
pub fn topological_order(
    changes: Vec<Change>,
    known: &HashSet<ChangeHash>,
) -> Result<Vec<Change>, LogError> {
    let mut position: HashMap<ChangeHash, usize> = HashMap::with_capacity(changes.len());
    for (i, change) in changes.iter().enumerate() {
        if position.insert(change.hash(), i).is_some() {
            return Err(LogError::DuplicateChange {
                hash: change.hash(),
            });
        }
    }

    let mut in_degree = vec![0usize; changes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); changes.len()];
    let mut missing = BTreeSet::new();
    for (i, change) in changes.iter().enumerate() {
        for dep in change.deps() {
            if let Some(&parent) = position.get(dep) {
                in_degree[i] += 1;
                dependents[parent].push(i);
            } else if !known.contains(dep) {
                missing.insert(*dep);
            }
        }
    }
    if !missing.is_empty() {
        return Err(LogError::MissingDependency {
            missing: missing.into_iter().collect(),
        });
    }

    // Kahn's algorithm, always taking the earliest ready input position.
    let mut ready: BTreeSet<usize> = (0..changes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(changes.len());
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &child in &dependents[i] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.insert(child);
            }
        }
    }

    if order.len() != changes.len() {
        return Err(LogError::CycleDetected {
            count: changes.len() - order.len(),
        });
    }

    let mut slots: Vec<Option<Change>> = changes.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

/// All changes reachable from `heads` through deps, the heads included.
///
/// Hashes the log does not contain are ignored.
pub fn ancestors(log: &ChangeLog, heads: &[ChangeHash]) -> HashSet<ChangeHash> {
    let mut seen = HashSet::new();
    let mut queue: VecDeque<ChangeHash> = heads
        .iter()
        .filter(|h| log.contains(h))
        .copied()
        .collect();

    while let Some(hash) = queue.pop_front() {
        if !seen.insert(hash) {
            continue;
        }
        if let Some(change) = log.get(&hash) {
            for dep in change.deps() {
                if !seen.contains(dep) {
                    queue.push_back(*dep);
                }
            }
        }
    }

    trace!(heads = heads.len(), covered = seen.len(), "Computed ancestor set");
    seen
}

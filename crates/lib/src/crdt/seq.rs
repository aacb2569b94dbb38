//! Replicated growable arrays for lists and text.
//!
//! Elements are identified by the op that inserted them and are never removed:
//! deleting an element empties its register, leaving a tombstone that still
//! anchors later inserts. Concurrent inserts after the same reference are
//! ordered by id, greatest first, and an insert skips over the subtrees of
//! siblings that outrank it. Because op counters are Lamport clocks, every
//! element in such a subtree has a greater id than its root, so "skip while
//! the next id is greater" is the whole rule.

use super::{
    errors::CRDTError,
    mark::{self, MarkEntry, MarkSpan},
    register::{Register, RegisterEntry},
};
use crate::change::{ElemRef, ObjId, OpId};

/// One sequence slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Id of the insert op; the element's stable identity.
    pub id: OpId,
    /// Element this one was inserted after.
    pub origin: ElemRef,
    pub register: Register,
}

impl Element {
    pub fn is_visible(&self) -> bool {
        !self.register.is_empty()
    }
}

/// Ordered elements of a list or text object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    elements: Vec<Element>,
    /// Range annotations, sorted by op id. Only text objects carry any.
    marks: Vec<MarkEntry>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible elements.
    pub fn len(&self) -> usize {
        self.elements.iter().filter(|e| e.is_visible()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements including tombstones.
    pub fn total_len(&self) -> usize {
        self.elements.len()
    }

    /// Visible elements in order.
    pub fn visible(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_visible())
    }

    /// The visible element at `index`.
    pub fn nth(&self, index: usize) -> Option<&Element> {
        self.visible().nth(index)
    }

    /// Reference to the last element, tombstones included.
    pub fn last_ref(&self) -> ElemRef {
        self.elements
            .last()
            .map_or(ElemRef::Head, |e| ElemRef::Elem(e.id))
    }

    /// Reference to the element preceding visible `index`: the position a
    /// new element at `index` is inserted after.
    pub fn insert_ref(&self, index: usize) -> Option<ElemRef> {
        if index == 0 {
            return Some(ElemRef::Head);
        }
        self.nth(index - 1).map(|e| ElemRef::Elem(e.id))
    }

    pub fn contains(&self, id: &OpId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &OpId) -> Option<&Element> {
        self.position(id).map(|i| &self.elements[i])
    }

    pub fn get_mut(&mut self, id: &OpId) -> Option<&mut Element> {
        let i = self.position(id)?;
        Some(&mut self.elements[i])
    }

    fn position(&self, id: &OpId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == *id)
    }

    /// Integrates a newly inserted element after `origin`.
    pub fn insert(
        &mut self,
        obj: ObjId,
        origin: ElemRef,
        entry: RegisterEntry,
    ) -> Result<(), CRDTError> {
        let id = entry.id;
        if self.contains(&id) {
            return Ok(());
        }
        let mut pos = match origin {
            ElemRef::Head => 0,
            ElemRef::Elem(after) => {
                self.position(&after)
                    .ok_or_else(|| CRDTError::ElementNotFound {
                        obj: obj.to_string(),
                        elem: after.to_string(),
                    })?
                    + 1
            }
        };
        while pos < self.elements.len() && self.elements[pos].id > id {
            pos += 1;
        }
        self.elements.insert(
            pos,
            Element {
                id,
                origin,
                register: Register::with_entry(entry),
            },
        );
        Ok(())
    }

    /// Records a mark. Applying the same mark twice is a no-op.
    pub fn add_mark(&mut self, entry: MarkEntry) {
        if let Err(at) = self.marks.binary_search_by(|m| m.id.cmp(&entry.id)) {
            self.marks.insert(at, entry);
        }
    }

    pub fn marks(&self) -> &[MarkEntry] {
        &self.marks
    }

    /// Visible mark spans over the current elements.
    pub fn mark_spans(&self) -> Vec<MarkSpan> {
        mark::spans(&self.elements, &self.marks)
    }
}

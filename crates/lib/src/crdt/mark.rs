//! Range annotations on text.
//!
//! A mark names a value (`bold = true`, `comment = "c1"`) over a range of a
//! text object. Its edges are [`Anchor`]s pinned to element ids rather than
//! offsets, so the range follows the characters it was placed on as other
//! replicas insert and delete around it.
//!
//! Marks are never removed. Clearing a range records a mark with a `Null`
//! value, and for every character the mark of a given name with the greatest
//! op id covering it decides its value. That makes the visible spans a pure
//! function of the set of marks, independent of arrival order.

use std::collections::{BTreeSet, HashMap};

use super::seq::Element;
use crate::change::{Anchor, MarkRange, OpId, ScalarValue};

/// A mark as recorded by one op.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkEntry {
    /// Id of the mark op; later ids win where marks of one name overlap.
    pub id: OpId,
    pub name: String,
    pub range: MarkRange,
}

/// A run of characters carrying one mark value, in visible offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkSpan {
    pub name: String,
    pub value: ScalarValue,
    /// Offset of the first marked character.
    pub start: usize,
    /// Offset one past the last marked character.
    pub end: usize,
}

/// Raw index range `start..end` an anchor pair covers in `elements`.
fn covered(range: &MarkRange, positions: &HashMap<OpId, usize>, total: usize) -> Option<(usize, usize)> {
    let boundary = |anchor: &Anchor| -> Option<usize> {
        match anchor {
            Anchor::Head => Some(0),
            Anchor::Before(id) => positions.get(id).copied(),
            Anchor::After(id) => positions.get(id).map(|p| p + 1),
            Anchor::Tail => Some(total),
        }
    };
    Some((boundary(&range.start)?, boundary(&range.end)?))
}

/// Computes the visible spans of every mark name, ordered by start offset
/// and then name. Adjacent characters with equal values form one span;
/// cleared characters belong to none.
pub(crate) fn spans(elements: &[Element], marks: &[MarkEntry]) -> Vec<MarkSpan> {
    if marks.is_empty() {
        return Vec::new();
    }
    let positions: HashMap<OpId, usize> = elements
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id, i))
        .collect();
    let ranges: Vec<(&MarkEntry, usize, usize)> = marks
        .iter()
        .filter_map(|mark| {
            let (start, end) = covered(&mark.range, &positions, elements.len())?;
            Some((mark, start, end))
        })
        .collect();
    let names: BTreeSet<&str> = marks.iter().map(|m| m.name.as_str()).collect();

    let mut result = Vec::new();
    for name in names {
        let mut open: Option<MarkSpan> = None;
        let mut offset = 0;
        for (raw, element) in elements.iter().enumerate() {
            if !element.is_visible() {
                continue;
            }
            // Marks are sorted by id, so the last one covering wins.
            let value = ranges
                .iter()
                .filter(|(mark, start, end)| mark.name == name && *start <= raw && raw < *end)
                .last()
                .map(|(mark, _, _)| &mark.range.value)
                .filter(|value| **value != ScalarValue::Null);

            let extends = matches!(
                (&open, value),
                (Some(span), Some(value)) if span.value == *value
            );
            if extends {
                if let Some(span) = open.as_mut() {
                    span.end = offset + 1;
                }
            } else {
                result.extend(open.take());
                open = value.map(|value| MarkSpan {
                    name: name.to_string(),
                    value: value.clone(),
                    start: offset,
                    end: offset + 1,
                });
            }
            offset += 1;
        }
        result.extend(open);
    }
    result.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.name.cmp(&b.name)));
    result
}

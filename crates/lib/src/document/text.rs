//! Text editing: splices, marks and unified-diff patches.
//!
//! Every edit here works on a text object. When the path holds a plain
//! string instead, the string is first converted into a text object with the
//! same content in a change of its own, and the edit follows as a second
//! change. The methods return the encoded changes in the order they were
//! recorded; an edit that changes nothing records nothing.

use tracing::debug;

use super::{Document, DocumentError, diff};
use crate::{
    Result,
    change::{
        Anchor, ChangeBuilder, ElemRef, ExpandMark, Key, MarkRange, ObjId, ObjType, Op, OpAction,
        ScalarValue,
    },
    crdt::{MarkSpan, Value},
    path::Path,
};

/// Replaces `delete` characters at `offset` with `insert`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextEdit {
    pub offset: usize,
    pub delete: usize,
    pub insert: String,
}

impl Document {
    /// Resolves `path` to a text object for editing.
    ///
    /// `prepare` sees the current content before anything is recorded, so a
    /// rejected edit never leaves a converted string behind. A plain string
    /// is converted once `prepare` succeeds, and the conversion's encoded
    /// change is pushed to `emitted`.
    fn text_for_edit<T>(
        &mut self,
        parsed: &Path,
        emitted: &mut Vec<Vec<u8>>,
        prepare: impl FnOnce(&str) -> Result<T>,
    ) -> Result<(ObjId, T)> {
        let resolved = self.resolve_path(parsed)?;
        match resolved.value {
            Value::Text(obj) => {
                let prepared = prepare(&self.text_content(obj)?)?;
                Ok((obj, prepared))
            }
            Value::Str(content) => {
                let prepared = prepare(&content)?;
                let Some((obj, key)) = resolved.slot else {
                    return Err(DocumentError::type_mismatch(parsed, "text", "map").into());
                };
                let pred = self
                    .object(obj)?
                    .register(&key)
                    .map(|r| r.ids())
                    .unwrap_or_default();

                let mut tx = self.begin();
                let text_id = tx.push(Op {
                    obj,
                    key,
                    action: OpAction::Put(ObjType::Text.into()),
                    pred,
                });
                let text = ObjId::Op(text_id);
                push_chars(&mut tx, text, ElemRef::Head, &content);
                debug!(path = %parsed, "Converting string to text");
                emitted.push(self.commit(tx)?);
                Ok((text, prepared))
            }
            other => {
                Err(DocumentError::type_mismatch(parsed, "str or text", other.type_name()).into())
            }
        }
    }

    /// Records `edits` to `text` as one change. Edits are in ascending,
    /// non-overlapping offsets of the current content.
    fn commit_edits(&mut self, text: ObjId, edits: &[TextEdit]) -> Result<Option<Vec<u8>>> {
        if edits.iter().all(|e| e.delete == 0 && e.insert.is_empty()) {
            return Ok(None);
        }
        let seq = self
            .object(text)?
            .as_seq()
            .ok_or_else(|| DocumentError::type_mismatch(text.to_string(), "text", "map"))?;
        let visible: Vec<_> = seq.visible().map(|e| (e.id, e.register.ids())).collect();

        let mut tx = self.begin();
        for edit in edits {
            let out_of_range = || DocumentError::IndexOutOfRange {
                path: text.to_string(),
                index: edit.offset + edit.delete,
                len: visible.len(),
            };
            let removed = visible
                .get(edit.offset..edit.offset + edit.delete)
                .ok_or_else(out_of_range)?;
            for (id, pred) in removed {
                tx.push(Op {
                    obj: text,
                    key: Key::Seq(ElemRef::Elem(*id)),
                    action: OpAction::Delete,
                    pred: pred.clone(),
                });
            }
            let after = match edit.offset {
                0 => ElemRef::Head,
                n => ElemRef::Elem(visible.get(n - 1).ok_or_else(out_of_range)?.0),
            };
            push_chars(&mut tx, text, after, &edit.insert);
        }
        self.commit(tx).map(Some)
    }

    /// Deletes characters at `offset` and inserts `insert` there.
    ///
    /// Offsets count Unicode scalar values. A positive `delete` removes that
    /// many characters from `offset` onwards; a negative one removes them
    /// backwards from `offset`, and the insert lands where the deletion
    /// started. Either way the run is clamped to the text.
    pub fn splice_text(
        &mut self,
        path: &str,
        offset: usize,
        delete: isize,
        insert: &str,
    ) -> Result<Vec<Vec<u8>>> {
        let parsed = Self::parse_path(path)?;
        let mut emitted = Vec::new();
        let (text, edit) = self.text_for_edit(&parsed, &mut emitted, |content| {
            let len = content.chars().count();
            if offset > len {
                return Err(DocumentError::IndexOutOfRange {
                    path: parsed.to_string(),
                    index: offset,
                    len,
                }
                .into());
            }
            let start = if delete < 0 {
                offset.saturating_sub(delete.unsigned_abs())
            } else {
                offset
            };
            let end = if delete < 0 {
                offset
            } else {
                offset.saturating_add(delete.unsigned_abs()).min(len)
            };
            Ok(TextEdit {
                offset: start,
                delete: end - start,
                insert: insert.to_string(),
            })
        })?;
        emitted.extend(self.commit_edits(text, &[edit])?);
        Ok(emitted)
    }

    /// Patches the text at `path` with a unified diff.
    ///
    /// Context and deleted lines must match the current text, otherwise the
    /// patch is rejected with an invalid-operation error and nothing is
    /// recorded. Each run of changed lines becomes one splice, so characters
    /// on untouched lines keep their identity and their marks.
    pub fn put_diff(&mut self, path: &str, diff: &str) -> Result<Vec<Vec<u8>>> {
        let parsed = Self::parse_path(path)?;
        let mut emitted = Vec::new();
        let (text, edits) = self.text_for_edit(&parsed, &mut emitted, |content| {
            diff::plan(content, diff).map_err(|reason| {
                crate::Error::from(DocumentError::invalid("put_diff", &parsed, reason))
            })
        })?;
        emitted.extend(self.commit_edits(text, &edits)?);
        Ok(emitted)
    }

    /// Marks characters `start..end` of the text at `path` with `name = value`.
    ///
    /// `expand` decides whether text later typed right at either edge joins
    /// the mark. Where marks of the same name overlap, the most recent one
    /// wins.
    pub fn create_mark(
        &mut self,
        path: &str,
        name: &str,
        value: ScalarValue,
        start: usize,
        end: usize,
        expand: ExpandMark,
    ) -> Result<Vec<Vec<u8>>> {
        self.mark("create_mark", path, name, value, start, end, expand)
    }

    /// Removes mark `name` from characters `start..end`, splitting any mark
    /// that extends past the range.
    pub fn clear_mark(
        &mut self,
        path: &str,
        name: &str,
        start: usize,
        end: usize,
        expand: ExpandMark,
    ) -> Result<Vec<Vec<u8>>> {
        self.mark("clear_mark", path, name, ScalarValue::Null, start, end, expand)
    }

    #[allow(clippy::too_many_arguments)]
    fn mark(
        &mut self,
        operation: &str,
        path: &str,
        name: &str,
        value: ScalarValue,
        start: usize,
        end: usize,
        expand: ExpandMark,
    ) -> Result<Vec<Vec<u8>>> {
        let parsed = Self::parse_path(path)?;
        let mut emitted = Vec::new();
        let (text, ()) = self.text_for_edit(&parsed, &mut emitted, |content| {
            if name.is_empty() {
                return Err(DocumentError::invalid(operation, &parsed, "marks need a name").into());
            }
            let len = content.chars().count();
            if end > len {
                return Err(DocumentError::IndexOutOfRange {
                    path: parsed.to_string(),
                    index: end,
                    len,
                }
                .into());
            }
            if start >= end {
                return Err(DocumentError::invalid(
                    operation,
                    &parsed,
                    format!("empty range {start}..{end}"),
                )
                .into());
            }
            Ok(())
        })?;

        let seq = self
            .object(text)?
            .as_seq()
            .ok_or_else(|| DocumentError::type_mismatch(&parsed, "text", "map"))?;
        let ids: Vec<_> = seq.visible().map(|e| e.id).collect();
        let out_of_range = || DocumentError::IndexOutOfRange {
            path: parsed.to_string(),
            index: end,
            len: ids.len(),
        };
        let start_anchor = match (expand.before(), start) {
            (true, 0) => Anchor::Head,
            (true, n) => Anchor::After(*ids.get(n - 1).ok_or_else(out_of_range)?),
            (false, n) => Anchor::Before(*ids.get(n).ok_or_else(out_of_range)?),
        };
        let end_anchor = match expand.after() {
            true if end == ids.len() => Anchor::Tail,
            true => Anchor::Before(*ids.get(end).ok_or_else(out_of_range)?),
            false => Anchor::After(*ids.get(end - 1).ok_or_else(out_of_range)?),
        };

        let mut tx = self.begin();
        tx.push(Op {
            obj: text,
            key: Key::Map(name.to_string()),
            action: OpAction::Mark(MarkRange {
                start: start_anchor,
                end: end_anchor,
                value,
            }),
            pred: vec![],
        });
        emitted.push(self.commit(tx)?);
        Ok(emitted)
    }

    /// Marks on the text at `path`, as runs of characters sharing a value,
    /// ordered by start offset and then name. A plain string has none.
    pub fn get_marks(&self, path: &str) -> Result<Vec<MarkSpan>> {
        match self.get(path)? {
            Value::Str(_) => Ok(Vec::new()),
            Value::Text(obj) => Ok(self
                .object(obj)?
                .as_seq()
                .map(|seq| seq.mark_spans())
                .unwrap_or_default()),
            other => Err(DocumentError::type_mismatch(path, "str or text", other.type_name()).into()),
        }
    }
}

/// Inserts each character of `content` into a text object, chained after
/// `after`.
fn push_chars(tx: &mut ChangeBuilder, text: ObjId, after: ElemRef, content: &str) {
    let mut after = after;
    for ch in content.chars() {
        let id = tx.push(Op {
            obj: text,
            key: Key::Seq(after),
            action: OpAction::Insert(ScalarValue::Str(ch.to_string()).into()),
            pred: vec![],
        });
        after = ElemRef::Elem(id);
    }
}

//!
//! Defines the unit of replication (`Change`) and the types it carries.
//!
//! A `Change` bundles the ops one actor authored at one logical instant,
//! together with the hashes of the changes its author had already seen
//! (`deps`). Its [`ChangeHash`] is a SHA-256 digest over every other field,
//! so a change is self-identifying and any tampering is detected on decode.
//! Changes link to their dependencies to form a hash DAG: the causal history
//! of a document.
//!
//! # Wire format
//!
//! `RCHG` magic, one format-version byte, then the `postcard` encoding of the
//! change (hash included). The format is self-describing in the sense that a
//! decoder needs nothing but these bytes to verify and apply the change.

pub mod actor;
pub mod builder;
pub mod errors;
pub mod hash;
pub mod op;


pub use actor::ActorId;
pub use builder::ChangeBuilder;
pub use errors::ChangeError;
pub use hash::ChangeHash;
pub use op::{
    Anchor, ElemRef, ExpandMark, Key, MarkRange, NewValue, ObjId, ObjType, Op, OpAction, OpId,
    ScalarValue,
};

use serde::{Deserialize, Serialize};

use crate::constants::{CHANGE_MAGIC, FORMAT_VERSION, MAX_OP_COUNTER};

/// The fields covered by the hash, in canonical order.
#[derive(Serialize)]
struct ChangeBody<'a> {
    actor: &'a ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: &'a Option<String>,
    deps: &'a [ChangeHash],
    ops: &'a [Op],
}

/// An immutable, hash-identified bundle of ops authored by one actor.
///
/// Use [`ChangeBuilder`] to create one; decoded changes come from
/// [`Change::decode`], which verifies the hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    actor: ActorId,
    /// Per-actor sequence number, starting at 1.
    seq: u64,
    /// Counter of the first op; op `i` has counter `start_op + i`.
    start_op: u64,
    /// Author's wall clock in milliseconds. Metadata only.
    time: i64,
    message: Option<String>,
    /// Sorted, deduplicated hashes of the changes this one causally follows.
    deps: Vec<ChangeHash>,
    ops: Vec<Op>,
    hash: ChangeHash,
}

impl Change {
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn start_op(&self) -> u64 {
        self.start_op
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn deps(&self) -> &[ChangeHash] {
        &self.deps
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn hash(&self) -> ChangeHash {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Id of the op at `index` within this change.
    pub fn op_id(&self, index: usize) -> OpId {
        OpId::new(self.start_op + index as u64, self.actor)
    }

    /// Ops paired with their ids, in recorded order.
    pub fn ops_with_ids(&self) -> impl Iterator<Item = (OpId, &Op)> {
        self.ops
            .iter()
            .enumerate()
            .map(|(i, op)| (self.op_id(i), op))
    }

    /// Largest op counter used by this change (or `start_op - 1` when empty).
    pub fn max_op(&self) -> u64 {
        self.start_op
            .saturating_sub(1)
            .saturating_add(self.ops.len() as u64)
    }

    /// Recomputes the digest of the hashed fields.
    fn compute_hash(&self) -> Result<ChangeHash, ChangeError> {
        let body = ChangeBody {
            actor: &self.actor,
            seq: self.seq,
            start_op: self.start_op,
            time: self.time,
            message: &self.message,
            deps: &self.deps,
            ops: &self.ops,
        };
        let bytes = postcard::to_stdvec(&body).map_err(|e| ChangeError::SerializationFailed {
            reason: e.to_string(),
        })?;
        Ok(ChangeHash::digest(&bytes))
    }

    /// Encodes the change in the wire format accepted by [`Change::decode`].
    pub fn encode(&self) -> Result<Vec<u8>, ChangeError> {
        let mut out = Vec::with_capacity(64 + self.ops.len() * 24);
        out.extend_from_slice(CHANGE_MAGIC);
        out.push(FORMAT_VERSION);
        postcard::to_io(self, &mut out).map_err(|e| ChangeError::SerializationFailed {
            reason: e.to_string(),
        })?;
        Ok(out)
    }

    /// Decodes and verifies a change.
    ///
    /// Fails with [`ChangeError::MalformedChange`] on a bad header, trailing
    /// bytes, an undecodable body, a structurally invalid change, or a hash
    /// that does not match the content.
    pub fn decode(bytes: &[u8]) -> Result<Self, ChangeError> {
        let header_len = CHANGE_MAGIC.len() + 1;
        if bytes.len() < header_len {
            return Err(ChangeError::malformed(format!(
                "{} bytes is shorter than the change header",
                bytes.len()
            )));
        }
        if &bytes[..CHANGE_MAGIC.len()] != CHANGE_MAGIC {
            return Err(ChangeError::malformed("missing change magic"));
        }
        let version = bytes[CHANGE_MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(ChangeError::malformed(format!(
                "unsupported change format version {version}; only version {FORMAT_VERSION} is supported"
            )));
        }

        let (change, rest): (Change, &[u8]) = postcard::take_from_bytes(&bytes[header_len..])
            .map_err(|e| ChangeError::malformed(format!("undecodable body: {e}")))?;
        if !rest.is_empty() {
            return Err(ChangeError::malformed(format!(
                "{} trailing bytes after change body",
                rest.len()
            )));
        }
        change.verify()?;
        Ok(change)
    }

    /// Checks structural invariants and the content hash.
    pub fn verify(&self) -> Result<(), ChangeError> {
        if self.seq == 0 {
            return Err(ChangeError::malformed("seq must start at 1"));
        }
        if self.start_op == 0 {
            return Err(ChangeError::malformed("op counters must start at 1"));
        }
        if self.max_op() > MAX_OP_COUNTER {
            return Err(ChangeError::malformed(format!(
                "op counters up to {} exceed the limit of {MAX_OP_COUNTER}",
                self.max_op()
            )));
        }
        if !self.deps.windows(2).all(|w| w[0] < w[1]) {
            return Err(ChangeError::malformed("deps are not sorted and unique"));
        }
        if self.deps.contains(&self.hash) {
            return Err(ChangeError::malformed("change depends on itself"));
        }
        for (id, op) in self.ops_with_ids() {
            if op.pred.iter().any(|p| *p >= id) {
                return Err(ChangeError::malformed(format!(
                    "op {id} supersedes an op that is not older than itself"
                )));
            }
            if let ObjId::Op(obj) = op.obj
                && obj >= id
            {
                return Err(ChangeError::malformed(format!(
                    "op {id} targets object {obj} that does not precede it"
                )));
            }
            if let OpAction::Mark(range) = &op.action
                && [range.start, range.end]
                    .iter()
                    .filter_map(Anchor::elem)
                    .any(|elem| elem >= id)
            {
                return Err(ChangeError::malformed(format!(
                    "mark {id} is anchored to an element that does not precede it"
                )));
            }
        }
        let expected = self.compute_hash()?;
        if expected != self.hash {
            return Err(ChangeError::malformed(format!(
                "hash mismatch: recorded {}, computed {}",
                self.hash, expected
            )));
        }
        Ok(())
    }
}

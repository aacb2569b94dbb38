//! Builder for creating Change instances.

use super::{ActorId, Change, ChangeError, ChangeHash, Op, OpId};

/// A builder for creating [`Change`] instances.
///
/// The builder accumulates ops and hands out their ids as they are pushed,
/// so later ops in the same change can target objects created by earlier
/// ones. `build()` canonicalises the change (sorted deps and preds) and
/// computes its hash.
///
/// # Example
///
/// ```
/// use replidoc::change::{ActorId, ChangeBuilder, Key, ObjId, Op, OpAction, ScalarValue};
///
/// let actor = ActorId::random();
/// let mut builder = ChangeBuilder::new(actor, 1, 1).time(0);
/// let id = builder.push(Op {
///     obj: ObjId::Root,
///     key: Key::Map("name".into()),
///     action: OpAction::Put(ScalarValue::Str("Alice".into()).into()),
///     pred: vec![],
/// });
/// let change = builder.build().unwrap();
/// assert_eq!(change.op_id(0), id);
/// ```
#[derive(Clone, Debug)]
pub struct ChangeBuilder {
    actor: ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: Option<String>,
    deps: Vec<ChangeHash>,
    ops: Vec<Op>,
}

impl ChangeBuilder {
    /// Starts a change for `actor` with sequence number `seq` whose first op
    /// will get counter `start_op`.
    pub fn new(actor: ActorId, seq: u64, start_op: u64) -> Self {
        Self {
            actor,
            seq,
            start_op,
            time: 0,
            message: None,
            deps: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn time(mut self, millis: i64) -> Self {
        self.time = millis;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn deps(mut self, deps: impl IntoIterator<Item = ChangeHash>) -> Self {
        self.deps.extend(deps);
        self
    }

    pub fn add_dep_mut(&mut self, dep: ChangeHash) -> &mut Self {
        self.deps.push(dep);
        self
    }

    /// Id the next pushed op will receive.
    pub fn next_op_id(&self) -> OpId {
        OpId::new(
            self.start_op.saturating_add(self.ops.len() as u64),
            self.actor,
        )
    }

    /// Appends an op and returns its id.
    pub fn push(&mut self, op: Op) -> OpId {
        let id = self.next_op_id();
        self.ops.push(op);
        id
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Finalizes the change and computes its hash.
    ///
    /// Fails with [`ChangeError::CounterOverflow`] if the op ids would not fit
    /// in a `u64`.
    pub fn build(self) -> Result<Change, ChangeError> {
        if self.start_op.checked_add(self.ops.len() as u64).is_none() {
            return Err(ChangeError::CounterOverflow {
                start_op: self.start_op,
                ops: self.ops.len(),
            });
        }
        let mut deps = self.deps;
        deps.sort();
        deps.dedup();

        let ops = self
            .ops
            .into_iter()
            .map(|mut op| {
                op.pred.sort();
                op.pred.dedup();
                op
            })
            .collect();

        let mut change = Change {
            actor: self.actor,
            seq: self.seq,
            start_op: self.start_op,
            time: self.time,
            message: self.message,
            deps,
            ops,
            hash: ChangeHash::from_bytes([0; super::hash::HASH_LEN]),
        };
        change.hash = change.compute_hash()?;
        Ok(change)
    }
}

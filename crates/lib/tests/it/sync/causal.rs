//! Causal delivery, idempotence and integrity checks on apply

use replidoc::{
    ActorId, Change, ChangeHash, Document, Error,
    change::{ChangeBuilder, Key, ObjId, Op, OpAction, ScalarValue},
    constants::MAX_OP_COUNTER,
};

use crate::helpers::*;

/// A hand-built change from `author` writing `key = value` at the root.
fn raw_put(
    author: ActorId,
    seq: u64,
    start_op: u64,
    deps: &[ChangeHash],
    key: &str,
    value: i64,
) -> Change {
    let mut builder = ChangeBuilder::new(author, seq, start_op).deps(deps.iter().copied());
    builder.push(Op {
        obj: ObjId::Root,
        key: Key::Map(key.into()),
        action: OpAction::Put(ScalarValue::Int(value).into()),
        pred: vec![],
    });
    builder.build().unwrap()
}

fn missing_of(err: &Error) -> Vec<replidoc::ChangeHash> {
    match err {
        Error::Log(log_err) => log_err.missing().to_vec(),
        other => panic!("expected a log error, got {other}"),
    }
}

#[test]
fn test_change_waits_for_its_dependencies() {
    let mut a = doc(1);
    let first = a.put_int("x", 1).unwrap();
    let first_hash = a.heads()[0];
    let second = a.put_int("x", 2).unwrap();

    let mut b = doc(2);
    let err = b.apply(&second).unwrap_err();
    assert!(err.is_missing_dependency());
    assert_eq!(missing_of(&err), vec![first_hash]);
    assert_eq!(b.num_changes(), 0);
    assert!(b.get("x").unwrap_err().is_not_found());

    b.apply(&first).unwrap();
    b.apply(&second).unwrap();
    assert_eq!(b.get_int("x").unwrap(), 2);
}

#[test]
fn test_apply_is_idempotent() {
    let mut a = doc(1);
    let change = a.put_int("x", 1).unwrap();

    let mut b = doc(2);
    b.apply(&change).unwrap();
    b.apply(&change).unwrap();
    assert_eq!(b.num_changes(), 1);
    assert_eq!(b.apply_changes(a.changes().unwrap()).unwrap(), 0);
    assert_eq!(b.merge(&a).unwrap(), 0);
    assert_eq!(b.to_json(), a.to_json());

    // Own changes echoed back are also no-ops.
    a.apply(&change).unwrap();
    assert_eq!(a.num_changes(), 1);
}

#[test]
fn test_batch_in_reverse_order_applies_completely() {
    let mut a = doc(1);
    for i in 0..10 {
        a.put_int(&format!("k{i}"), i).unwrap();
    }
    let mut changes = a.changes().unwrap();
    changes.reverse();

    let mut b = doc(2);
    assert_eq!(b.apply_changes(changes).unwrap(), 10);
    assert_converged(&[&a, &b]);
}

#[test]
fn test_batch_with_a_gap_applies_what_it_can() {
    let mut a = doc(1);
    a.put_int("one", 1).unwrap();
    a.put_int("two", 2).unwrap();
    a.put_int("three", 3).unwrap();
    let changes = a.changes().unwrap();
    let absent = a.change_hashes()[1];

    let mut b = doc(2);
    let err = b
        .apply_changes([&changes[0], &changes[2]])
        .unwrap_err();
    assert!(err.is_missing_dependency());
    assert_eq!(missing_of(&err), vec![absent]);
    assert_eq!(b.num_changes(), 1);
    assert_eq!(b.get_int("one").unwrap(), 1);

    assert_eq!(b.apply_changes([&changes[1], &changes[2]]).unwrap(), 2);
    assert_converged(&[&a, &b]);
}

#[test]
fn test_malformed_blob_rejects_whole_batch() {
    let mut a = doc(1);
    let good = a.put_int("x", 1).unwrap();

    let mut b = doc(2);
    let err = b
        .apply_changes(vec![good, b"garbage".to_vec()])
        .unwrap_err();
    assert!(err.is_malformed_change());
    assert_eq!(b.num_changes(), 0);
}

#[test]
fn test_equivocating_actor_is_rejected() {
    let mut first = doc(5);
    let mut second = doc(5);
    let x = first.put_int("x", 1).unwrap();
    let y = second.put_int("y", 1).unwrap();

    let mut observer = doc(1);
    observer.apply(&x).unwrap();
    let err = observer.apply(&y).unwrap_err();
    assert!(err.is_integrity_error());
    assert!(observer.get("y").unwrap_err().is_not_found());
}

#[test]
fn test_changes_since_sends_only_what_the_peer_lacks() {
    let mut a = doc(1);
    a.put_int("x", 1).unwrap();
    let mut b = replica_of(&a, 2);

    assert!(a.changes_since(&a.heads()).unwrap().is_empty());
    assert!(a.changes_since(&b.heads()).unwrap().is_empty());

    a.put_int("y", 2).unwrap();
    a.put_int("z", 3).unwrap();
    let delta = a.changes_since(&b.heads()).unwrap();
    assert_eq!(delta.len(), 2);

    b.apply_changes(delta).unwrap();
    assert_converged(&[&a, &b]);
    assert_eq!(a.changes_since(&[]).unwrap().len(), 3);
}

#[test]
fn test_heads_track_concurrent_branches() {
    let mut a = doc(1);
    a.put_int("base", 0).unwrap();
    let mut b = replica_of(&a, 2);
    a.put_int("a", 1).unwrap();
    b.put_int("b", 1).unwrap();
    sync_pair(&mut a, &mut b);
    assert_eq!(a.heads().len(), 2);

    let merge = a.put_int("joined", 1).unwrap();
    assert_eq!(a.heads().len(), 1);
    let change = replidoc::Change::decode(&merge).unwrap();
    assert_eq!(change.deps().len(), 2);

    b.apply(&merge).unwrap();
    assert_eq!(b.heads(), a.heads());
}

#[test]
fn test_merge_whole_documents() {
    let mut a = Document::new();
    let mut b = Document::new();
    a.put_text("from", "a").unwrap();
    b.put_text("to", "b").unwrap();

    assert_eq!(a.merge(&b).unwrap(), 1);
    assert_eq!(b.merge(&a).unwrap(), 1);
    assert_converged(&[&a, &b]);
}

#[test]
fn test_actor_reusing_op_ids_cannot_split_replicas() {
    let author = actor(7);
    let first = raw_put(author, 1, 1, &[], "k", 1);
    let reused = raw_put(author, 2, 1, &[], "k", 2);
    let first_bytes = first.encode().unwrap();
    let reused_bytes = reused.encode().unwrap();

    let mut in_order = doc(1);
    in_order.apply(&first_bytes).unwrap();
    let err = in_order.apply(&reused_bytes).unwrap_err();
    assert!(err.is_integrity_error());

    let mut reversed = doc(2);
    let err = reversed.apply(&reused_bytes).unwrap_err();
    assert!(err.is_integrity_error());
    reversed.apply(&first_bytes).unwrap();

    assert_converged(&[&in_order, &reversed]);
    assert_eq!(in_order.get_int("k").unwrap(), 1);

    // The same actor's well-formed follow-up is still accepted.
    let next = raw_put(author, 2, 2, &[first.hash()], "k", 3);
    in_order.apply(&next.encode().unwrap()).unwrap();
    assert_eq!(in_order.get_int("k").unwrap(), 3);
}

#[test]
fn test_change_skipping_a_seq_is_rejected() {
    let author = actor(7);
    let skipped = raw_put(author, 3, 1, &[], "k", 1);

    let mut d = doc(1);
    let err = d.apply(&skipped.encode().unwrap()).unwrap_err();
    assert!(err.is_integrity_error());
    assert_eq!(d.num_changes(), 0);
}

#[test]
fn test_op_counters_near_the_limit_keep_local_edits_working() {
    let remote = actor(7);

    let mut d = doc(1);
    let too_high = raw_put(remote, 1, u64::MAX - 1, &[], "k", 1);
    let err = d.apply(&too_high.encode().unwrap()).unwrap_err();
    assert!(err.is_malformed_change());

    let mut overflowing = ChangeBuilder::new(remote, 1, u64::MAX);
    for _ in 0..2 {
        overflowing.push(Op {
            obj: ObjId::Root,
            key: Key::Map("k".into()),
            action: OpAction::Put(ScalarValue::Null.into()),
            pred: vec![],
        });
    }
    assert!(overflowing.build().unwrap_err().is_counter_overflow());

    let at_limit = raw_put(remote, 1, MAX_OP_COUNTER, &[], "k", 1);
    d.apply(&at_limit.encode().unwrap()).unwrap();

    let local = Change::decode(&d.put_int("k", 5).unwrap()).unwrap();
    assert_eq!(local.start_op(), MAX_OP_COUNTER + 1);
    assert_eq!(d.get_int("k").unwrap(), 5);
    d.put_int("other", 6).unwrap();
    assert_eq!(d.get_int("other").unwrap(), 6);
}

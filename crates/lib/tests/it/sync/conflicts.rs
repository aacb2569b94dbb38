//! Merge rules for concurrent edits

use replidoc::{
    Document, Value,
    change::{ExpandMark, ScalarValue},
};
use serde_json::json;

use crate::helpers::*;

/// Two replicas sharing one base history; the second has the larger actor.
fn pair(base: impl FnOnce(&mut Document)) -> (Document, Document) {
    let mut a = doc(1);
    base(&mut a);
    let b = replica_of(&a, 2);
    (a, b)
}

// ===== REGISTERS =====

#[test]
fn test_concurrent_puts_pick_the_same_winner_everywhere() {
    let (mut a, mut b) = pair(|d| {
        d.put_text("color", "white").unwrap();
    });
    a.put_text("color", "red").unwrap();
    b.put_text("color", "blue").unwrap();
    sync_pair(&mut a, &mut b);

    // Equal op counters; the larger actor wins the tie.
    assert_eq!(a.get_text("color").unwrap(), "blue");
    assert_converged(&[&a, &b]);
}

#[test]
fn test_later_counter_beats_larger_actor() {
    let (mut a, mut b) = pair(|d| {
        d.put_int("n", 0).unwrap();
    });
    b.put_int("n", 2).unwrap();
    a.put_int("other", 0).unwrap();
    a.put_int("n", 1).unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(b.get_int("n").unwrap(), 1);
    assert_converged(&[&a, &b]);
}

#[test]
fn test_sequential_writes_are_not_conflicts() {
    let (mut a, mut b) = pair(|d| {
        d.put_int("n", 0).unwrap();
    });
    a.put_int("n", 1).unwrap();
    send(&a, &mut b);
    b.put_int("n", 2).unwrap();
    send(&b, &mut a);

    assert_eq!(a.get_int("n").unwrap(), 2);
    assert_eq!(a.conflicts("n").unwrap(), vec![Value::Int(2)]);
}

#[test]
fn test_update_survives_concurrent_delete() {
    let (mut a, mut b) = pair(|d| {
        d.put_text("k", "v0").unwrap();
    });
    a.delete("k").unwrap();
    b.put_text("k", "v1").unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(a.get_text("k").unwrap(), "v1");
    assert_converged(&[&a, &b]);
}

#[test]
fn test_concurrent_deletes_agree() {
    let (mut a, mut b) = pair(|d| {
        d.put_text("k", "v0").unwrap();
    });
    a.delete("k").unwrap();
    b.delete("k").unwrap();
    sync_pair(&mut a, &mut b);

    assert!(a.get("k").unwrap_err().is_not_found());
    assert_converged(&[&a, &b]);
}

#[test]
fn test_concurrently_vivified_maps_resolve_to_one() {
    let (mut a, mut b) = pair(|_| {});
    a.put_text("user.name", "Ann").unwrap();
    b.put_int("user.age", 30).unwrap();
    sync_pair(&mut a, &mut b);

    // Each replica created its own `user` map; one of them wins the key.
    assert_eq!(a.to_json(), json!({"user": {"age": 30}}));
    assert_eq!(a.conflicts("user").unwrap().len(), 2);
    assert_converged(&[&a, &b]);
}

// ===== COUNTERS =====

#[test]
fn test_concurrent_increments_add_up() {
    let (mut a, mut b) = pair(|d| {
        d.put_counter("views", 10).unwrap();
    });
    a.inc_counter("views", 5).unwrap();
    a.inc_counter("views", 1).unwrap();
    b.inc_counter("views", -3).unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(a.get_counter("views").unwrap(), 13);
    assert_eq!(b.get_counter("views").unwrap(), 13);
}

#[test]
fn test_increment_arrival_order_does_not_matter() {
    let (mut a, b) = pair(|d| {
        d.put_counter("c", 0).unwrap();
    });
    let mut writers = vec![b, a.fork_with_actor(actor(3)), a.fork_with_actor(actor(4))];
    let mut incs = Vec::new();
    for (i, w) in writers.iter_mut().enumerate() {
        incs.push(w.inc_counter("c", (i as i64 + 1) * 10).unwrap());
    }
    incs.reverse();
    a.apply_changes(&incs).unwrap();
    assert_eq!(a.get_counter("c").unwrap(), 60);
}

// ===== SEQUENCES =====

#[test]
fn test_concurrent_appends_keep_both_elements() {
    let (mut a, mut b) = pair(|d| {
        d.create_list("l").unwrap();
    });
    a.append_text("l", "a").unwrap();
    b.append_text("l", "b").unwrap();
    sync_pair(&mut a, &mut b);

    // The element with the larger id sits closer to the shared left neighbour.
    assert_eq!(a.to_json(), json!({"l": ["b", "a"]}));
    assert_converged(&[&a, &b]);
}

#[test]
fn test_edit_survives_concurrent_element_delete() {
    let (mut a, mut b) = pair(|d| {
        d.create_list("l").unwrap();
        d.append_int("l", 1).unwrap();
        d.append_int("l", 2).unwrap();
    });
    a.delete("l[0]").unwrap();
    b.put_int("l[0]", 10).unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(a.to_json(), json!({"l": [10, 2]}));
    assert_converged(&[&a, &b]);
}

#[test]
fn test_concurrent_text_inserts_interleave_deterministically() {
    let (mut a, mut b) = pair(|d| {
        d.create_text("t").unwrap();
        d.splice_text("t", 0, 0, "hello").unwrap();
    });
    a.splice_text("t", 5, 0, " world").unwrap();
    b.splice_text("t", 5, 0, "!").unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(a.get_text("t").unwrap(), "hello! world");
    assert_converged(&[&a, &b]);
}

#[test]
fn test_concurrent_text_deletes_of_the_same_range() {
    let (mut a, mut b) = pair(|d| {
        d.create_text("t").unwrap();
        d.splice_text("t", 0, 0, "abcdef").unwrap();
    });
    a.splice_text("t", 1, 3, "").unwrap();
    b.splice_text("t", 2, 3, "X").unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(a.get_text("t").unwrap(), "aXf");
    assert_converged(&[&a, &b]);
}

// ===== MARKS =====

fn marks(d: &Document) -> Vec<(String, ScalarValue, usize, usize)> {
    d.get_marks("t")
        .unwrap()
        .into_iter()
        .map(|span| (span.name, span.value, span.start, span.end))
        .collect()
}

#[test]
fn test_overlapping_marks_resolve_by_op_id() {
    let (mut a, mut b) = pair(|d| {
        d.create_text("t").unwrap();
        d.splice_text("t", 0, 0, "hello world").unwrap();
    });
    let red = ScalarValue::Str("red".into());
    let blue = ScalarValue::Str("blue".into());
    a.create_mark("t", "color", red.clone(), 0, 5, ExpandMark::None)
        .unwrap();
    b.create_mark("t", "color", blue.clone(), 3, 8, ExpandMark::None)
        .unwrap();
    sync_pair(&mut a, &mut b);

    // Same op counter; the larger actor's mark wins the overlap.
    let expected = vec![
        ("color".to_string(), red, 0, 3),
        ("color".to_string(), blue, 3, 8),
    ];
    assert_eq!(marks(&a), expected);
    assert_eq!(marks(&b), expected);
    assert_converged(&[&a, &b]);
}

#[test]
fn test_mark_follows_concurrent_inserts() {
    let (mut a, mut b) = pair(|d| {
        d.create_text("t").unwrap();
        d.splice_text("t", 0, 0, "hello world").unwrap();
    });
    a.create_mark("t", "bold", ScalarValue::Bool(true), 0, 5, ExpandMark::None)
        .unwrap();
    b.splice_text("t", 2, 0, "X").unwrap();
    b.splice_text("t", 6, 0, "!").unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(a.get_text("t").unwrap(), "heXllo! world");
    let expected = vec![("bold".to_string(), ScalarValue::Bool(true), 0, 6)];
    assert_eq!(marks(&a), expected);
    assert_eq!(marks(&b), expected);
    assert_converged(&[&a, &b]);
}

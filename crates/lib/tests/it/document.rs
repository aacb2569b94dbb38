//! Document API integration tests
//!
//! Covers local editing and reading through paths, the change-per-mutation
//! contract, and JSON rendering.

use replidoc::{Document, Value};
use serde_json::json;

use crate::helpers::*;

// ===== BASIC READ/WRITE =====

#[test]
fn test_put_and_get_every_scalar_kind() {
    let mut d = Document::new();
    d.put_text("s", "hello").unwrap();
    d.put_int("i", -7).unwrap();
    d.put_double("f", 0.25).unwrap();
    d.put_bool("b", true).unwrap();
    d.put_counter("c", 3).unwrap();
    d.put_timestamp("t", 86_400_000).unwrap();
    d.put_bytes("raw", b"\x00\xff").unwrap();
    d.put_null("n").unwrap();

    assert_eq!(d.get_text("s").unwrap(), "hello");
    assert_eq!(d.get_int("i").unwrap(), -7);
    assert_eq!(d.get_double("f").unwrap(), 0.25);
    assert!(d.get_bool("b").unwrap());
    assert_eq!(d.get_counter("c").unwrap(), 3);
    assert_eq!(d.get_timestamp("t").unwrap(), 86_400_000);
    assert_eq!(d.get_bytes("raw").unwrap(), vec![0x00, 0xff]);
    assert!(d.get("n").unwrap().is_null());
    assert_eq!(d.num_changes(), 8);
}

#[test]
fn test_each_mutation_records_exactly_one_change() {
    let mut d = Document::new();
    let mut expected = 0;
    let mut step = |d: &mut Document, result: replidoc::Result<Vec<u8>>| {
        result.unwrap();
        expected += 1;
        assert_eq!(d.num_changes(), expected);
    };

    let r = d.put_text("user.name", "Alice");
    step(&mut d, r);
    let r = d.put_int("user.age", 30);
    step(&mut d, r);
    let r = d.put_counter("visits", 0);
    step(&mut d, r);
    let r = d.inc_counter("visits", 1);
    step(&mut d, r);
    let r = d.create_list("tags");
    step(&mut d, r);
    let r = d.append_text("tags", "admin");
    step(&mut d, r);
    let r = d.append_int("tags", 1);
    step(&mut d, r);
    let r = d.create_text("bio");
    step(&mut d, r);
    let r = d.delete("user.age");
    step(&mut d, r);
}

#[test]
fn test_int_and_counter_are_distinct_kinds() {
    let mut d = Document::new();
    d.put_int("n", 1).unwrap();
    d.put_counter("c", 1).unwrap();

    assert!(d.get_counter("n").unwrap_err().is_type_error());
    assert!(d.get_int("c").unwrap_err().is_type_error());
    assert!(d.get_text("c").unwrap_err().is_type_error());
}

#[test]
fn test_numbers_keep_their_kind() {
    let mut d = Document::new();
    d.put_int("n", 4).unwrap();
    d.put_double("f", 4.0).unwrap();
    assert!(d.get_double("n").unwrap_err().is_type_error());
    assert!(d.get_int("f").unwrap_err().is_type_error());
    assert_eq!(d.to_json(), json!({"f": 4.0, "n": 4}));
}

// ===== NESTED STRUCTURE =====

#[test]
fn test_auto_vivified_maps_are_readable() {
    let mut d = Document::new();
    d.put_int("a.b.c", 1).unwrap();
    d.put_int("a.b.d", 2).unwrap();
    d.put_int("a.e", 3).unwrap();

    assert_eq!(d.map_size("a").unwrap(), 2);
    assert_eq!(d.keys("a.b").unwrap(), vec!["c", "d"]);
    assert_eq!(d.to_json(), json!({"a": {"b": {"c": 1, "d": 2}, "e": 3}}));
}

#[test]
fn test_maps_inside_lists_are_addressable() {
    let mut d = Document::from_json(r#"{"people":[{"name":"Ann"},{"name":"Bo"}]}"#).unwrap();
    assert_eq!(d.get_text("people[1].name").unwrap(), "Bo");

    d.put_int("people[0].age", 40).unwrap();
    assert_eq!(d.get_int("people[0].age").unwrap(), 40);
    assert_eq!(
        d.to_json(),
        json!({"people": [{"age": 40, "name": "Ann"}, {"name": "Bo"}]})
    );
}

#[test]
fn test_recreating_a_container_discards_old_contents() {
    let mut d = Document::new();
    d.create_list("l").unwrap();
    d.append_int("l", 1).unwrap();
    d.create_list("l").unwrap();
    assert_eq!(d.list_len("l").unwrap(), 0);
}

#[test]
fn test_list_elements_can_be_replaced_and_deleted() {
    let mut d = Document::new();
    d.create_list("l").unwrap();
    for i in 0..5 {
        d.append_int("l", i).unwrap();
    }
    d.delete("l[1]").unwrap();
    d.delete("l[1]").unwrap();
    d.put_text("l[0]", "zero").unwrap();

    assert_eq!(d.list_len("l").unwrap(), 3);
    assert_eq!(
        d.values("l").unwrap(),
        vec![Value::Str("zero".into()), Value::Int(3), Value::Int(4)]
    );
    d.append_int("l", 5).unwrap();
    assert_eq!(d.to_json(), json!({"l": ["zero", 3, 4, 5]}));
}

// ===== TEXT =====

#[test]
fn test_text_editing_session() {
    let mut d = Document::new();
    d.create_text("doc").unwrap();
    d.splice_text("doc", 0, 0, "The quick fox").unwrap();
    d.splice_text("doc", 4, 0, "very ").unwrap();
    d.splice_text("doc", 9, 5, "slow").unwrap();
    assert_eq!(d.get_text("doc").unwrap(), "The very slow fox");
    assert_eq!(d.list_len("doc").unwrap(), 17);
    assert_eq!(d.to_json(), json!({"doc": "The very slow fox"}));
}

#[test]
fn test_splice_converts_plain_string_in_two_changes() {
    let mut d = Document::new();
    d.put_text("greeting", "Hello").unwrap();
    let before = d.num_changes();

    let emitted = d.splice_text("greeting", 0, 1, "J").unwrap();
    assert_eq!(emitted.len(), 2);
    assert_eq!(d.num_changes(), before + 2);
    assert_eq!(d.get_text("greeting").unwrap(), "Jello");

    let emitted = d.splice_text("greeting", 5, 0, "!").unwrap();
    assert_eq!(emitted.len(), 1);
    assert_eq!(d.get_text("greeting").unwrap(), "Jello!");
}

#[test]
fn test_splice_rejects_non_text_targets() {
    let mut d = Document::new();
    d.put_int("n", 1).unwrap();
    assert!(d.splice_text("n", 0, 0, "x").unwrap_err().is_type_error());
    assert!(d.splice_text("missing", 0, 0, "x").unwrap_err().is_not_found());
}

#[test]
fn test_splice_past_end_of_plain_string_records_nothing() {
    let mut d = Document::new();
    d.put_text("s", "abc").unwrap();
    assert!(d.splice_text("s", 4, 0, "x").unwrap_err().is_out_of_range());
    assert_eq!(d.num_changes(), 1);
    assert!(matches!(d.get("s").unwrap(), Value::Str(_)));
}

// ===== CONFLICTS =====

#[test]
fn test_conflicts_on_a_single_writer_hold_one_value() {
    let mut d = Document::new();
    d.put_int("x", 1).unwrap();
    d.put_int("x", 2).unwrap();
    assert_eq!(d.conflicts("x").unwrap(), vec![Value::Int(2)]);
}

#[test]
fn test_conflicts_keep_concurrent_values() {
    let mut a = doc(1);
    let mut b = doc(2);
    a.put_text("x", "from a").unwrap();
    b.put_text("x", "from b").unwrap();
    sync_pair(&mut a, &mut b);

    assert_eq!(a.get_text("x").unwrap(), "from b");
    assert_eq!(
        a.conflicts("x").unwrap(),
        vec![Value::Str("from a".into()), Value::Str("from b".into())]
    );

    a.put_text("x", "resolved").unwrap();
    assert_eq!(a.conflicts("x").unwrap().len(), 1);
}

// ===== JSON =====

#[test]
fn test_json_round_trip_through_from_json() {
    let source = json!({
        "name": "replidoc",
        "version": 1,
        "ratio": 0.5,
        "stable": false,
        "tags": ["crdt", "json"],
        "nested": {"empty": {}, "list": [[1, 2], {"k": null}]}
    });
    let d = Document::from_json_value(&source).unwrap();
    assert_eq!(d.num_changes(), 1);
    assert_eq!(d.to_json(), source);
}

#[test]
fn test_from_json_document_accepts_further_edits() {
    let mut d = Document::from_json(r#"{"count": 1}"#).unwrap();
    d.put_int("count", 2).unwrap();
    assert_eq!(d.get_int("count").unwrap(), 2);
    assert_eq!(d.conflicts("count").unwrap().len(), 1);
}

#[test]
fn test_invalid_json_is_a_serialization_error() {
    let err = Document::from_json("{not json").unwrap_err();
    assert_eq!(err.module(), "serialize");
}

// ===== STATE ISOLATION =====

#[test]
fn test_fork_is_independent() {
    let mut a = Document::new();
    a.put_int("x", 1).unwrap();
    let mut b = a.fork();
    assert_ne!(a.actor(), b.actor());

    b.put_int("x", 2).unwrap();
    assert_eq!(a.get_int("x").unwrap(), 1);
    assert_eq!(b.get_int("x").unwrap(), 2);
}

#[test]
fn test_documents_move_across_threads() {
    let mut d = Document::new();
    d.put_int("x", 1).unwrap();
    let handle = std::thread::spawn(move || {
        d.put_int("y", 2).unwrap();
        d
    });
    let d = handle.join().unwrap();
    assert_eq!(d.map_size("").unwrap(), 2);
}

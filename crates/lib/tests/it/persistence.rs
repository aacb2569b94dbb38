//! Save/load integration tests
//!
//! A saved document must reload with the same history and state, and corrupt
//! input must be rejected without producing a document.

use replidoc::{
    Change, Document,
    change::{ExpandMark, ScalarValue},
};
use serde_json::json;

use crate::helpers::*;

fn sample() -> Document {
    let mut d = doc(1);
    d.put_text("title", "Notes").unwrap();
    d.put_counter("views", 1).unwrap();
    d.inc_counter("views", 4).unwrap();
    d.create_list("items").unwrap();
    d.append_text("items", "one").unwrap();
    d.append_text("items", "two").unwrap();
    d.delete("items[0]").unwrap();
    d.create_text("body").unwrap();
    d.splice_text("body", 0, 0, "hello").unwrap();
    d.put_timestamp("created", 1_000).unwrap();
    d
}

#[test]
fn test_round_trip_preserves_history_and_state() {
    let original = sample();
    let loaded = Document::load(&original.save().unwrap()).unwrap();

    assert_eq!(loaded.num_changes(), original.num_changes());
    assert_eq!(loaded.change_hashes(), original.change_hashes());
    assert_eq!(loaded.heads(), original.heads());
    assert_eq!(loaded.to_json(), original.to_json());
    assert_eq!(loaded.get_counter("views").unwrap(), 5);
    assert_eq!(loaded.get_text("body").unwrap(), "hello");
    assert_eq!(loaded.list_len("items").unwrap(), 1);
}

#[test]
fn test_round_trip_preserves_marks() {
    let mut original = sample();
    original
        .create_mark("body", "bold", ScalarValue::Bool(true), 1, 4, ExpandMark::Both)
        .unwrap();
    original.put_diff("title", "@@ -1 +1 @@\n-Notes\n+Notes v2\n").unwrap();

    let loaded = Document::load(&original.save().unwrap()).unwrap();
    assert_eq!(loaded.get_marks("body").unwrap(), original.get_marks("body").unwrap());
    assert_eq!(loaded.get_marks("body").unwrap().len(), 1);
    assert_eq!(loaded.get_text("title").unwrap(), "Notes v2");
}

#[test]
fn test_empty_document_round_trip() {
    let loaded = Document::load(&Document::new().save().unwrap()).unwrap();
    assert_eq!(loaded.num_changes(), 0);
    assert_eq!(loaded.to_json(), json!({}));
}

#[test]
fn test_load_uses_a_fresh_actor() {
    let original = sample();
    let bytes = original.save().unwrap();

    let loaded = Document::load(&bytes).unwrap();
    assert_ne!(loaded.actor(), original.actor());
    assert_eq!(Document::saved_actor(&bytes).unwrap(), original.actor());

    let resumed = Document::load_resume(&bytes).unwrap();
    assert_eq!(resumed.actor(), original.actor());

    let chosen = Document::load_with_actor(&bytes, actor(9)).unwrap();
    assert_eq!(chosen.actor(), actor(9));
}

#[test]
fn test_loaded_document_keeps_editing_and_syncing() {
    let mut original = sample();
    let mut loaded = Document::load(&original.save().unwrap()).unwrap();

    loaded.put_int("after_load", 1).unwrap();
    original.put_int("concurrent", 2).unwrap();
    sync_pair(&mut original, &mut loaded);
    assert_converged(&[&original, &loaded]);
}

#[test]
fn test_resumed_document_continues_its_sequence() {
    let original = sample();
    let mut resumed = Document::load_resume(&original.save().unwrap()).unwrap();
    let bytes = resumed.put_int("next", 1).unwrap();

    let change = Change::decode(&bytes).unwrap();
    assert_eq!(change.seq(), original.num_changes() as u64 + 1);
}

#[test]
fn test_merged_history_round_trip() {
    let mut a = doc(1);
    a.put_int("shared", 0).unwrap();
    let mut b = replica_of(&a, 2);
    a.put_int("shared", 1).unwrap();
    b.put_int("shared", 2).unwrap();
    b.put_text("only_b", "b").unwrap();
    sync_pair(&mut a, &mut b);

    let loaded = Document::load(&a.save().unwrap()).unwrap();
    assert_eq!(loaded.heads().len(), 2);
    assert_eq!(loaded.to_json(), b.to_json());
    assert_eq!(loaded.conflicts("shared").unwrap().len(), 2);
}

#[test]
fn test_corrupt_input_is_a_decode_error() {
    let bytes = sample().save().unwrap();

    let mut trailing = bytes.clone();
    trailing.push(0);
    let cases: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"RDOC".to_vec(),
        b"JUNK\x01".to_vec(),
        b"RDOC\x63".to_vec(),
        bytes[..bytes.len() / 2].to_vec(),
        trailing,
    ];
    for case in cases {
        let err = Document::load(&case).unwrap_err();
        assert!(err.is_decode_error(), "expected decode error, got {err}");
    }
}

#[test]
fn test_tampered_change_inside_save_is_rejected() {
    let mut bytes = sample().save().unwrap();
    let pos = bytes
        .windows(5)
        .position(|w| w == b"Notes")
        .expect("value not found in save");
    bytes[pos] = b'V';

    assert!(Document::load(&bytes).unwrap_err().is_decode_error());
}

/// Builds a save blob by hand from an actor and a list of changes.
fn blob(changes: &[Change]) -> Vec<u8> {
    let mut out = b"RDOC\x01".to_vec();
    out.extend(postcard::to_allocvec(&(actor(1), changes)).unwrap());
    out
}

#[test]
fn test_dangling_dependency_is_rejected() {
    let d = sample();
    let changes: Vec<Change> = d
        .changes()
        .unwrap()
        .iter()
        .map(|b| Change::decode(b).unwrap())
        .collect();

    assert!(Document::load(&blob(&changes)).is_ok());
    let err = Document::load(&blob(&changes[1..])).unwrap_err();
    assert!(err.is_decode_error());
}

#[test]
fn test_out_of_order_changes_in_save_are_replayed_causally() {
    let d = sample();
    let mut changes: Vec<Change> = d
        .changes()
        .unwrap()
        .iter()
        .map(|b| Change::decode(b).unwrap())
        .collect();
    changes.reverse();

    let loaded = Document::load(&blob(&changes)).unwrap();
    assert_eq!(loaded.to_json(), d.to_json());
}

#[test]
fn test_duplicate_change_in_save_is_rejected() {
    let d = sample();
    let first = Change::decode(&d.changes().unwrap()[0]).unwrap();
    let err = Document::load(&blob(&[first.clone(), first])).unwrap_err();
    assert!(err.is_decode_error());
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.rdoc");

    let original = sample();
    original.save_to_file(&path).unwrap();
    let loaded = Document::load_from_file(&path).unwrap();
    assert_eq!(loaded.to_json(), original.to_json());

    let missing = Document::load_from_file(dir.path().join("missing.rdoc")).unwrap_err();
    assert!(missing.is_io_error());
}

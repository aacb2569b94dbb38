//! Document store integration tests

use replidoc::{Document, DocumentStore};

#[test]
fn test_documents_under_different_keys_are_independent() {
    let mut store = DocumentStore::new();
    store.create("a").unwrap().put_int("n", 1).unwrap();
    store.create("b").unwrap().put_int("n", 2).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.keys(), vec!["a", "b"]);
    assert_eq!(store.get("a").unwrap().get_int("n").unwrap(), 1);
    assert_eq!(store.get("b").unwrap().get_int("n").unwrap(), 2);
}

#[test]
fn test_store_load_and_sync_between_keys() {
    let mut source = Document::new();
    source.put_text("title", "Draft").unwrap();
    let saved = source.save().unwrap();

    let mut store = DocumentStore::new();
    store.load("copy", &saved).unwrap();
    assert!(store.load("copy", &saved).unwrap_err().is_conflict());
    assert!(store.load("bad", b"nope").unwrap_err().is_decode_error());
    assert!(!store.contains("bad"));

    let change = store.get_mut("copy").unwrap().put_text("title", "Final").unwrap();
    source.apply(&change).unwrap();
    assert_eq!(source.get_text("title").unwrap(), "Final");
}

#[test]
fn test_unknown_keys_report_not_found() {
    let mut store = DocumentStore::new();
    let err = store.get_mut("missing").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "store");
    assert!(store.remove("missing").unwrap_err().is_not_found());
}

#[test]
fn test_insert_existing_document() {
    let mut store = DocumentStore::new();
    let doc = Document::from_json(r#"{"k": true}"#).unwrap();
    let actor = doc.actor();
    store.insert("k", doc).unwrap();

    assert_eq!(store.get("k").unwrap().actor(), actor);
    assert!(store.insert("k", Document::new()).unwrap_err().is_conflict());

    let removed = store.remove("k").unwrap();
    assert!(removed.get_bool("k").unwrap());
    assert!(store.is_empty());
}

//! Convergence across exchange topologies
//!
//! Four replicas start from a shared base, edit concurrently, and then
//! exchange changes as a star, a ring, a full mesh, or as single changes
//! delivered out of order. Every topology must end in the same state.

use replidoc::{Document, Error};

use crate::helpers::*;

const REPLICAS: u8 = 4;

fn base() -> Document {
    let mut d = doc(100);
    d.put_counter("stats.edits", 0).unwrap();
    d.create_list("log").unwrap();
    d.create_map("private").unwrap();
    d.create_text("body").unwrap();
    d.splice_text("body", 0, 0, "draft").unwrap();
    d
}

/// Concurrent edits made by replica `i`, touching shared and private state.
fn edit(d: &mut Document, i: u8) {
    d.put_text("owner", &format!("replica-{i}")).unwrap();
    d.put_int(&format!("private.r{i}"), i64::from(i)).unwrap();
    d.inc_counter("stats.edits", 1).unwrap();
    d.append_text("log", &format!("entry from {i}")).unwrap();
    d.splice_text("body", 0, 0, &i.to_string()).unwrap();
    if i % 2 == 0 {
        d.splice_text("body", 1, 1, "").unwrap();
    }
}

fn edited_replicas() -> Vec<Document> {
    let origin = base();
    (1..=REPLICAS)
        .map(|i| {
            let mut replica = replica_of(&origin, i);
            edit(&mut replica, i);
            replica
        })
        .collect()
}

fn transfer(replicas: &mut [Document], from: usize, to: usize) {
    let delta = replicas[from]
        .changes_since(&replicas[to].heads())
        .unwrap();
    replicas[to].apply_changes(delta).unwrap();
}

fn check(replicas: &[Document]) -> serde_json::Value {
    let refs: Vec<&Document> = replicas.iter().collect();
    assert_converged(&refs);
    let state = replicas[0].to_json();
    assert_eq!(state["stats"]["edits"], i64::from(REPLICAS));
    assert_eq!(state["log"].as_array().map(Vec::len), Some(REPLICAS as usize));
    assert_eq!(state["private"].as_object().map(|m| m.len()), Some(REPLICAS as usize));
    state
}

fn star() -> serde_json::Value {
    let mut replicas = edited_replicas();
    for spoke in 1..replicas.len() {
        transfer(&mut replicas, spoke, 0);
    }
    for spoke in 1..replicas.len() {
        transfer(&mut replicas, 0, spoke);
    }
    check(&replicas)
}

fn ring() -> serde_json::Value {
    let mut replicas = edited_replicas();
    let n = replicas.len();
    for _ in 0..n - 1 {
        for i in 0..n {
            transfer(&mut replicas, i, (i + 1) % n);
        }
    }
    check(&replicas)
}

fn full_mesh() -> serde_json::Value {
    let mut replicas = edited_replicas();
    let histories: Vec<Vec<Vec<u8>>> = replicas.iter().map(|r| r.changes().unwrap()).collect();
    for (i, replica) in replicas.iter_mut().enumerate() {
        for (j, history) in histories.iter().enumerate() {
            if i != j {
                replica.apply_changes(history).unwrap();
            }
        }
    }
    check(&replicas)
}

/// Delivers every change individually, newest first, buffering changes whose
/// deps have not arrived and retrying them later.
fn shuffled_delivery() -> serde_json::Value {
    let replicas = edited_replicas();
    let mut all: Vec<Vec<u8>> = replicas
        .iter()
        .flat_map(|r| r.changes().unwrap())
        .collect();
    all.reverse();

    let mut target = doc(50);
    let mut buffer = std::collections::VecDeque::from(all);
    let mut stalled = 0;
    while let Some(bytes) = buffer.pop_front() {
        match target.apply(&bytes) {
            Ok(()) => stalled = 0,
            Err(Error::Log(err)) if err.is_missing_dependency() => {
                buffer.push_back(bytes);
                stalled += 1;
                assert!(stalled <= buffer.len(), "delivery made no progress");
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let mut reference = edited_replicas();
    for i in 1..reference.len() {
        transfer(&mut reference, i, 0);
    }
    assert_converged(&[&reference[0], &target]);
    target.to_json()
}

#[test]
fn test_star_converges() {
    star();
}

#[test]
fn test_ring_converges() {
    ring();
}

#[test]
fn test_full_mesh_converges() {
    full_mesh();
}

#[test]
fn test_shuffled_delivery_converges() {
    shuffled_delivery();
}

#[test]
fn test_all_topologies_reach_the_same_state() {
    let expected = star();
    assert_eq!(ring(), expected);
    assert_eq!(full_mesh(), expected);
    assert_eq!(shuffled_delivery(), expected);
}

#[test]
fn test_converged_replicas_survive_save_and_load() {
    let mut replicas = edited_replicas();
    for i in 1..replicas.len() {
        transfer(&mut replicas, i, 0);
    }
    let loaded = Document::load(&replicas[0].save().unwrap()).unwrap();
    assert_converged(&[&replicas[0], &loaded]);
}

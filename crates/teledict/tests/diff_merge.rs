// SPDX-License-Identifier: Apache-2.0 OR MIT
//
// End-to-end merge and diff scenarios: catching a lagging consumer up
// with a difference tree, soft-failure reporting through an observer,
// and the kind-reconciliation rules of update.

use teledict::{Capture, Dict};

#[test]
fn test_diff_then_update_converges() {
    let mut producer = Dict::new();
    {
        let server = producer
            .child_mut("config")
            .expect("child")
            .child_mut("server")
            .expect("child");
        server.insert("port", 8080u16).expect("insert");
        server.insert("host", String::from("rover-1")).expect("insert");
    }
    producer.insert("uptime", 120u32).expect("insert");

    // consumer saw an earlier snapshot
    let mut consumer = producer.deepcopy().expect("deepcopy");
    *producer.get_mut::<u32>("uptime").expect("uptime") = 180;
    *producer
        .child_mut("config")
        .expect("child")
        .child_mut("server")
        .expect("child")
        .get_mut::<u16>("port")
        .expect("port") = 9090;

    let delta = producer.difference(&consumer);
    // only the changed leaves are present
    assert_eq!(delta.keys().len(), 2);
    assert!(delta.has("config"));
    assert!(delta.has("uptime"));
    assert_eq!(
        delta.child("config").expect("config").len(),
        1
    );

    consumer.update(&delta.serialize()).expect("catch up");
    assert_eq!(consumer, producer);
}

#[test]
fn test_update_with_garbage_is_a_reported_noop() {
    let mut dict = Dict::new();
    dict.insert("kept", 1u8).expect("insert");

    let capture = Capture::new();
    dict.update_with(&[0xc1, 0x00], &capture).expect("soft failure");

    assert_eq!(*dict.get::<u8>("kept").expect("kept"), 1);
    assert_eq!(dict.len(), 1);
    let events = capture.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].contains("parse failure"));
}

#[test]
fn test_update_with_truncated_message_is_a_reported_noop() {
    let mut dict = Dict::new();
    dict.insert("kept", 1u8).expect("insert");
    let mut bytes = dict.serialize();
    bytes.truncate(bytes.len() - 1);

    let capture = Capture::new();
    let mut target = Dict::new();
    target.update_with(&bytes, &capture).expect("soft failure");
    assert!(target.is_empty());
    assert!(!capture.is_empty());
}

#[test]
fn test_extend_reports_duplicates_and_keeps_existing() {
    let mut base = Dict::new();
    base.insert("rate", 50u8).expect("insert");

    let mut incoming = Dict::new();
    incoming.insert("rate", 100u8).expect("insert");
    incoming.insert("timeout", 30u8).expect("insert");

    let capture = Capture::new();
    base.extend_with(&incoming.serialize(), &capture)
        .expect("extend");

    assert_eq!(*base.get::<u8>("rate").expect("rate"), 50);
    assert_eq!(*base.get::<u8>("timeout").expect("timeout"), 30);
    let events = capture.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].contains("rate"));
}

#[test]
fn test_update_replaces_on_kind_conflict() {
    // producer turned a scalar into a subtree
    let mut consumer = Dict::new();
    consumer.insert("pose", 0u8).expect("insert");

    let mut producer = Dict::new();
    producer
        .child_mut("pose")
        .expect("child")
        .insert("x", 1.0f64)
        .expect("insert");

    consumer.update(&producer.serialize()).expect("update");
    assert_eq!(consumer, producer);

    // and back again
    let mut flat = Dict::new();
    flat.insert("pose", 7u8).expect("insert");
    consumer.update(&flat.serialize()).expect("update");
    assert_eq!(consumer, flat);
}

#[test]
fn test_update_preserves_unmentioned_keys() {
    let mut consumer = Dict::new();
    consumer.insert("stable", 1u8).expect("insert");

    let mut partial = Dict::new();
    partial.insert("fresh", 2u8).expect("insert");
    consumer.update(&partial.serialize()).expect("update");

    assert_eq!(*consumer.get::<u8>("stable").expect("stable"), 1);
    assert_eq!(*consumer.get::<u8>("fresh").expect("fresh"), 2);
}

#[test]
fn test_emptied_vector_leaf_propagates_through_diff() {
    let mut producer = Dict::new();
    producer
        .insert("trace", vec![1.0f64, 2.0])
        .expect("insert");
    let mut consumer = producer.deepcopy().expect("deepcopy");

    // producer clears the trace; the delta must carry the empty vector
    producer
        .get_mut::<Vec<f64>>("trace")
        .expect("trace")
        .clear();
    let delta = producer.difference(&consumer);
    assert!(delta.has("trace"));

    consumer.update(&delta.serialize()).expect("catch up");
    assert!(consumer
        .get::<Vec<f64>>("trace")
        .expect("trace")
        .is_empty());
    assert_eq!(consumer, producer);
}

#[test]
fn test_diff_of_identical_trees_serializes_to_empty_map() {
    let mut a = Dict::new();
    a.insert("x", 1u8).expect("insert");
    let b = a.deepcopy().expect("deepcopy");
    let delta = a.difference(&b);
    assert!(delta.is_empty());
    assert_eq!(delta.serialize(), vec![0x80]);
}

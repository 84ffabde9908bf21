//! Scenario: name collision on a freshly-allocated slot (spec §8 scenario 2).
//!
//! Rather than searching for two real names whose hashes collide mod 6144,
//! this crafts the remote side's heartbeat directly: `create_topic` gives us
//! the local topic's real hash, and we derive a same-slot, different-hash
//! remote announcement by arithmetic on it.

mod common;

use common::{Clock, FakePlatform};
use meshcore::{Config, Heartbeat, Node, Payload};

const DYNAMIC_POOL: u64 = 6144;

fn remote_heartbeat(topic_hash: u64, evictions: u64, age: u64) -> Heartbeat {
    Heartbeat {
        uptime_seconds: 0,
        user_word: [0, 0, 0],
        uid: 99,
        topic_hash,
        age,
        publishing: true,
        subscribed: false,
        evictions,
        topic_name: "/remote".to_string(),
    }
}

#[test]
fn smaller_hash_keeps_its_slot_at_zero_evictions() {
    let clock = Clock::new(0);
    let platform = FakePlatform::new(clock, 1, 128, 70);
    let mut node = Node::new(1, "/ns", "a", Config::default(), Box::new(platform), Some(1)).unwrap();

    let topic_id = node.create_topic("x").unwrap();
    let local_hash = node.topic_hash(topic_id).unwrap();
    let local_sid = node.topic_subject_id(topic_id).unwrap();

    // Same slot, larger hash: local (smaller) hash must win the tie.
    let remote_hash = local_hash + DYNAMIC_POOL;
    let hb = remote_heartbeat(remote_hash, 0, 0);
    let heartbeat_subject = node.topic_subject_id(node.heartbeat_topic()).unwrap();
    node.ingest_topic_transfer(heartbeat_subject, 2, 0, Payload::new(hb.encode())).unwrap();

    assert_eq!(node.topic_evictions(topic_id), Some(0));
    assert_eq!(node.topic_subject_id(topic_id), Some(local_sid));
}

#[test]
fn larger_hash_loses_the_slot_and_reallocates() {
    let clock = Clock::new(0);
    let platform = FakePlatform::new(clock.clone(), 2, 128, 70);
    let mut node = Node::new(1, "/ns", "a", Config::default(), Box::new(platform), Some(1)).unwrap();

    let topic_id = node.create_topic("x").unwrap();
    let local_hash = node.topic_hash(topic_id).unwrap();
    assert!(local_hash >= DYNAMIC_POOL, "rapidhash output is astronomically unlikely to land below the pool size");

    clock.advance(1_000);

    // Same slot, smaller hash: remote wins, local must bump its eviction
    // counter and move to a new slot.
    let remote_hash = local_hash - DYNAMIC_POOL;
    let hb = remote_heartbeat(remote_hash, 0, 0);
    let heartbeat_subject = node.topic_subject_id(node.heartbeat_topic()).unwrap();
    node.ingest_topic_transfer(heartbeat_subject, 2, 0, Payload::new(hb.encode())).unwrap();

    assert_eq!(node.topic_evictions(topic_id), Some(1));
    assert_eq!(node.topic_subject_id(topic_id), Some(((local_hash + 1) % DYNAMIC_POOL) as u16));
    assert!(node.topic_last_local_event_ts(topic_id).unwrap() > 0);
}

//! Scenario: future timeout (spec §8 scenario 5).

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{Clock, FakePlatform};
use meshcore::{Config, FutureOutcome, Node, Payload};

#[test]
fn an_unanswered_future_fires_failure_exactly_once_past_its_deadline() {
    let clock = Clock::new(0);
    let platform = FakePlatform::new(clock.clone(), 1, 128, 70);
    let mut node = Node::new(1, "/ns", "a", Config::default(), Box::new(platform), Some(1)).unwrap();

    let topic_id = node.create_topic("rpc").unwrap();

    let fire_count = Rc::new(Cell::new(0));
    let observed_failure = Rc::new(Cell::new(false));
    let fire_count_cb = fire_count.clone();
    let observed_failure_cb = observed_failure.clone();

    node.publish_with_future(
        topic_id,
        2_000,
        1_000,
        Payload::new(vec![1, 2, 3]),
        Box::new(move |outcome| {
            fire_count_cb.set(fire_count_cb.get() + 1);
            observed_failure_cb.set(matches!(outcome, FutureOutcome::Failure));
        }),
    )
    .unwrap();

    clock.advance(999);
    node.update().unwrap();
    assert_eq!(fire_count.get(), 0, "deadline has not yet elapsed");

    clock.advance(2);
    node.update().unwrap();
    assert_eq!(fire_count.get(), 1, "callback fires exactly once past the deadline");
    assert!(observed_failure.get());

    // A further tick must not re-fire the same (already-removed) future.
    clock.advance(10_000);
    node.update().unwrap();
    assert_eq!(fire_count.get(), 1);
}

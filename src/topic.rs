//! The `Topic` record and the pure arithmetic of subject-ID placement
//! (spec §3, §4.D). The allocation *procedure* itself lives on
//! [`crate::node::Node`], since it needs to see every other local topic;
//! this module holds the data and the comparator it is arbitrated by.

use crate::arena::Handle;
use crate::index::{FifoKey, UniqueIndex};
use crate::platform::TopicHandle;

/// Number of subject-IDs in the dynamically-allocated pool.
pub const DYNAMIC_POOL: u64 = 6144;

/// Handle to a [`Topic`] owned by a [`crate::node::Node`]'s topic arena.
pub type TopicId = Handle;

/// Handle to a future owned by a node's future arena.
pub type FutureId = Handle;

/// Compute the subject-ID a topic with `hash`/`evictions` would occupy.
/// Pinned topics bypass the formula entirely: `subject_id == hash`.
pub fn subject_id_for(hash: u64, evictions: u64, pinned: bool) -> u16 {
    if pinned {
        hash as u16
    } else {
        ((hash + evictions) % DYNAMIC_POOL) as u16
    }
}

/// `floor(log2(x))`, with `log2(0)` defined as `0` so a fresh topic
/// (`age == 0`) compares as the lowest possible rank rather than panicking.
pub fn log2_floor(x: u64) -> u32 {
    if x == 0 {
        0
    } else {
        63 - x.leading_zeros()
    }
}

/// Arbitration rule for two topics contesting the same subject-ID, applied
/// only when their hashes differ (spec §4.D).
///
/// 1. A pinned topic beats a non-pinned one regardless of age.
/// 2. Otherwise the topic with the larger `floor(log2(age))` wins — a
///    quantized comparison so that small age noise does not flip the
///    outcome.
/// 3. Ties are broken by the smaller hash.
pub fn left_wins(
    left_pinned: bool,
    left_age: u64,
    left_hash: u64,
    right_pinned: bool,
    right_age: u64,
    right_hash: u64,
) -> bool {
    debug_assert_ne!(left_hash, right_hash, "arbitration only applies to distinct hashes");

    if left_pinned != right_pinned {
        return left_pinned;
    }
    let left_rank = log2_floor(left_age);
    let right_rank = log2_floor(right_age);
    if left_rank != right_rank {
        left_rank > right_rank
    } else {
        left_hash < right_hash
    }
}

/// Publisher-side state for a topic.
#[derive(Debug, Clone, Default)]
pub struct PublisherState {
    pub next_transfer_id: u64,
    pub priority: u8,
    pub publishing: bool,
}

/// Subscriber-side state for a topic.
#[derive(Debug, Clone, Default)]
pub struct SubscriberState {
    pub last_received_transfer_id: Option<u64>,
    /// Application-level subscription handles attached to this topic.
    pub subscriptions: Vec<u64>,
    pub reassembly_timeout_micros: u64,
    pub reassembly_buffer_extent: usize,
    /// Whether the transport-level subscription is currently active.
    pub subscribed: bool,
}

/// One named data stream the local node knows about (spec §3).
#[derive(Debug, Clone)]
pub struct Topic {
    pub name: String,
    pub hash: u64,
    pub pinned: bool,

    /// Lamport counter of local arbitration losses. Only mutated while the
    /// topic is absent from the subject-ID index (invariant 4).
    pub evictions: u64,
    pub subject_id: u16,

    /// Merge-by-max counter; monotone non-decreasing (invariant 5).
    pub age: u64,
    pub aged_at_micros: u64,

    /// Time of last outbound gossip; 0 means "scheduled ASAP".
    pub last_gossip: u64,
    pub gossip_index_key: FifoKey<u64>,

    pub last_event_ts: u64,
    pub last_local_event_ts: u64,

    pub publisher: PublisherState,
    pub subscriber: SubscriberState,

    pub futures_by_transfer_id: UniqueIndex<u64, FutureId>,

    pub transport_handle: TopicHandle,
}

impl Topic {
    /// Set `last_gossip` to the "schedule ASAP" sentinel: 0 normally, or 1
    /// for pinned topics so a routine "we also hold this slot" gossip never
    /// preempts a genuine conflict report already queued at 0.
    pub fn asap_sentinel(&self) -> u64 {
        if self.pinned {
            1
        } else {
            0
        }
    }

    /// Bump `age` by at most one per call, advancing `aged_at_micros` by
    /// whole elapsed seconds, so a long gap between publishes never causes
    /// a multi-step leap (spec §4.E "Age growth on publish").
    pub fn bump_age_on_publish(&mut self, now_micros: u64) {
        let elapsed_seconds = now_micros.saturating_sub(self.aged_at_micros) / 1_000_000;
        if elapsed_seconds > 0 {
            self.age += 1;
            self.aged_at_micros += 1_000_000;
        }
    }

    /// Bump `age` on every received transfer, unconditionally (spec §3).
    pub fn bump_age_on_receive(&mut self) {
        self.age += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_for_pinned_topic_is_the_hash() {
        assert_eq!(subject_id_for(42, 99, true), 42);
    }

    #[test]
    fn subject_id_for_dynamic_topic_wraps_the_pool() {
        assert_eq!(subject_id_for(6140, 10, false), 6);
    }

    #[test]
    fn log2_floor_of_zero_is_zero() {
        assert_eq!(log2_floor(0), 0);
    }

    #[test]
    fn log2_floor_matches_expected_buckets() {
        assert_eq!(log2_floor(1), 0);
        assert_eq!(log2_floor(2), 1);
        assert_eq!(log2_floor(3), 1);
        assert_eq!(log2_floor(100), 6);
        assert_eq!(log2_floor(10), 3);
    }

    #[test]
    fn left_wins_pinned_beats_dynamic_regardless_of_age() {
        assert!(left_wins(true, 0, 999, false, 1_000_000, 1));
        assert!(!left_wins(false, 1_000_000, 1, true, 0, 999));
    }

    #[test]
    fn left_wins_larger_age_bucket_wins() {
        assert!(left_wins(false, 100, 5, false, 10, 5));
        assert!(!left_wins(false, 10, 5, false, 100, 5));
    }

    #[test]
    fn left_wins_ties_on_age_bucket_fall_back_to_smaller_hash() {
        assert!(left_wins(false, 100, 5, false, 100, 9));
        assert!(!left_wins(false, 100, 9, false, 100, 5));
    }

    #[test]
    fn bump_age_on_publish_never_leaps_more_than_one() {
        let mut t = Topic {
            name: "/t".into(),
            hash: 1,
            pinned: false,
            evictions: 0,
            subject_id: 1,
            age: 0,
            aged_at_micros: 0,
            last_gossip: 0,
            gossip_index_key: (0, 0),
            last_event_ts: 0,
            last_local_event_ts: 0,
            publisher: PublisherState::default(),
            subscriber: SubscriberState::default(),
            futures_by_transfer_id: UniqueIndex::new(),
            transport_handle: 0,
        };
        t.bump_age_on_publish(5_000_000); // 5s elapsed
        assert_eq!(t.age, 1);
        assert_eq!(t.aged_at_micros, 1_000_000);

        t.bump_age_on_publish(1_200_000); // < 1s since aged_at
        assert_eq!(t.age, 1);
    }
}

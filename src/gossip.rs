//! Gossip scheduling (spec §4.F).
//!
//! The scheduler itself has no state of its own: the next topic to gossip
//! is always the minimum of [`crate::node::Node`]'s gossip-time index, so
//! this module is just the adaptive-period formula the driver uses to
//! pace heartbeats.

/// The next heartbeat is due no later than `max_period` from now, but no
/// later than `max_full_cycle_period / topic_count` either — so every
/// local topic gossips at least once per `max_full_cycle_period`.
pub fn next_heartbeat_period(max_period_micros: u64, max_full_cycle_period_micros: u64, topic_count: usize) -> u64 {
    let per_cycle = max_full_cycle_period_micros / (topic_count.max(1) as u64);
    max_period_micros.min(per_cycle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_is_capped_by_max_period_with_few_topics() {
        assert_eq!(next_heartbeat_period(1_000_000, 10_000_000, 1), 1_000_000);
    }

    #[test]
    fn period_shrinks_to_cover_the_full_cycle_with_many_topics() {
        assert_eq!(next_heartbeat_period(1_000_000, 10_000_000, 50), 200_000);
    }

    #[test]
    fn zero_topics_does_not_divide_by_zero() {
        assert_eq!(next_heartbeat_period(1_000_000, 10_000_000, 0), 1_000_000);
    }
}

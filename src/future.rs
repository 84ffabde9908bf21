//! Outstanding response expectations bound to a published message
//! (spec §4.H, §3 "Future").

use crate::index::FifoKey;
use crate::platform::Payload;
use crate::topic::TopicId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureState {
    Pending,
    Success,
    Failure,
}

/// What a future's callback is invoked with.
pub enum FutureOutcome {
    Success(Payload),
    Failure,
}

/// A response expectation registered by [`crate::node::Node::publish_with_future`].
pub struct PendingFuture {
    pub topic: TopicId,
    pub transfer_id_masked: u64,
    pub deadline: u64,
    pub state: FutureState,
    pub deadline_key: FifoKey<u64>,
    pub callback: Box<dyn FnOnce(FutureOutcome)>,
}

impl std::fmt::Debug for PendingFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFuture")
            .field("topic", &self.topic)
            .field("transfer_id_masked", &self.transfer_id_masked)
            .field("deadline", &self.deadline)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

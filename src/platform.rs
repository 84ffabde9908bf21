//! The capability set the embedder provides to the core (spec §6).
//!
//! Grounded on `icn-crdt::gossip::GossipTransport`: a single trait object
//! injected at construction rather than an inheritance hierarchy or a
//! dynamic registry, per spec §9's design note. Unlike the teacher's
//! `async_trait` transport, every method here is synchronous — the core
//! never suspends (spec §5).

use crate::error::CoreResult;
use crate::bloom::Bloom64;

/// An owned payload buffer. The core hands these to the embedder for
/// release; double-release is idempotent by construction since `Payload`
/// is consumed by value and cannot be released twice.
#[derive(Debug, Clone, Default)]
pub struct Payload(pub Vec<u8>);

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// Opaque transport-side handle for a topic, created by `topic_new` and
/// freed by `topic_destroy`. The core never interprets its value.
pub type TopicHandle = u64;

/// The eleven hooks the core needs from its embedder.
///
/// A single implementor is constructed once per node and owned by
/// [`crate::node::Node`] for that node's whole lifetime.
pub trait Platform {
    /// Monotonic microseconds, non-negative at start.
    fn now_micros(&self) -> u64;

    /// A 64-bit value from the embedder's PRNG; the core whitens it with
    /// the local UID before use (see [`crate::node_id`]).
    fn prng(&self) -> u64;

    /// Release a payload buffer the core no longer needs.
    fn release_payload(&mut self, payload: Payload);

    /// Bind the local node-ID at the transport layer.
    fn node_id_set(&mut self, node_id: u32) -> CoreResult<()>;

    /// Unbind the local node-ID at the transport layer.
    fn node_id_clear(&mut self);

    /// Borrow the Bloom filter of observed neighbor node-IDs. Its storage
    /// outlives any single core instance.
    fn node_id_bloom(&mut self) -> &mut Bloom64;

    /// Send an RPC request transfer.
    fn request(
        &mut self,
        service_id: u16,
        metadata: &[u8],
        deadline: u64,
        payload: Payload,
    ) -> CoreResult<()>;

    /// Allocate transport-side state for a new topic.
    fn topic_new(&mut self) -> CoreResult<TopicHandle>;

    /// Free transport-side state for a topic.
    fn topic_destroy(&mut self, handle: TopicHandle);

    /// Publish a payload on a topic, due by `deadline`.
    fn topic_publish(&mut self, handle: TopicHandle, deadline: u64, payload: Payload) -> CoreResult<()>;

    /// Start receiving transfers on a topic's subject-ID.
    fn topic_subscribe(&mut self, handle: TopicHandle) -> CoreResult<()>;

    /// Stop receiving transfers on a topic's subject-ID.
    fn topic_unsubscribe(&mut self, handle: TopicHandle);

    /// Notified when `topic_subscribe` fails during reallocation; no
    /// internal retries follow (spec §7).
    fn topic_handle_resubscription_error(&mut self, handle: TopicHandle, error: &crate::error::CoreError);

    /// Upper bound (inclusive) of the node-ID range: 127 for CAN, 65534
    /// elsewhere.
    fn node_id_max(&self) -> u32;

    /// `2^n - 1`: 31 for CAN, `u64::MAX` elsewhere.
    fn transfer_id_mask(&self) -> u64;
}

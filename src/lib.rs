//! Decentralized node-ID and topic-name-to-subject-ID coordination over a
//! CRDT heartbeat gossip.
//!
//! The crate is driven, not self-scheduling: an embedder owns a
//! [`Platform`] implementation and a [`node::Node`], calls [`node::Node::update`]
//! periodically, and forwards inbound transfers to
//! [`node::Node::ingest_topic_transfer`] / [`node::Node::ingest_topic_response_transfer`].
//! Nothing here spawns a thread, holds a lock, or awaits anything.

pub mod arena;
pub mod bloom;
pub mod config;
pub mod error;
pub mod future;
pub mod gossip;
pub mod heartbeat;
pub mod index;
pub mod name;
pub mod node;
pub mod node_id;
pub mod platform;
pub mod topic;

pub use bloom::Bloom64;
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use future::FutureOutcome;
pub use heartbeat::Heartbeat;
pub use node::Node;
pub use platform::{Payload, Platform, TopicHandle};
pub use topic::{FutureId, Topic, TopicId};

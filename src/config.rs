//! Build/runtime configuration (spec §6 "Configuration options").

use serde::{Deserialize, Serialize};

/// Subject-ID of the default pinned heartbeat topic (name `"7509"`).
pub const DEFAULT_HEARTBEAT_TOPIC_NAME: &str = "/7509";

/// `node_id_max` for transports other than CAN.
pub const DEFAULT_NODE_ID_MAX: u32 = 65534;

/// RPC service-ID reserved for "topic response" delivery (spec §6).
pub const RESPONSE_SERVICE_ID: u16 = 510;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the pinned heartbeat topic name; testing only.
    pub heartbeat_topic_name: String,

    /// Forces every non-pinned topic to prefer one subject-ID; stress
    /// testing only.
    pub preferred_topic_override: Option<u16>,

    /// Enables the diagnostic trace hook.
    pub trace: bool,

    /// Cadence cap: a heartbeat is published at least this often.
    pub max_heartbeat_period_micros: u64,

    /// A full gossip cycle (every local topic gossiped at least once)
    /// completes within this period.
    pub max_full_cycle_period_micros: u64,

    /// Upper bound (inclusive) of the node-ID range.
    pub node_id_max: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heartbeat_topic_name: DEFAULT_HEARTBEAT_TOPIC_NAME.to_string(),
            preferred_topic_override: None,
            trace: false,
            max_heartbeat_period_micros: 1_000_000,
            max_full_cycle_period_micros: 10_000_000,
            node_id_max: DEFAULT_NODE_ID_MAX,
        }
    }
}

//! The node instance tying every component together (spec §3 "Node
//! instance", §4.I "Driver loop").
//!
//! Single-owner, single-threaded, no locks: `Node<P>`'s public methods are
//! the three entry points an embedder drives — [`Node::update`],
//! [`Node::ingest_topic_transfer`], [`Node::ingest_topic_response_transfer`]
//! — plus the topic lifecycle and publish API they sit on top of.

use log::{debug, warn};

use crate::arena::Arena;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::future::{FutureOutcome, FutureState, PendingFuture};
use crate::gossip;
use crate::heartbeat::Heartbeat;
use crate::index::{FifoIndex, UniqueIndex};
use crate::name;
use crate::node_id;
use crate::platform::{Payload, Platform};
use crate::topic::{self, FutureId, PublisherState, SubscriberState, Topic, TopicId};

/// A single participant in the coordination network.
pub struct Node {
    uid: u64,
    namespace: String,
    display_name: String,
    start_timestamp: u64,

    /// Time of the most recent heartbeat-driven event on any topic,
    /// network-wide (spec §3 "Node instance").
    last_event_ts: u64,
    /// Time of the most recent heartbeat-driven event that caused a local
    /// reallocation (an eviction loss or a divergent-allocation loss).
    last_local_event_ts: u64,

    node_id: Option<u32>,
    node_id_collision_pending: bool,

    heartbeat_topic: TopicId,
    next_heartbeat: u64,

    topic_count: usize,
    topics: Arena<Topic>,
    futures: Arena<PendingFuture>,

    topics_by_hash: UniqueIndex<u64, TopicId>,
    topics_by_subject: UniqueIndex<u16, TopicId>,
    topics_by_gossip: FifoIndex<u64, TopicId>,
    futures_by_deadline: FifoIndex<u64, FutureId>,

    platform: Box<dyn Platform>,
    config: Config,
}

impl Node {
    /// Construct a node and create its pinned heartbeat topic. If
    /// `initial_node_id` is given it is claimed immediately; otherwise the
    /// first heartbeat (and thus the first node-ID pick) is deferred by a
    /// uniform random delay in `[1s, 3s]` to listen first (spec §4.G).
    pub fn new(
        uid: u64,
        namespace: impl Into<String>,
        display_name: impl Into<String>,
        config: Config,
        platform: Box<dyn Platform>,
        initial_node_id: Option<u32>,
    ) -> CoreResult<Self> {
        if uid == 0 {
            return Err(CoreError::Argument("uid must be non-zero".into()));
        }

        let now = platform.now_micros();
        let node_id_max = platform.node_id_max();
        let heartbeat_topic_name = config.heartbeat_topic_name.clone();

        let mut config = config;
        config.node_id_max = node_id_max;

        let mut node = Self {
            uid,
            namespace: namespace.into(),
            display_name: display_name.into(),
            start_timestamp: now,
            last_event_ts: now,
            last_local_event_ts: now,
            node_id: None,
            node_id_collision_pending: false,
            heartbeat_topic: TopicId(0),
            next_heartbeat: now,
            topic_count: 0,
            topics: Arena::new(),
            futures: Arena::new(),
            topics_by_hash: UniqueIndex::new(),
            topics_by_subject: UniqueIndex::new(),
            topics_by_gossip: FifoIndex::new(),
            futures_by_deadline: FifoIndex::new(),
            platform,
            config,
        };

        node.heartbeat_topic = node.create_topic(&heartbeat_topic_name)?;
        node.subscribe(node.heartbeat_topic)?;

        match initial_node_id {
            Some(id) => {
                if id > node_id_max {
                    return Err(CoreError::Argument(format!(
                        "node-ID {id} exceeds node_id_max {node_id_max}"
                    )));
                }
                node.platform.node_id_set(id)?;
                node.node_id = Some(id);
                node.next_heartbeat = now + node.heartbeat_period();
            }
            None => {
                let delay = 1_000_000 + node.whitened_prng() % 2_000_001;
                node.next_heartbeat = now + delay;
            }
        }

        Ok(node)
    }

    // ---- accessors -----------------------------------------------------

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn node_id(&self) -> Option<u32> {
        self.node_id
    }

    pub fn topic_count(&self) -> usize {
        self.topic_count
    }

    pub fn next_heartbeat(&self) -> u64 {
        self.next_heartbeat
    }

    pub fn topic_subject_id(&self, topic_id: TopicId) -> Option<u16> {
        self.topics.get(topic_id).map(|t| t.subject_id)
    }

    pub fn topic_hash(&self, topic_id: TopicId) -> Option<u64> {
        self.topics.get(topic_id).map(|t| t.hash)
    }

    pub fn topic_evictions(&self, topic_id: TopicId) -> Option<u64> {
        self.topics.get(topic_id).map(|t| t.evictions)
    }

    pub fn topic_age(&self, topic_id: TopicId) -> Option<u64> {
        self.topics.get(topic_id).map(|t| t.age)
    }

    pub fn topic_last_local_event_ts(&self, topic_id: TopicId) -> Option<u64> {
        self.topics.get(topic_id).map(|t| t.last_local_event_ts)
    }

    pub fn topic_by_hash(&self, hash: u64) -> Option<TopicId> {
        self.topics_by_hash.get(&hash)
    }

    pub fn heartbeat_topic(&self) -> TopicId {
        self.heartbeat_topic
    }

    fn heartbeat_period(&self) -> u64 {
        gossip::next_heartbeat_period(
            self.config.max_heartbeat_period_micros,
            self.config.max_full_cycle_period_micros,
            self.topic_count,
        )
    }

    fn heartbeat_subject_id(&self) -> u16 {
        self.topics.get(self.heartbeat_topic).expect("heartbeat topic always exists").subject_id
    }

    fn whitened_prng(&self) -> u64 {
        let raw = self.platform.prng();
        let mut buf = [0u8; 16];
        buf[0..8].copy_from_slice(&raw.to_le_bytes());
        buf[8..16].copy_from_slice(&self.uid.to_le_bytes());
        rapidhash::rapidhash(&buf)
    }

    // ---- topic lifecycle ------------------------------------------------

    /// Create a local topic for `raw_name`, place it in a subject-ID slot
    /// (possibly displacing lower-ranked topics), and schedule it for
    /// immediate gossip.
    pub fn create_topic(&mut self, raw_name: &str) -> CoreResult<TopicId> {
        if self.topic_count >= topic::DYNAMIC_POOL as usize {
            return Err(CoreError::Capacity(format!(
                "local topic table is full at {} topics",
                topic::DYNAMIC_POOL
            )));
        }

        let canonical = name::canonicalize(&self.namespace, &self.display_name, raw_name)?;
        let hash = name::hash_name(&canonical);
        if self.topics_by_hash.get(&hash).is_some() {
            return Err(CoreError::Name(format!("topic name already exists: {canonical}")));
        }

        let pinned = name::pinned_value(&canonical).is_some();
        let transport_handle = self.platform.topic_new()?;
        let seed = self.whitened_prng();
        let now = self.platform.now_micros();

        let topic = Topic {
            name: canonical,
            hash,
            pinned,
            evictions: 0,
            subject_id: 0,
            age: 0,
            aged_at_micros: now,
            last_gossip: 0,
            gossip_index_key: (0, 0),
            last_event_ts: now,
            last_local_event_ts: now,
            publisher: PublisherState { next_transfer_id: seed, priority: 0, publishing: false },
            subscriber: SubscriberState::default(),
            futures_by_transfer_id: UniqueIndex::new(),
            transport_handle,
        };

        let topic_id = self.topics.insert(topic);
        self.topics_by_hash
            .insert_if_absent(hash, topic_id)
            .expect("hash uniqueness already checked above");
        let gossip_key = self.topics_by_gossip.insert(0, topic_id);
        self.topics.get_mut(topic_id).unwrap().gossip_index_key = gossip_key;
        self.topic_count += 1;

        self.allocate(topic_id, 0, true);
        Ok(topic_id)
    }

    /// Remove a topic entirely: drop it from all three indices, unsubscribe
    /// transport-side, cancel (without firing callbacks) every outstanding
    /// future bound to it, and free transport state (spec §9 supplement).
    pub fn topic_destroy(&mut self, topic_id: TopicId) -> CoreResult<()> {
        let future_ids: Vec<FutureId> = self
            .topics
            .get(topic_id)
            .ok_or_else(|| CoreError::Argument("unknown topic".into()))?
            .futures_by_transfer_id
            .iter()
            .map(|(_, v)| *v)
            .collect();

        for future_id in future_ids {
            self.cancel_future(future_id);
        }

        let removed = self.topics.remove(topic_id).expect("checked present above");
        self.topics_by_hash.remove(&removed.hash);
        self.topics_by_subject.remove(&removed.subject_id);
        self.topics_by_gossip.remove(&removed.gossip_index_key);
        if removed.subscriber.subscribed {
            self.platform.topic_unsubscribe(removed.transport_handle);
        }
        self.platform.topic_destroy(removed.transport_handle);
        self.topic_count -= 1;
        Ok(())
    }

    pub fn subscribe(&mut self, topic_id: TopicId) -> CoreResult<()> {
        let handle = self
            .topics
            .get(topic_id)
            .ok_or_else(|| CoreError::Argument("unknown topic".into()))?
            .transport_handle;
        self.platform.topic_subscribe(handle)?;
        self.topics.get_mut(topic_id).unwrap().subscriber.subscribed = true;
        Ok(())
    }

    pub fn unsubscribe(&mut self, topic_id: TopicId) -> CoreResult<()> {
        let handle = self
            .topics
            .get(topic_id)
            .ok_or_else(|| CoreError::Argument("unknown topic".into()))?
            .transport_handle;
        self.platform.topic_unsubscribe(handle);
        self.topics.get_mut(topic_id).unwrap().subscriber.subscribed = false;
        Ok(())
    }

    /// Place `topic_id` into a subject-ID slot under
    /// `(hash + evictions) mod 6144` (or `hash` if pinned), recursively
    /// displacing lower-ranked occupants (spec §4.D).
    fn allocate(&mut self, topic_id: TopicId, new_evictions: u64, virgin: bool) {
        let was_subscribed = {
            let t = self.topics.get_mut(topic_id).expect("topic exists");
            let was = t.subscriber.subscribed;
            if was {
                self.platform.topic_unsubscribe(t.transport_handle);
                t.subscriber.subscribed = false;
            }
            was
        };

        if !virgin {
            let old_sid = self.topics.get(topic_id).unwrap().subject_id;
            self.topics_by_subject.remove(&old_sid);
        }
        self.topics.get_mut(topic_id).unwrap().evictions = new_evictions;

        loop {
            let (hash, pinned, evictions, age) = {
                let t = self.topics.get(topic_id).unwrap();
                (t.hash, t.pinned, t.evictions, t.age)
            };
            let sid = if let Some(forced) = self.config.preferred_topic_override {
                if pinned { topic::subject_id_for(hash, evictions, true) } else { forced }
            } else {
                topic::subject_id_for(hash, evictions, pinned)
            };

            match self.topics_by_subject.insert_if_absent(sid, topic_id) {
                Ok(()) => {
                    self.topics.get_mut(topic_id).unwrap().subject_id = sid;
                    break;
                }
                Err(other_id) => {
                    if other_id == topic_id {
                        // Already holds this slot (e.g. a stress-test override
                        // collapsing everyone onto one ID); nothing to do.
                        break;
                    }
                    let (other_pinned, other_age, other_hash, other_evictions) = {
                        let o = self.topics.get(other_id).unwrap();
                        (o.pinned, o.age, o.hash, o.evictions)
                    };
                    if topic::left_wins(pinned, age, hash, other_pinned, other_age, other_hash) {
                        self.allocate(other_id, other_evictions + 1, false);
                    } else {
                        self.topics.get_mut(topic_id).unwrap().evictions += 1;
                    }
                }
            }
        }

        self.schedule_asap(topic_id);

        if was_subscribed {
            let handle = self.topics.get(topic_id).unwrap().transport_handle;
            match self.platform.topic_subscribe(handle) {
                Ok(()) => {
                    self.topics.get_mut(topic_id).unwrap().subscriber.subscribed = true;
                }
                Err(e) => {
                    warn!("resubscription failed after reallocating topic: {e}");
                    self.topics.get_mut(topic_id).unwrap().subscriber.subscribed = false;
                    self.platform.topic_handle_resubscription_error(handle, &e);
                }
            }
        }
    }

    fn schedule_asap(&mut self, topic_id: TopicId) {
        let sentinel = self.topics.get(topic_id).unwrap().asap_sentinel();
        self.reschedule_gossip(topic_id, sentinel);
    }

    fn reschedule_gossip(&mut self, topic_id: TopicId, new_last_gossip: u64) {
        let old_key = self.topics.get(topic_id).unwrap().gossip_index_key;
        self.topics_by_gossip.remove(&old_key);
        let new_key = self.topics_by_gossip.insert(new_last_gossip, topic_id);
        let t = self.topics.get_mut(topic_id).unwrap();
        t.last_gossip = new_last_gossip;
        t.gossip_index_key = new_key;
    }

    // ---- publish / futures ----------------------------------------------

    /// Publish a payload on `topic_id`, fire-and-forget. Requires a claimed
    /// node-ID (spec §7 `Anonymous`) since every transfer is attributed to
    /// the local node.
    pub fn publish(&mut self, topic_id: TopicId, deadline: u64, payload: Payload) -> CoreResult<u64> {
        if self.node_id.is_none() {
            return Err(CoreError::Anonymous);
        }
        let now = self.platform.now_micros();
        let handle = self
            .topics
            .get(topic_id)
            .ok_or_else(|| CoreError::Argument("unknown topic".into()))?
            .transport_handle;
        let transfer_id = self.topics.get(topic_id).unwrap().publisher.next_transfer_id;

        self.platform.topic_publish(handle, deadline, payload)?;

        let t = self.topics.get_mut(topic_id).unwrap();
        t.publisher.next_transfer_id = transfer_id.wrapping_add(1);
        t.publisher.publishing = true;
        t.bump_age_on_publish(now);
        Ok(transfer_id)
    }

    /// Publish a payload and register a future expecting a peer-to-peer
    /// response. The future is registered before the transport is touched;
    /// a transport failure rolls the registration back (spec §4.H, §7).
    /// Requires a claimed node-ID, same as [`Self::publish`].
    pub fn publish_with_future(
        &mut self,
        topic_id: TopicId,
        deadline: u64,
        response_deadline: u64,
        payload: Payload,
        callback: Box<dyn FnOnce(FutureOutcome)>,
    ) -> CoreResult<()> {
        if self.node_id.is_none() {
            return Err(CoreError::Anonymous);
        }
        let mask = self.platform.transfer_id_mask();
        let topic = self
            .topics
            .get(topic_id)
            .ok_or_else(|| CoreError::Argument("unknown topic".into()))?;
        let transfer_id = topic.publisher.next_transfer_id;
        let masked = transfer_id & mask;

        if topic.futures_by_transfer_id.get(&masked).is_some() {
            return Err(CoreError::Capacity(format!(
                "transfer-id {masked} already has a future in flight on this topic"
            )));
        }

        let pending = PendingFuture {
            topic: topic_id,
            transfer_id_masked: masked,
            deadline: response_deadline,
            state: FutureState::Pending,
            deadline_key: (0, 0),
            callback,
        };
        let future_id = self.futures.insert(pending);
        self.topics
            .get_mut(topic_id)
            .unwrap()
            .futures_by_transfer_id
            .insert_if_absent(masked, future_id)
            .expect("absence checked above under single-threaded execution");

        let handle = self.topics.get(topic_id).unwrap().transport_handle;
        match self.platform.topic_publish(handle, deadline, payload) {
            Ok(()) => {
                let key = self.futures_by_deadline.insert(response_deadline, future_id);
                self.futures.get_mut(future_id).unwrap().deadline_key = key;
                let now = self.platform.now_micros();
                let t = self.topics.get_mut(topic_id).unwrap();
                t.publisher.next_transfer_id = transfer_id.wrapping_add(1);
                t.publisher.publishing = true;
                t.bump_age_on_publish(now);
                Ok(())
            }
            Err(e) => {
                self.topics.get_mut(topic_id).unwrap().futures_by_transfer_id.remove(&masked);
                self.futures.remove(future_id);
                Err(e)
            }
        }
    }

    /// Cancel an outstanding future: remove it from both indices without
    /// invoking its callback.
    pub fn cancel_future(&mut self, future_id: FutureId) {
        if let Some(f) = self.futures.get(future_id) {
            let topic_id = f.topic;
            let masked = f.transfer_id_masked;
            let key = f.deadline_key;
            self.futures_by_deadline.remove(&key);
            if let Some(t) = self.topics.get_mut(topic_id) {
                t.futures_by_transfer_id.remove(&masked);
            }
        }
        self.futures.remove(future_id);
    }

    fn sweep_expired_futures(&mut self, now: u64) {
        loop {
            let Some((key, future_id)) = self.futures_by_deadline.min() else {
                break;
            };
            if key.0 >= now {
                break;
            }
            self.futures_by_deadline.remove(&key);
            if let Some(f) = self.futures.get(future_id) {
                let topic_id = f.topic;
                let masked = f.transfer_id_masked;
                if let Some(t) = self.topics.get_mut(topic_id) {
                    t.futures_by_transfer_id.remove(&masked);
                }
            }
            if let Some(mut f) = self.futures.remove(future_id) {
                f.state = FutureState::Failure;
                (f.callback)(FutureOutcome::Failure);
            }
        }
    }

    // ---- inbound transfers ------------------------------------------------

    fn observe_neighbor(&mut self, sender_node_id: u32) {
        if self.node_id == Some(sender_node_id) {
            warn!("observed node-id {sender_node_id} collides with our own");
            self.node_id_collision_pending = true;
        }
        let have = self.node_id.is_some();
        let should_back_off = node_id::mark_neighbor(self.platform.node_id_bloom(), sender_node_id, have);
        if should_back_off {
            let slide = self.whitened_prng() % 2_000_001;
            debug!("anonymous node backing off first heartbeat by {slide}us after seeing a new neighbor");
            self.next_heartbeat = self.next_heartbeat.saturating_add(slide);
        }
    }

    /// Ingest an inbound transfer on `subject_id`. Heartbeats on the pinned
    /// heartbeat subject are merged via [`Self::handle_heartbeat`]; other
    /// subjects bump their topic's age and record the transfer, but
    /// delivering payload bytes to an application subscriber is left to the
    /// embedder (out of this crate's scope, spec §1).
    pub fn ingest_topic_transfer(
        &mut self,
        subject_id: u16,
        sender_node_id: u32,
        transfer_id: u64,
        payload: Payload,
    ) -> CoreResult<()> {
        self.observe_neighbor(sender_node_id);

        if subject_id == self.heartbeat_subject_id() {
            if let Some(hb) = Heartbeat::decode(payload.as_slice()) {
                self.handle_heartbeat(&hb);
            }
        } else if let Some(topic_id) = self.topics_by_subject.get(&subject_id) {
            let t = self.topics.get_mut(topic_id).unwrap();
            t.bump_age_on_receive();
            t.subscriber.last_received_transfer_id = Some(transfer_id);
        }

        self.platform.release_payload(payload);
        Ok(())
    }

    /// Ingest a peer-to-peer response transfer on the reserved RPC
    /// service-ID. The first 8 bytes of the payload carry the topic hash
    /// the response is about (spec §4.H).
    pub fn ingest_topic_response_transfer(
        &mut self,
        sender_node_id: u32,
        transfer_id: u64,
        payload: Payload,
    ) -> CoreResult<()> {
        self.observe_neighbor(sender_node_id);

        if payload.0.len() < 8 {
            self.platform.release_payload(payload);
            return Ok(());
        }
        let topic_hash = u64::from_be_bytes(payload.0[0..8].try_into().unwrap());
        let Some(topic_id) = self.topics_by_hash.get(&topic_hash) else {
            self.platform.release_payload(payload);
            return Ok(());
        };
        let masked = transfer_id & self.platform.transfer_id_mask();
        let Some(future_id) = self
            .topics
            .get(topic_id)
            .and_then(|t| t.futures_by_transfer_id.get(&masked))
        else {
            self.platform.release_payload(payload);
            return Ok(());
        };

        let mut body = payload;
        body.0.drain(0..8);

        let deadline_key = self.futures.get(future_id).unwrap().deadline_key;
        self.futures_by_deadline.remove(&deadline_key);
        self.topics.get_mut(topic_id).unwrap().futures_by_transfer_id.remove(&masked);
        let mut f = self.futures.remove(future_id).expect("looked up above");
        f.state = FutureState::Success;
        (f.callback)(FutureOutcome::Success(body));
        Ok(())
    }

    /// Apply the CRDT merge rules for a received heartbeat (spec §4.E).
    fn handle_heartbeat(&mut self, hb: &Heartbeat) {
        let now = self.platform.now_micros();
        let remote_pinned = name::hash_is_pinned(hb.topic_hash);

        match self.topics_by_hash.get(&hb.topic_hash) {
            None => {
                let candidate_sid = topic::subject_id_for(hb.topic_hash, hb.evictions, remote_pinned);
                if let Some(local_id) = self.topics_by_subject.get(&candidate_sid) {
                    let (local_pinned, local_age, local_hash) = {
                        let t = self.topics.get(local_id).unwrap();
                        (t.pinned, t.age, t.hash)
                    };
                    let local_wins =
                        topic::left_wins(local_pinned, local_age, local_hash, remote_pinned, hb.age, hb.topic_hash);

                    self.topics.get_mut(local_id).unwrap().last_event_ts = now;
                    self.last_event_ts = now;
                    if local_wins {
                        self.schedule_asap(local_id);
                    } else {
                        let new_evictions = self.topics.get(local_id).unwrap().evictions + 1;
                        self.topics.get_mut(local_id).unwrap().last_local_event_ts = now;
                        self.last_local_event_ts = now;
                        self.allocate(local_id, new_evictions, false);
                    }
                }
            }
            Some(local_id) => {
                let (local_evictions, local_age) = {
                    let t = self.topics.get(local_id).unwrap();
                    (t.evictions, t.age)
                };
                self.topics.get_mut(local_id).unwrap().last_event_ts = now;
                self.last_event_ts = now;

                if local_evictions == hb.evictions {
                    let t = self.topics.get_mut(local_id).unwrap();
                    t.age = t.age.max(hb.age);
                } else {
                    let mine_lage = topic::log2_floor(local_age);
                    let other_lage = topic::log2_floor(hb.age);
                    let local_wins = mine_lage > other_lage || (mine_lage == other_lage && local_evictions > hb.evictions);

                    if local_wins {
                        self.schedule_asap(local_id);
                    } else {
                        let t = self.topics.get_mut(local_id).unwrap();
                        t.age = t.age.max(hb.age);
                        t.last_local_event_ts = now;
                        self.last_local_event_ts = now;
                        let previous_last_gossip = t.last_gossip;

                        self.allocate(local_id, hb.evictions, false);

                        let new_sid = self.topics.get(local_id).unwrap().subject_id;
                        let remote_sid = topic::subject_id_for(hb.topic_hash, hb.evictions, remote_pinned);
                        if new_sid == remote_sid {
                            self.reschedule_gossip(local_id, previous_last_gossip);
                        }
                    }
                }
            }
        }
    }

    // ---- driver -----------------------------------------------------------

    /// Advance time: retire expired futures, allocate a node-ID when due,
    /// and publish a heartbeat when due (spec §4.I).
    pub fn update(&mut self) -> CoreResult<()> {
        let now = self.platform.now_micros();
        self.sweep_expired_futures(now);

        if self.node_id_collision_pending {
            warn!("dropping claimed node-id {:?} after a collision, re-entering anonymous state", self.node_id);
            self.platform.node_id_clear();
            self.node_id = None;
            self.node_id_collision_pending = false;
            self.next_heartbeat = now;
        }

        if now < self.next_heartbeat {
            return Ok(());
        }

        if self.node_id.is_none() {
            let randoms: Vec<u64> = (0..4).map(|_| self.whitened_prng()).collect();
            let node_id_max = self.config.node_id_max;
            let picked = {
                let mut idx = 0usize;
                let bloom = self.platform.node_id_bloom();
                node_id::pick(bloom, node_id_max, move || {
                    let v = randoms[idx % randoms.len()];
                    idx += 1;
                    v
                })
            };
            self.platform.node_id_set(picked)?;
            debug!("claimed node-id {picked}");
            self.node_id = Some(picked);
        }

        self.publish_due_heartbeat(now)?;
        self.next_heartbeat += self.heartbeat_period();
        Ok(())
    }

    fn publish_due_heartbeat(&mut self, now: u64) -> CoreResult<()> {
        let Some((_, topic_id)) = self.topics_by_gossip.min() else {
            return Ok(());
        };

        self.topics.get_mut(topic_id).unwrap().bump_age_on_publish(now);
        let t = self.topics.get(topic_id).unwrap();
        let hb = Heartbeat {
            uptime_seconds: ((now - self.start_timestamp) / 1_000_000) as u32,
            user_word: [0, 0, 0],
            uid: self.uid,
            topic_hash: t.hash,
            age: t.age,
            publishing: t.publisher.publishing,
            subscribed: t.subscriber.subscribed,
            evictions: t.evictions,
            topic_name: t.name.clone(),
        };
        let payload = Payload::new(hb.encode());

        debug!("gossiping topic {:#x} (evictions {}, age {})", t.hash, t.evictions, t.age);
        let hb_handle = self.topics.get(self.heartbeat_topic).unwrap().transport_handle;
        self.platform.topic_publish(hb_handle, now + self.heartbeat_period(), payload)?;
        self.reschedule_gossip(topic_id, now);
        Ok(())
    }

    /// Time of the most recent heartbeat-driven event on any topic this
    /// node knows about, network-wide.
    pub fn last_event_ts(&self) -> u64 {
        self.last_event_ts
    }

    /// Time of the most recent heartbeat-driven event that cost this node
    /// a local reallocation.
    pub fn last_local_event_ts(&self) -> u64 {
        self.last_local_event_ts
    }
}

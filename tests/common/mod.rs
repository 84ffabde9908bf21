//! A deterministic [`Platform`] double for integration tests: fixed clock,
//! seeded `fastrand` PRNG, in-memory transport. Grounded on the teacher's
//! `MockTransport`/`FixedTimeProvider` pair (`icn-crdt::gossip` tests).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use meshcore::{Bloom64, CoreError, CoreResult, Payload, Platform, TopicHandle};

/// One message the core asked the platform to publish.
#[derive(Debug, Clone)]
pub struct Sent {
    pub handle: TopicHandle,
    pub payload: Vec<u8>,
}

/// Shared wall clock, so two [`FakePlatform`]s can be advanced in lockstep
/// to model nodes booting "simultaneously".
#[derive(Clone)]
pub struct Clock(Rc<Cell<u64>>);

impl Clock {
    pub fn new(start_micros: u64) -> Self {
        Self(Rc::new(Cell::new(start_micros)))
    }

    pub fn advance(&self, micros: u64) {
        self.0.set(self.0.get() + micros);
    }

    pub fn now(&self) -> u64 {
        self.0.get()
    }
}

pub struct FakePlatform {
    clock: Clock,
    rng: RefCell<fastrand::Rng>,
    bloom: Bloom64,
    next_handle: Cell<TopicHandle>,
    node_id: RefCell<Option<u32>>,
    node_id_max: u32,
    transfer_id_mask: u64,
    pub sent: Rc<RefCell<Vec<Sent>>>,
    pub resubscription_errors: Cell<u32>,
}

impl FakePlatform {
    pub fn new(clock: Clock, rng_seed: u64, bloom_bits: u32, node_id_max: u32) -> Self {
        Self {
            clock,
            rng: RefCell::new(fastrand::Rng::with_seed(rng_seed)),
            bloom: Bloom64::new(bloom_bits),
            next_handle: Cell::new(0),
            node_id: RefCell::new(None),
            node_id_max,
            transfer_id_mask: u64::MAX,
            sent: Rc::new(RefCell::new(Vec::new())),
            resubscription_errors: Cell::new(0),
        }
    }

}

impl Platform for FakePlatform {
    fn now_micros(&self) -> u64 {
        self.clock.now()
    }

    fn prng(&self) -> u64 {
        self.rng.borrow_mut().u64(..)
    }

    fn release_payload(&mut self, _payload: Payload) {}

    fn node_id_set(&mut self, node_id: u32) -> CoreResult<()> {
        if node_id > self.node_id_max {
            return Err(CoreError::Argument("node-id out of range".into()));
        }
        *self.node_id.borrow_mut() = Some(node_id);
        Ok(())
    }

    fn node_id_clear(&mut self) {
        *self.node_id.borrow_mut() = None;
    }

    fn node_id_bloom(&mut self) -> &mut Bloom64 {
        &mut self.bloom
    }

    fn request(&mut self, _service_id: u16, _metadata: &[u8], _deadline: u64, _payload: Payload) -> CoreResult<()> {
        Ok(())
    }

    fn topic_new(&mut self) -> CoreResult<TopicHandle> {
        let h = self.next_handle.get();
        self.next_handle.set(h + 1);
        Ok(h)
    }

    fn topic_destroy(&mut self, _handle: TopicHandle) {}

    fn topic_publish(&mut self, handle: TopicHandle, _deadline: u64, payload: Payload) -> CoreResult<()> {
        self.sent.borrow_mut().push(Sent { handle, payload: payload.0 });
        Ok(())
    }

    fn topic_subscribe(&mut self, _handle: TopicHandle) -> CoreResult<()> {
        Ok(())
    }

    fn topic_unsubscribe(&mut self, _handle: TopicHandle) {}

    fn topic_handle_resubscription_error(&mut self, _handle: TopicHandle, _error: &CoreError) {
        self.resubscription_errors.set(self.resubscription_errors.get() + 1);
    }

    fn node_id_max(&self) -> u32 {
        self.node_id_max
    }

    fn transfer_id_mask(&self) -> u64 {
        self.transfer_id_mask
    }
}

//! Ordered indices over topics and futures (spec §4.B).
//!
//! Two flavors are needed. [`UniqueIndex`] backs the by-name-hash,
//! by-subject-ID, and by-masked-transfer-ID indices, where a key identifies
//! at most one element. [`FifoIndex`] backs the two time-ordered indices
//! (gossip schedule, future deadlines), whose comparator is anti-symmetric
//! only: two elements with the same timestamp are never considered equal,
//! so they stay ordered by insertion (FIFO) instead of colliding.
//!
//! Both are `BTreeMap`-backed rather than an intrusive tree, since the
//! elements they index (topics, futures) are owned by the caller and
//! referenced here only by a small `Copy` handle.

use std::collections::BTreeMap;
use std::ops::Bound;

/// An index keyed by a single, unique `K`.
#[derive(Debug, Clone)]
pub struct UniqueIndex<K, V> {
    map: BTreeMap<K, V>,
}

impl<K: Ord + Copy, V: Copy> UniqueIndex<K, V> {
    pub fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).copied()
    }

    /// Insert `value` under `key` unless the key is already occupied, in
    /// which case the occupant is returned unchanged.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> Result<(), V> {
        use std::collections::btree_map::Entry;
        match self.map.entry(key) {
            Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
            Entry::Occupied(e) => Err(*e.get()),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    pub fn min(&self) -> Option<(K, V)> {
        self.map.iter().next().map(|(k, v)| (*k, *v))
    }

    /// The smallest entry with a key strictly greater than `key`.
    pub fn next_greater(&self, key: &K) -> Option<(K, V)> {
        self.map
            .range((Bound::Excluded(*key), Bound::Unbounded))
            .next()
            .map(|(k, v)| (*k, *v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter()
    }
}

impl<K: Ord + Copy, V: Copy> Default for UniqueIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A compound key `(primary, sequence)` that never compares equal across
/// distinct insertions, giving FIFO order among equal `primary` values.
pub type FifoKey<K> = (K, u64);

/// An index keyed by `(K, insertion sequence)`, preserving FIFO order for
/// elements that share a primary key.
#[derive(Debug, Clone)]
pub struct FifoIndex<K, V> {
    map: BTreeMap<FifoKey<K>, V>,
    next_seq: u64,
}

impl<K: Ord + Copy, V: Copy> FifoIndex<K, V> {
    pub fn new() -> Self {
        Self { map: BTreeMap::new(), next_seq: 0 }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert `value` under `primary`, returning the full key the caller
    /// must retain to remove or look up this exact entry later.
    pub fn insert(&mut self, primary: K, value: V) -> FifoKey<K> {
        let key = (primary, self.next_seq);
        self.next_seq += 1;
        self.map.insert(key, value);
        key
    }

    pub fn remove(&mut self, key: &FifoKey<K>) -> Option<V> {
        self.map.remove(key)
    }

    pub fn min(&self) -> Option<(FifoKey<K>, V)> {
        self.map.iter().next().map(|(k, v)| (*k, *v))
    }
}

impl<K: Ord + Copy, V: Copy> Default for FifoIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

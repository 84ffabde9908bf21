//! Node-ID auto-allocation from the observed-neighbor Bloom filter
//! (spec §4.G).

use crate::bloom::Bloom64;

/// Choose an unclaimed node-ID in `[0, node_id_max]` and mark it taken in
/// `bloom`. `rng` is called for every random choice the procedure needs;
/// callers pass `Platform::prng()` whitened with the local UID.
///
/// Falls back to a uniformly random ID in range if the filter's words
/// within range are all saturated (every bit set).
pub fn pick(bloom: &mut Bloom64, node_id_max: u32, mut rng: impl FnMut() -> u64) -> u32 {
    let n_bits = bloom.n_bits() as u64;
    let scan_range = (node_id_max as u64 + 1).min(n_bits);
    let num_words = scan_range.div_ceil(64).max(1) as u32;

    let start_word = (rng() % num_words as u64) as u32;
    let mut chosen_word = None;
    for i in 0..num_words {
        let w = (start_word + i) % num_words;
        if bloom.words()[w as usize].count_ones() < 64 {
            chosen_word = Some(w);
            break;
        }
    }

    let Some(word_index) = chosen_word else {
        // Filter saturated within range: fall back to a uniformly random pick.
        let candidate = (rng() % (node_id_max as u64 + 1)) as u32;
        bloom.set(candidate as u64);
        return candidate;
    };

    let word = bloom.words()[word_index as usize];
    let start_bit = (rng() % 64) as u32;
    let mut bit_index = 0u32;
    for i in 0..64 {
        let b = (start_bit + i) % 64;
        if word & (1u64 << b) == 0 {
            bit_index = b;
            break;
        }
    }

    let mut candidate = word_index as u64 * 64 + bit_index as u64;

    // Spread beyond the filter's period by a random multiple of n_bits,
    // discarding the multiplier entirely rather than overflowing node_id_max
    // (spec §9 open question).
    if n_bits > 0 {
        let max_k = (node_id_max as u64).saturating_sub(candidate) / n_bits;
        if max_k > 0 {
            let k = rng() % (max_k + 1);
            candidate += k * n_bits;
        }
    }

    debug_assert!(candidate <= node_id_max as u64);
    bloom.set(candidate);
    candidate as u32
}

/// Record an observed neighbor node-ID. Purges the filter when occupancy
/// exceeds 31/32 of capacity (evicting nodes that have since left), then
/// sets the bit for `sender_node_id`.
///
/// Returns `true` iff a CSMA/CD-style back-off slide of the next heartbeat
/// deadline should be applied: we don't yet have a node-ID of our own, and
/// this sender was new to the filter.
pub fn mark_neighbor(bloom: &mut Bloom64, sender_node_id: u32, have_node_id: bool) -> bool {
    let threshold = (31 * bloom.n_bits() as u64) / 32;
    if bloom.popcount() > threshold {
        bloom.purge();
    }
    let is_new = !bloom.get(sender_node_id as u64);
    bloom.set(sender_node_id as u64);
    !have_node_id && is_new
}

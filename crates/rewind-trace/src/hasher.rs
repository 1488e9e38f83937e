//! Seeded per-tick content hashing.

use rewind_core::hash::state_hash;
use rewind_core::Tick;

/// One rung of a hash ladder: the content hash recorded at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashEntry {
    /// The tick the hash was computed at.
    pub tick: Tick,
    /// Content hash of (seed, tick, state bytes, input bytes).
    pub hash: u64,
}

/// Records a per-tick content hash ladder for one execution.
///
/// Each [`advance_tick`](StateHasher::advance_tick) call reduces the
/// tick's serialized world bytes plus applied input bytes to a single
/// hash and appends it to an ordered history. Hashing is a pure function
/// of the arguments and the seed: two hashers fed byte-identical inputs
/// produce byte-identical ladders, in the same process or across machines.
/// That purity is the correctness property this whole subsystem exists to
/// police.
///
/// Hosts typically keep two live instances — "local" and
/// "remote/reference" — and hand both histories to
/// [`compare_hash_ladders`](crate::compare_hash_ladders).
///
/// # Examples
///
/// ```
/// use rewind_trace::StateHasher;
/// use rewind_core::Tick;
///
/// let mut a = StateHasher::new(42);
/// let mut b = StateHasher::new(42);
/// let ha = a.advance_tick(Tick(1), &[1, 2, 3], &[4, 5]);
/// let hb = b.advance_tick(Tick(1), &[1, 2, 3], &[4, 5]);
/// assert_eq!(ha, hb);
/// ```
#[derive(Debug)]
pub struct StateHasher {
    seed: u64,
    history: Vec<HashEntry>,
}

impl StateHasher {
    /// Create a hasher salted with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            history: Vec::new(),
        }
    }

    /// Clear the history and adopt a new seed.
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.history.clear();
    }

    /// Hash one tick's state and input bytes, append, and return the hash.
    pub fn advance_tick(&mut self, tick: Tick, state: &[u8], input: &[u8]) -> u64 {
        let hash = state_hash(self.seed, tick, state, input);
        self.history.push(HashEntry { tick, hash });
        hash
    }

    /// The tick-ordered hash ladder.
    pub fn history(&self) -> &[HashEntry] {
        &self.history
    }

    /// Look up the hash entry for an exact tick.
    pub fn entry_at_tick(&self, tick: Tick) -> Option<&HashEntry> {
        self.history
            .binary_search_by_key(&tick, |e| e.tick)
            .ok()
            .map(|idx| &self.history[idx])
    }

    /// Drop every entry with tick strictly greater than `tick`.
    ///
    /// Used when a rollback abandons the hashed future.
    pub fn truncate_after(&mut self, tick: Tick) {
        let keep = self.history.partition_point(|e| e.tick <= tick);
        self.history.truncate(keep);
    }

    /// The hashing salt this instance was seeded with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

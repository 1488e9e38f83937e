//! Bounded-history rollback snapshots.

use indexmap::IndexMap;
use rewind_core::hash::payload_hash;
use rewind_core::Tick;

/// An immutable captured world state.
///
/// Owns its byte buffer exclusively; the content hash is computed once at
/// capture time and never recomputed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// The tick the world was serialized at.
    pub tick: Tick,
    /// The serialized world bytes.
    pub ecs_data: Vec<u8>,
    /// Content hash of `ecs_data` at capture time.
    pub state_hash: u64,
}

/// Stores bounded-history rollback snapshots with exact-tick lookup.
///
/// Eviction is strict FIFO by tick, not LRU: this store answers "can I go
/// back at most K ticks," not "what was accessed recently." Lookup never
/// interpolates — a tick that was never pushed is absent, full stop;
/// callers wanting "the most recent snapshot ≤ tick" scan
/// [`iter`](SnapshotManager::iter) themselves.
///
/// Backed by an `IndexMap` for deterministic iteration order alongside
/// exact-key lookup.
///
/// # Examples
///
/// ```
/// use rewind_engine::SnapshotManager;
/// use rewind_core::Tick;
///
/// let mut manager = SnapshotManager::new(8);
/// let snapshot = SnapshotManager::take_snapshot(Tick(1), vec![1, 2, 3]);
/// manager.push_snapshot(snapshot);
///
/// assert!(manager.snapshot_at_tick(Tick(1)).is_some());
/// assert!(manager.snapshot_at_tick(Tick(2)).is_none());
/// ```
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: IndexMap<Tick, Snapshot>,
    capacity: usize,
}

impl SnapshotManager {
    /// Create a manager retaining at most `capacity` snapshots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero — a store that can hold nothing
    /// cannot support rollback at all.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "SnapshotManager capacity must be >= 1, got {capacity}");
        Self {
            snapshots: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Capture a snapshot of `ecs_data` at `tick` without storing it.
    ///
    /// The content hash is computed here, so the returned value is
    /// self-contained — verification paths compare against it directly.
    pub fn take_snapshot(tick: Tick, ecs_data: Vec<u8>) -> Snapshot {
        let state_hash = payload_hash(&ecs_data);
        Snapshot {
            tick,
            ecs_data,
            state_hash,
        }
    }

    /// Store a snapshot, evicting the oldest if capacity is exceeded.
    ///
    /// Re-pushing an existing tick replaces that entry in place without
    /// evicting anything.
    pub fn push_snapshot(&mut self, snapshot: Snapshot) {
        if let Some(existing) = self.snapshots.get_mut(&snapshot.tick) {
            *existing = snapshot;
            return;
        }
        self.snapshots.insert(snapshot.tick, snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.shift_remove_index(0);
        }
    }

    /// Exact-match lookup. No nearest-tick fallback.
    pub fn snapshot_at_tick(&self, tick: Tick) -> Option<&Snapshot> {
        self.snapshots.get(&tick)
    }

    /// Iterate snapshots in insertion (tick) order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.values()
    }

    /// The most recently pushed snapshot.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.values().last()
    }

    /// Drop every snapshot with tick strictly greater than `tick`.
    ///
    /// Used when a rollback abandons the captured future.
    pub fn truncate_after(&mut self, tick: Tick) {
        self.snapshots.retain(|&t, _| t <= tick);
    }

    /// Number of snapshots currently stored.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The configured retention capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

//! Hash-ladder comparison for cross-execution divergence detection.

use rewind_core::Tick;

use crate::hasher::HashEntry;

/// The first point at which two hash ladders disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LadderDivergence {
    /// The tick at which the ladders first disagree.
    pub tick: Tick,
    /// Hash from the local ladder, if it has an entry at this index.
    pub local: Option<u64>,
    /// Hash from the remote ladder, if it has an entry at this index.
    pub remote: Option<u64>,
}

/// Compare two independently-populated hash ladders.
///
/// Walks both histories index-aligned. A tick or hash mismatch at any
/// index is the divergence point. If one ladder is a strict prefix of the
/// other, the boundary tick itself counts as the divergence — a peer that
/// stopped hashing is not in agreement with one that kept going.
///
/// Returns `None` only when the ladders are identical in length, ticks,
/// and hashes. This is how cross-peer lockstep comparison is done: each
/// peer populates its own [`StateHasher`](crate::StateHasher) and some
/// external transport delivers one history to the other side.
///
/// # Examples
///
/// ```
/// use rewind_trace::{compare_hash_ladders, StateHasher};
/// use rewind_core::Tick;
///
/// let mut local = StateHasher::new(7);
/// let mut remote = StateHasher::new(7);
/// for tick in 1..=3u64 {
///     local.advance_tick(Tick(tick), &[tick as u8], &[]);
///     remote.advance_tick(Tick(tick), &[tick as u8], &[]);
/// }
/// assert!(compare_hash_ladders(local.history(), remote.history()).is_none());
/// ```
pub fn compare_hash_ladders(
    local: &[HashEntry],
    remote: &[HashEntry],
) -> Option<LadderDivergence> {
    let common = local.len().min(remote.len());
    for idx in 0..common {
        let l = &local[idx];
        let r = &remote[idx];
        if l.tick != r.tick || l.hash != r.hash {
            return Some(LadderDivergence {
                tick: l.tick.min(r.tick),
                local: Some(l.hash),
                remote: Some(r.hash),
            });
        }
    }

    // Strict prefix: the boundary entry of the longer ladder diverges.
    match (local.get(common), remote.get(common)) {
        (Some(l), None) => Some(LadderDivergence {
            tick: l.tick,
            local: Some(l.hash),
            remote: None,
        }),
        (None, Some(r)) => Some(LadderDivergence {
            tick: r.tick,
            local: None,
            remote: Some(r.hash),
        }),
        _ => None,
    }
}

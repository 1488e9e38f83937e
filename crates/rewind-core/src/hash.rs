//! Order-sensitive mixing functions for divergence detection.
//!
//! Uses FNV-1a for fast, deterministic hashing of execution traces and
//! serialized state. These hashes are not cryptographically secure — they
//! exist to catch two executions disagreeing, not to resist an adversary.
//!
//! Three channels share the same accumulator:
//!
//! - [`order_hash`] over system names in execution order
//! - [`state_hash`] over (seed, tick, state bytes, input bytes)
//! - [`payload_hash`] over a single byte buffer
//!
//! Each is a pure, total function of its arguments. No global state may
//! influence the result; identical inputs hash identically across
//! instances, threads, and processes.

use crate::id::Tick;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed a byte slice into an FNV-1a hash state.
#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a u32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u32(hash: u64, v: u32) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Compute the execution-order hash over system names.
///
/// Folds each name's UTF-8 bytes in sequence order, with the position
/// index folded in at each boundary. Folding the position breaks
/// concatenation ambiguity (`["ab", "c"]` vs `["a", "bc"]`) and makes the
/// hash depend on order alone — never on timing — so hash equality
/// certifies scheduling-order determinism independent of performance
/// variance.
///
/// Returns the FNV offset basis (non-zero) for an empty sequence.
///
/// # Examples
///
/// ```
/// use rewind_core::hash::order_hash;
///
/// let ab = order_hash(["physics", "ai"]);
/// let ba = order_hash(["ai", "physics"]);
/// assert_ne!(ab, ba);
/// assert_eq!(ab, order_hash(["physics", "ai"]));
/// ```
pub fn order_hash<'a, I>(names: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hash = FNV_OFFSET;
    for (position, name) in names.into_iter().enumerate() {
        // Fold in the position at each name boundary
        hash = fnv1a_u32(hash, position as u32);
        hash = fnv1a_bytes(hash, name.as_bytes());
    }
    hash
}

/// Compute the per-tick content hash over serialized world and input bytes.
///
/// Folds seed, tick, then the length-prefixed state bytes and
/// length-prefixed input bytes, in that fixed order. The seed salts the
/// ladder so two independently-seeded hashers are never confused with each
/// other; identical seeds let two genuinely parallel runs be compared
/// directly.
///
/// # Examples
///
/// ```
/// use rewind_core::hash::state_hash;
/// use rewind_core::Tick;
///
/// let a = state_hash(42, Tick(1), &[1, 2, 3], &[4, 5]);
/// let b = state_hash(42, Tick(1), &[1, 2, 3], &[4, 5]);
/// assert_eq!(a, b);
/// assert_ne!(a, state_hash(43, Tick(1), &[1, 2, 3], &[4, 5]));
/// ```
pub fn state_hash(seed: u64, tick: Tick, state: &[u8], input: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u64(hash, seed);
    hash = fnv1a_u64(hash, tick.0);
    hash = fnv1a_u64(hash, state.len() as u64);
    hash = fnv1a_bytes(hash, state);
    hash = fnv1a_u64(hash, input.len() as u64);
    hash = fnv1a_bytes(hash, input);
    hash
}

/// Compute a content hash over a single opaque byte buffer.
///
/// Used for snapshot and save-payload hashes, where the tick and seed are
/// carried alongside the hash rather than mixed into it.
///
/// Returns the FNV offset basis (non-zero) for an empty buffer.
pub fn payload_hash(bytes: &[u8]) -> u64 {
    fnv1a_bytes(FNV_OFFSET, bytes)
}

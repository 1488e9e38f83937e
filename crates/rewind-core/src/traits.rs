//! The world serialization boundary.

/// Opaque byte-level access to simulation world state.
///
/// The determinism toolkit never inspects world contents — it hashes,
/// snapshots, saves, and restores the bytes this trait produces. The
/// contract that makes the rest of the system meaningful: `serialize()`
/// must be a pure function of the logical world state (no timestamps,
/// no pointer values, no hash-map iteration order), and
/// `deserialize(serialize())` must reconstruct a world whose future ticks
/// are identical to the original's.
pub trait WorldState {
    /// Serialize the complete world state to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Restore the world from previously serialized bytes.
    ///
    /// Returns `false` if the bytes cannot be applied (wrong shape,
    /// truncated). On `false` the world may be partially modified and the
    /// caller should treat it as unusable until the next successful
    /// restore.
    fn deserialize(&mut self, bytes: &[u8]) -> bool;
}

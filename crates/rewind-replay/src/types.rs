//! Data types for replay recording and playback.

use rewind_core::Tick;

/// A single tick's worth of recorded data.
///
/// A frame's identity is its tick: re-injecting input at an existing tick
/// overwrites the frame in place rather than creating a sibling. The
/// embedded `state_hash` is the content hash observed when the frame was
/// recorded live, letting a later replay verify it reproduced the same
/// state.
///
/// # Examples
///
/// ```
/// use rewind_replay::ReplayFrame;
/// use rewind_core::Tick;
///
/// let frame = ReplayFrame {
///     tick: Tick(1),
///     input_data: vec![4, 5],
///     state_hash: 0xDEAD,
///     is_save_point: false,
/// };
/// assert_eq!(frame.tick, Tick(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayFrame {
    /// The tick this frame belongs to.
    pub tick: Tick,
    /// Input bytes applied during this tick. Empty for ticks that received
    /// no input.
    pub input_data: Vec<u8>,
    /// Content hash recorded at this tick (0 when unknown, e.g. for
    /// injected frames).
    pub state_hash: u64,
    /// Whether an on-disk save was written at this tick.
    pub is_save_point: bool,
}

/// A notable point on a replay timeline, for UI presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A frame flagged as corresponding to an on-disk save.
    SavePoint {
        /// The save's tick.
        tick: Tick,
    },
    /// A frame carrying input bytes.
    Input {
        /// The input's tick.
        tick: Tick,
        /// Number of input bytes at this tick.
        bytes: usize,
    },
}

/// Result of comparing two replay frame sequences.
///
/// `diverge_tick` is the first tick at which the sequences disagree, or
/// `None` when they are identical. A strict-prefix relationship counts as
/// divergence at the boundary tick — length mismatch is disagreement, not
/// equality by omission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComparisonResult {
    /// Earliest tick present in either sequence.
    pub first_tick: Option<Tick>,
    /// Latest tick present in either sequence.
    pub last_tick: Option<Tick>,
    /// First tick at which the sequences disagree.
    pub diverge_tick: Option<Tick>,
    /// `matched / max(len_a, len_b) * 100`. 100.0 when both are empty.
    pub match_percentage: f64,
}

impl ComparisonResult {
    /// Whether the sequences matched completely.
    pub fn is_match(&self) -> bool {
        self.diverge_tick.is_none()
    }
}

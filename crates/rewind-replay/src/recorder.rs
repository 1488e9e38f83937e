//! The in-memory replay sequence and its debugging operations.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::ops::RangeInclusive;
use std::path::Path;

use rewind_core::Tick;

use crate::error::ReplayError;
use crate::reader::ReplayReader;
use crate::types::{ComparisonResult, ReplayFrame, TimelineEvent};
use crate::writer::ReplayWriter;

/// Owns an ordered-by-tick sequence of replay frames.
///
/// Frames enter the sequence three ways: live recording
/// ([`record_frame`](ReplayRecorder::record_frame)), wholesale load from a
/// replay file ([`load_replay`](ReplayRecorder::load_replay)), and manual
/// injection ([`inject_input`](ReplayRecorder::inject_input)). The
/// sequence is always kept tick-sorted, which makes range views and
/// injection-point lookup binary searches.
///
/// # Examples
///
/// ```
/// use rewind_replay::ReplayRecorder;
/// use rewind_core::Tick;
///
/// let mut recorder = ReplayRecorder::new();
/// recorder.record_frame(Tick(1), vec![], 0xAA, false);
/// recorder.record_frame(Tick(2), vec![], 0xBB, false);
/// recorder.inject_input(Tick(2), vec![7]);
///
/// assert_eq!(recorder.frames().len(), 2);
/// assert!(recorder.has_injected_inputs());
/// ```
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    frames: Vec<ReplayFrame>,
}

impl ReplayRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a live-recorded frame.
    ///
    /// Ticks must be strictly increasing within a recording; an
    /// out-of-order tick is ignored with a warning rather than corrupting
    /// the sort invariant.
    pub fn record_frame(&mut self, tick: Tick, input_data: Vec<u8>, state_hash: u64, is_save_point: bool) {
        if let Some(last) = self.frames.last() {
            if tick <= last.tick {
                log::warn!(
                    "record_frame({tick}) out of order (last recorded {}); ignored",
                    last.tick
                );
                return;
            }
        }
        self.frames.push(ReplayFrame {
            tick,
            input_data,
            state_hash,
            is_save_point,
        });
    }

    /// Load a replay file, replacing the in-memory sequence.
    ///
    /// Returns `false` on any open/parse failure, leaving the existing
    /// sequence untouched — the whole file is decoded before anything is
    /// swapped in. A file whose frames are not tick-sorted is rejected
    /// the same way.
    pub fn load_replay(&mut self, path: &Path) -> bool {
        match Self::read_frames(path) {
            Ok(frames) => {
                self.frames = frames;
                true
            }
            Err(e) => {
                log::warn!("failed to load replay {}: {e}", path.display());
                false
            }
        }
    }

    fn read_frames(path: &Path) -> Result<Vec<ReplayFrame>, ReplayError> {
        let file = File::open(path)?;
        let mut reader = ReplayReader::open(BufReader::new(file))?;

        let mut frames: Vec<ReplayFrame> = Vec::new();
        while let Some(frame) = reader.next_frame()? {
            if let Some(last) = frames.last() {
                if frame.tick <= last.tick {
                    return Err(ReplayError::Malformed {
                        detail: format!(
                            "frames out of order: tick {} follows tick {}",
                            frame.tick, last.tick
                        ),
                    });
                }
            }
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Persist the current sequence to a replay file.
    pub fn save_replay(&self, path: &Path) -> Result<(), ReplayError> {
        let file = File::create(path)?;
        let mut writer = ReplayWriter::new(BufWriter::new(file))?;
        for frame in &self.frames {
            writer.write_frame(frame)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The tick-ordered frame sequence.
    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    /// Force alternate input at a historical tick.
    ///
    /// If a frame at `tick` exists, its input is overwritten in place
    /// (hash and save-point flag are preserved — the frame's identity is
    /// its tick). Otherwise a new frame with a defaulted hash is inserted
    /// at the tick-sorted position. This is how a debugger explores
    /// "what if" branches from a recorded session.
    pub fn inject_input(&mut self, tick: Tick, input_data: Vec<u8>) {
        let idx = self.frames.partition_point(|f| f.tick < tick);
        match self.frames.get_mut(idx) {
            Some(frame) if frame.tick == tick => {
                frame.input_data = input_data;
            }
            _ => {
                self.frames.insert(
                    idx,
                    ReplayFrame {
                        tick,
                        input_data,
                        state_hash: 0,
                        is_save_point: false,
                    },
                );
            }
        }
    }

    /// Copy every frame with tick ≤ `tick` — the seed of a new,
    /// independent replay diverging from that point.
    pub fn branch_at(&self, tick: Tick) -> Vec<ReplayFrame> {
        let end = self.frames.partition_point(|f| f.tick <= tick);
        self.frames[..end].to_vec()
    }

    /// Whether any frame carries non-empty input bytes.
    ///
    /// Tooling uses this to warn that a replay has been hand-modified and
    /// is no longer a pure recording.
    pub fn has_injected_inputs(&self) -> bool {
        self.frames.iter().any(|f| !f.input_data.is_empty())
    }

    /// Frames whose ticks fall within `range`, as a contiguous view.
    ///
    /// An empty or inverted range yields an empty view.
    pub fn get_input_frames(&self, range: RangeInclusive<Tick>) -> &[ReplayFrame] {
        if range.start() > range.end() {
            return &[];
        }
        let start = self.frames.partition_point(|f| f.tick < *range.start());
        let end = self.frames.partition_point(|f| f.tick <= *range.end());
        &self.frames[start..end]
    }

    /// Build a tick-ordered event timeline for UI presentation.
    ///
    /// Save points and input-carrying frames become events; a frame that
    /// is both yields its save point first.
    pub fn build_event_timeline(&self) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        for frame in &self.frames {
            if frame.is_save_point {
                events.push(TimelineEvent::SavePoint { tick: frame.tick });
            }
            if !frame.input_data.is_empty() {
                events.push(TimelineEvent::Input {
                    tick: frame.tick,
                    bytes: frame.input_data.len(),
                });
            }
        }
        events
    }

    /// Compare this sequence against another, index-aligned.
    ///
    /// The first index where tick, hash, or input disagree sets
    /// `diverge_tick`. A strict prefix diverges at the boundary tick of
    /// the longer sequence — length mismatch is divergence, not
    /// equality by omission. `match_percentage` is
    /// `matched / max(len_a, len_b) * 100`.
    pub fn compare_with(&self, other: &[ReplayFrame]) -> ComparisonResult {
        compare_frames(&self.frames, other)
    }

    /// Flag the frame at `tick` as corresponding to an on-disk save.
    ///
    /// Returns `false` if no frame exists at that exact tick.
    pub fn mark_save_point(&mut self, tick: Tick) -> bool {
        let idx = self.frames.partition_point(|f| f.tick < tick);
        match self.frames.get_mut(idx) {
            Some(frame) if frame.tick == tick => {
                frame.is_save_point = true;
                true
            }
            _ => false,
        }
    }

    /// Drop every frame with tick strictly greater than `tick`.
    ///
    /// Used when a rollback abandons the recorded future: the timeline
    /// past the rollback point no longer describes what will happen.
    pub fn truncate_after(&mut self, tick: Tick) {
        let keep = self.frames.partition_point(|f| f.tick <= tick);
        self.frames.truncate(keep);
    }

    /// Tick of the last recorded frame.
    pub fn last_tick(&self) -> Option<Tick> {
        self.frames.last().map(|f| f.tick)
    }

    /// Number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop all frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Index-aligned comparison of two frame sequences (see
/// [`ReplayRecorder::compare_with`]).
pub fn compare_frames(a: &[ReplayFrame], b: &[ReplayFrame]) -> ComparisonResult {
    let first_tick = match (a.first(), b.first()) {
        (Some(x), Some(y)) => Some(x.tick.min(y.tick)),
        (Some(x), None) => Some(x.tick),
        (None, Some(y)) => Some(y.tick),
        (None, None) => None,
    };
    let last_tick = match (a.last(), b.last()) {
        (Some(x), Some(y)) => Some(x.tick.max(y.tick)),
        (Some(x), None) => Some(x.tick),
        (None, Some(y)) => Some(y.tick),
        (None, None) => None,
    };

    let common = a.len().min(b.len());
    let longest = a.len().max(b.len());

    let mut matched = common;
    let mut diverge_tick = None;
    for idx in 0..common {
        let (fa, fb) = (&a[idx], &b[idx]);
        if fa.tick != fb.tick || fa.state_hash != fb.state_hash || fa.input_data != fb.input_data {
            matched = idx;
            diverge_tick = Some(fa.tick.min(fb.tick));
            break;
        }
    }

    // Strict prefix: the longer sequence's boundary tick is the divergence.
    if diverge_tick.is_none() && a.len() != b.len() {
        let boundary = if a.len() > b.len() { &a[common] } else { &b[common] };
        diverge_tick = Some(boundary.tick);
    }

    let match_percentage = if longest == 0 {
        100.0
    } else {
        matched as f64 / longest as f64 * 100.0
    };

    ComparisonResult {
        first_tick,
        last_tick,
        diverge_tick,
        match_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tick: u64, input: Vec<u8>, hash: u64) -> ReplayFrame {
        ReplayFrame {
            tick: Tick(tick),
            input_data: input,
            state_hash: hash,
            is_save_point: false,
        }
    }

    fn recorded(ticks: std::ops::Range<u64>) -> ReplayRecorder {
        let mut recorder = ReplayRecorder::new();
        for tick in ticks {
            recorder.record_frame(Tick(tick), vec![], tick.wrapping_mul(17), false);
        }
        recorder
    }

    // ── Recording ───────────────────────────────────────────────

    #[test]
    fn record_frame_appends_in_order() {
        let recorder = recorded(1..4);
        let ticks: Vec<_> = recorder.frames().iter().map(|f| f.tick.0).collect();
        assert_eq!(ticks, [1, 2, 3]);
    }

    #[test]
    fn out_of_order_record_is_ignored() {
        let mut recorder = recorded(1..4);
        recorder.record_frame(Tick(2), vec![9], 0, false);
        assert_eq!(recorder.len(), 3);
        assert!(recorder.frames()[1].input_data.is_empty());
    }

    // ── Injection ───────────────────────────────────────────────

    #[test]
    fn inject_overwrites_existing_tick_in_place() {
        let mut recorder = recorded(1..6);
        recorder.inject_input(Tick(3), vec![1]);
        recorder.inject_input(Tick(3), vec![2]);

        assert_eq!(recorder.len(), 5);
        let at_3: Vec<_> = recorder
            .frames()
            .iter()
            .filter(|f| f.tick == Tick(3))
            .collect();
        assert_eq!(at_3.len(), 1);
        assert_eq!(at_3[0].input_data, vec![2]);
        // Hash recorded live is preserved across overwrite.
        assert_eq!(at_3[0].state_hash, 3 * 17);
    }

    #[test]
    fn inject_at_missing_tick_inserts_sorted() {
        let mut recorder = ReplayRecorder::new();
        recorder.record_frame(Tick(1), vec![], 0, false);
        recorder.record_frame(Tick(5), vec![], 0, false);

        recorder.inject_input(Tick(3), vec![7]);

        let ticks: Vec<_> = recorder.frames().iter().map(|f| f.tick.0).collect();
        assert_eq!(ticks, [1, 3, 5]);
        let injected = &recorder.frames()[1];
        assert_eq!(injected.state_hash, 0);
        assert!(!injected.is_save_point);
    }

    #[test]
    fn inject_into_empty_sequence() {
        let mut recorder = ReplayRecorder::new();
        recorder.inject_input(Tick(10), vec![1]);
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.frames()[0].tick, Tick(10));
    }

    #[test]
    fn has_injected_inputs_tracks_nonempty_input() {
        let mut recorder = recorded(1..4);
        assert!(!recorder.has_injected_inputs());
        recorder.inject_input(Tick(2), vec![1]);
        assert!(recorder.has_injected_inputs());
    }

    // ── Branching and views ─────────────────────────────────────

    #[test]
    fn branch_at_returns_prefix_inclusive() {
        let recorder = recorded(1..11);
        let branch = recorder.branch_at(Tick(5));
        let ticks: Vec<_> = branch.iter().map(|f| f.tick.0).collect();
        assert_eq!(ticks, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn branch_before_first_tick_is_empty() {
        let recorder = recorded(5..8);
        assert!(recorder.branch_at(Tick(4)).is_empty());
    }

    #[test]
    fn get_input_frames_range_view() {
        let recorder = recorded(1..11);
        let view = recorder.get_input_frames(Tick(3)..=Tick(6));
        let ticks: Vec<_> = view.iter().map(|f| f.tick.0).collect();
        assert_eq!(ticks, [3, 4, 5, 6]);
    }

    #[test]
    fn event_timeline_orders_save_points_and_inputs() {
        let mut recorder = ReplayRecorder::new();
        recorder.record_frame(Tick(1), vec![], 0, false);
        recorder.record_frame(Tick(2), vec![], 0, true);
        recorder.record_frame(Tick(3), vec![9, 9], 0, false);

        let timeline = recorder.build_event_timeline();
        assert_eq!(
            timeline,
            vec![
                TimelineEvent::SavePoint { tick: Tick(2) },
                TimelineEvent::Input { tick: Tick(3), bytes: 2 },
            ]
        );
    }

    #[test]
    fn mark_save_point_flags_exact_tick_only() {
        let mut recorder = recorded(1..5);
        assert!(recorder.mark_save_point(Tick(3)));
        assert!(!recorder.mark_save_point(Tick(9)));
        assert!(recorder.frames()[2].is_save_point);
        assert!(!recorder.frames()[1].is_save_point);
    }

    #[test]
    fn truncate_after_drops_strictly_later_frames() {
        let mut recorder = recorded(1..11);
        recorder.truncate_after(Tick(6));
        let ticks: Vec<_> = recorder.frames().iter().map(|f| f.tick.0).collect();
        assert_eq!(ticks, [1, 2, 3, 4, 5, 6]);

        // Recording resumes past the truncation point.
        recorder.record_frame(Tick(7), vec![], 0, false);
        assert_eq!(recorder.last_tick(), Some(Tick(7)));
    }

    // ── Comparison ──────────────────────────────────────────────

    #[test]
    fn identical_sequences_fully_match() {
        let a = recorded(0..30);
        let b = recorded(0..30);
        let result = a.compare_with(b.frames());
        assert!(result.is_match());
        assert_eq!(result.match_percentage, 100.0);
        assert_eq!(result.first_tick, Some(Tick(0)));
        assert_eq!(result.last_tick, Some(Tick(29)));
    }

    #[test]
    fn divergence_at_tick_25_reports_25_of_n() {
        // Ticks 0..=24 identical, tick 25 differs: divergeTick == 25 and
        // matchPercentage == 25/N * 100 for N = 30 frames.
        let a = recorded(0..30);
        let mut b_frames: Vec<_> = a.frames().to_vec();
        b_frames[25].state_hash ^= 1;

        let result = a.compare_with(&b_frames);
        assert_eq!(result.diverge_tick, Some(Tick(25)));
        assert!((result.match_percentage - 25.0 / 30.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn input_difference_is_divergence() {
        let a = recorded(0..10);
        let mut b_frames: Vec<_> = a.frames().to_vec();
        b_frames[4].input_data = vec![0xFF];

        let result = a.compare_with(&b_frames);
        assert_eq!(result.diverge_tick, Some(Tick(4)));
    }

    #[test]
    fn strict_prefix_diverges_at_boundary_tick() {
        let a = recorded(0..10);
        let b = recorded(0..7);
        let result = a.compare_with(b.frames());
        assert_eq!(result.diverge_tick, Some(Tick(7)));
        assert!((result.match_percentage - 70.0).abs() < 1e-9);
        assert_eq!(result.last_tick, Some(Tick(9)));
    }

    #[test]
    fn empty_sequences_match_trivially() {
        let a = ReplayRecorder::new();
        let result = a.compare_with(&[]);
        assert!(result.is_match());
        assert_eq!(result.match_percentage, 100.0);
        assert!(result.first_tick.is_none());
    }

    // ── File round-trip ─────────────────────────────────────────

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.rwnd");

        let mut recorder = ReplayRecorder::new();
        recorder.record_frame(Tick(1), vec![1], 0xA, false);
        recorder.record_frame(Tick(2), vec![], 0xB, true);
        recorder.save_replay(&path).unwrap();

        let mut loaded = ReplayRecorder::new();
        assert!(loaded.load_replay(&path));
        assert_eq!(loaded.frames(), recorder.frames());
    }

    #[test]
    fn load_failure_leaves_sequence_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.rwnd");
        std::fs::write(&path, b"not a replay").unwrap();

        let mut recorder = recorded(1..4);
        assert!(!recorder.load_replay(&path));
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn load_missing_file_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = ReplayRecorder::new();
        assert!(!recorder.load_replay(&dir.path().join("absent.rwnd")));
    }

    #[test]
    fn load_rejects_out_of_order_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unsorted.rwnd");

        // Hand-write a file with frames 2 then 1.
        let file = File::create(&path).unwrap();
        let mut writer = ReplayWriter::new(BufWriter::new(file)).unwrap();
        writer.write_frame(&frame(2, vec![], 0)).unwrap();
        writer.write_frame(&frame(1, vec![], 0)).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut recorder = ReplayRecorder::new();
        assert!(!recorder.load_replay(&path));
        assert!(recorder.is_empty());
    }
}

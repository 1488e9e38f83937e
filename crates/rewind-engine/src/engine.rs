//! The determinism orchestrator.

use std::path::Path;

use rewind_core::hash::payload_hash;
use rewind_core::Tick;
use rewind_replay::{ReplayFrame, ReplayRecorder};
use rewind_save::{SaveError, SaveFile};
use rewind_trace::{JobTracer, StateHasher};

use crate::clock::TickClock;
use crate::config::{ConfigError, EngineConfig};
use crate::context::{Simulation, TickContext};
use crate::snapshots::SnapshotManager;

/// Where the engine currently is in the rollback lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Simulation advancing normally; every tick feeds the instruments.
    Live,
    /// World restored to an earlier snapshot, about to resimulate.
    RolledBack,
    /// Resimulating forward to a target tick for comparison.
    Verifying,
}

/// What one live tick produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// The tick that was executed.
    pub tick: Tick,
    /// Content hash of the post-tick state plus applied input.
    pub state_hash: u64,
    /// Order hash of the systems that executed.
    pub order_hash: u64,
}

/// Owns a world and the instruments watching it, and composes them into
/// end-to-end determinism guarantees.
///
/// Each live [`advance_tick`](Engine::advance_tick) flows one direction:
/// the world steps under tracing, its serialized bytes feed the
/// [`StateHasher`](rewind_trace::StateHasher) and the
/// [`SnapshotManager`], and the tick's input is recorded into the
/// [`ReplayRecorder`](rewind_replay::ReplayRecorder). The verification
/// algorithms then replay that record against fresh executions.
///
/// Rollback abandons the recorded future: every history is truncated to
/// the rollback tick so all of them stay tick-sorted and mutually
/// consistent. Resimulated ticks (the verification paths) never append to
/// any history.
///
/// Single-threaded by design — all mutation is `&mut self`, and the
/// verification algorithms are synchronous, blocking debugging tools.
///
/// # Examples
///
/// ```
/// use rewind_engine::{Engine, EngineConfig, Simulation, TickContext};
/// use rewind_core::WorldState;
///
/// struct Counter(u64);
///
/// impl WorldState for Counter {
///     fn serialize(&self) -> Vec<u8> {
///         self.0.to_le_bytes().to_vec()
///     }
///     fn deserialize(&mut self, bytes: &[u8]) -> bool {
///         match bytes.try_into() {
///             Ok(arr) => {
///                 self.0 = u64::from_le_bytes(arr);
///                 true
///             }
///             Err(_) => false,
///         }
///     }
/// }
///
/// impl Simulation for Counter {
///     fn step(&mut self, ctx: &mut TickContext<'_>) {
///         ctx.system("count", |ctx| {
///             self.0 = self.0.wrapping_add(ctx.tick().0);
///         });
///     }
/// }
///
/// let mut engine = Engine::new(Counter(0), EngineConfig::default()).unwrap();
/// for _ in 0..10 {
///     engine.advance_tick(&[]);
/// }
/// assert!(engine.rollback_and_verify(rewind_core::Tick(5), rewind_core::Tick(10)));
/// ```
pub struct Engine<W: Simulation> {
    world: W,
    clock: TickClock,
    tracer: JobTracer,
    hasher: StateHasher,
    snapshots: SnapshotManager,
    recorder: ReplayRecorder,
    state: EngineState,
    config: EngineConfig,
}

impl<W: Simulation> Engine<W> {
    /// Create an engine around `world`, validating the configuration.
    pub fn new(world: W, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world,
            clock: TickClock::new(config.tick_rate, config.pacing),
            tracer: JobTracer::new(),
            hasher: StateHasher::new(config.seed as u64),
            snapshots: SnapshotManager::new(config.snapshot_capacity),
            recorder: ReplayRecorder::new(),
            state: EngineState::Live,
            config,
        })
    }

    // ── Live path ────────────────────────────────────────────────

    /// Execute one live tick: step the world under tracing, then feed
    /// every instrument.
    pub fn advance_tick(&mut self, input: &[u8]) -> TickReport {
        self.state = EngineState::Live;

        let tick = self.clock.advance();
        let dt = self.clock.dt();
        self.tracer.begin_tick(tick);
        let mut ctx = TickContext::new(tick, dt, input, &mut self.tracer);
        self.world.step(&mut ctx);
        let order_hash = self.tracer.end_tick();

        let state_bytes = self.world.serialize();
        let state_hash = self.hasher.advance_tick(tick, &state_bytes, input);
        self.snapshots
            .push_snapshot(SnapshotManager::take_snapshot(tick, state_bytes));
        self.recorder
            .record_frame(tick, input.to_vec(), state_hash, false);

        TickReport {
            tick,
            state_hash,
            order_hash,
        }
    }

    /// Step the world one tick without touching any history. Used by the
    /// verification paths; order tracing goes to a throwaway tracer so the
    /// real history stays tick-sorted.
    fn resimulate_tick(&mut self, input: &[u8]) {
        let tick = self.clock.advance();
        let dt = self.clock.dt();
        let mut scratch = JobTracer::new();
        scratch.begin_tick(tick);
        let mut ctx = TickContext::new(tick, dt, input, &mut scratch);
        self.world.step(&mut ctx);
        scratch.end_tick();
    }

    // ── Rollback ─────────────────────────────────────────────────

    /// Restore the world to the exact snapshot at `tick`.
    ///
    /// Fails (returning `false`, staying in the current state) if no
    /// snapshot exists at that tick or the world rejects the bytes. On
    /// success the clock rewinds, every history is truncated to `tick`
    /// (the recorded future no longer describes what will happen), and
    /// the engine enters [`EngineState::RolledBack`].
    ///
    /// This is the only place this subsystem mutates the world.
    pub fn rollback_to_tick(&mut self, tick: Tick) -> bool {
        let Some(snapshot) = self.snapshots.snapshot_at_tick(tick) else {
            log::warn!("rollback_to_tick({tick}): no snapshot at that tick");
            return false;
        };
        if !self.world.deserialize(&snapshot.ecs_data) {
            log::warn!("rollback_to_tick({tick}): world rejected snapshot bytes");
            return false;
        }

        self.clock.set_tick(tick);
        self.tracer.truncate_after(tick);
        self.hasher.truncate_after(tick);
        self.snapshots.truncate_after(tick);
        self.recorder.truncate_after(tick);
        self.state = EngineState::RolledBack;
        true
    }

    /// Roll back to `snapshot_tick`, resimulate to `target_tick`
    /// re-applying the recorded inputs, and compare content hashes
    /// bit-for-bit.
    ///
    /// Requires `snapshot_tick < target_tick` and stored snapshots at
    /// both ticks; any missing piece or hash mismatch collapses to
    /// `false`. Frame pacing is disabled for the resimulation and
    /// restored afterwards. This is the core regression-test primitive:
    /// can consistent state always be recovered by rollback-and-resimulate?
    pub fn rollback_and_verify(&mut self, snapshot_tick: Tick, target_tick: Tick) -> bool {
        if snapshot_tick >= target_tick {
            log::warn!(
                "rollback_and_verify: snapshot tick {snapshot_tick} must precede target {target_tick}"
            );
            return false;
        }
        let Some(expected) = self
            .snapshots
            .snapshot_at_tick(target_tick)
            .map(|s| s.state_hash)
        else {
            log::warn!("rollback_and_verify: no snapshot at target tick {target_tick}");
            return false;
        };

        // Inputs for (snapshot_tick, target_tick], captured before the
        // rollback truncates the recording.
        let inputs: Vec<(Tick, Vec<u8>)> = self
            .recorder
            .get_input_frames(snapshot_tick.next()..=target_tick)
            .iter()
            .map(|f| (f.tick, f.input_data.clone()))
            .collect();

        if !self.rollback_to_tick(snapshot_tick) {
            return false;
        }

        self.state = EngineState::Verifying;
        let was_pacing = self.clock.pacing();
        self.clock.set_pacing(false);

        let mut next_input = 0;
        while self.clock.current() < target_tick {
            let tick = self.clock.current().next();
            let input: &[u8] = match inputs.get(next_input) {
                Some((input_tick, data)) if *input_tick == tick => {
                    next_input += 1;
                    data
                }
                _ => &[],
            };
            self.resimulate_tick(input);
        }

        let fresh = payload_hash(&self.world.serialize());
        self.clock.set_pacing(was_pacing);
        self.state = EngineState::Live;

        if fresh != expected {
            log::warn!(
                "rollback verification failed at tick {target_tick}: \
                 expected {expected:#018x}, got {fresh:#018x}"
            );
            return false;
        }
        true
    }

    // ── Save/replay composition ──────────────────────────────────

    /// Write the current world to a save container and flag the
    /// corresponding replay frame as a save point.
    pub fn save_game(&mut self, path: &Path, metadata: &str) -> Result<(), SaveError> {
        let tick = self.clock.current();
        let bytes = self.world.serialize();
        rewind_save::save(
            path,
            tick,
            self.clock.tick_rate(),
            self.config.seed,
            &bytes,
            metadata,
        )?;
        if !self.recorder.mark_save_point(tick) {
            log::debug!("save at tick {tick} has no replay frame to flag");
        }
        Ok(())
    }

    /// Restore a save, load a replay, and drive every frame recorded
    /// strictly after the save point through the simulation.
    ///
    /// Returns `false` if the save or replay cannot be loaded, the world
    /// rejects the save bytes, or the replay contributes no frame past
    /// the save tick (a replay ending at or before the save point
    /// represents no progress).
    pub fn replay_from_save(&mut self, save_path: &Path, replay_path: &Path) -> bool {
        let save = match SaveFile::load(save_path) {
            Ok(save) => save,
            Err(e) => {
                log::warn!("replay_from_save: loading {} failed: {e}", save_path.display());
                return false;
            }
        };
        if !self.world.deserialize(save.ecs_data()) {
            log::warn!("replay_from_save: world rejected save payload");
            return false;
        }
        let save_tick = save.header().save_tick;
        self.clock.set_tick(save_tick);

        if !self.recorder.load_replay(replay_path) {
            return false;
        }
        let frames: Vec<ReplayFrame> = self
            .recorder
            .frames()
            .iter()
            .filter(|f| f.tick > save_tick)
            .cloned()
            .collect();

        self.state = EngineState::Verifying;
        let was_pacing = self.clock.pacing();
        self.clock.set_pacing(false);

        let mut applied = 0u64;
        for frame in &frames {
            // Gap ticks between frames ran with no input when recorded.
            while self.clock.current().next() < frame.tick {
                self.resimulate_tick(&[]);
            }
            self.resimulate_tick(&frame.input_data);
            applied += 1;
        }

        self.clock.set_pacing(was_pacing);
        self.state = EngineState::Live;

        if applied == 0 {
            log::warn!("replay_from_save: replay has no frames beyond save tick {save_tick}");
            return false;
        }
        true
    }

    /// Prove that serialize → save → load → deserialize preserves enough
    /// information to reproduce identical future ticks.
    ///
    /// Captures the current state, resimulates `extra_ticks` to obtain
    /// the expected hash, rewinds, round-trips through a save at
    /// `tmp_path`, resimulates the same ticks again, and compares. The
    /// engine is returned to its starting state and tick regardless of
    /// outcome. Isolates the save pipeline from rollback correctness.
    pub fn verify_save_load_determinism(&mut self, tmp_path: &Path, extra_ticks: u64) -> bool {
        if extra_ticks == 0 {
            log::warn!("verify_save_load_determinism: extra_ticks must be at least 1");
            return false;
        }

        let start_tick = self.clock.current();
        let start_state = self.world.serialize();
        let was_pacing = self.clock.pacing();
        self.clock.set_pacing(false);
        self.state = EngineState::Verifying;

        // First pass: the expected future, straight from memory.
        for _ in 0..extra_ticks {
            self.resimulate_tick(&[]);
        }
        let expected = payload_hash(&self.world.serialize());

        // Second pass: the same future, via the save container.
        let actual = self.saved_future_hash(tmp_path, start_tick, &start_state, extra_ticks);

        // Leave the engine where it started regardless of outcome.
        let restored = self.world.deserialize(&start_state);
        self.clock.set_tick(start_tick);
        self.clock.set_pacing(was_pacing);
        self.state = EngineState::Live;

        match actual {
            Some(actual) if restored => {
                if actual != expected {
                    log::warn!(
                        "save/load determinism failed: expected {expected:#018x}, \
                         got {actual:#018x} after {extra_ticks} ticks"
                    );
                }
                actual == expected
            }
            _ => false,
        }
    }

    /// Rewind to the captured state, round-trip it through a save file,
    /// resimulate, and hash. `None` on any failure along the chain.
    fn saved_future_hash(
        &mut self,
        tmp_path: &Path,
        start_tick: Tick,
        start_state: &[u8],
        extra_ticks: u64,
    ) -> Option<u64> {
        if !self.world.deserialize(start_state) {
            log::warn!("verify_save_load_determinism: world rejected its own state");
            return None;
        }
        self.clock.set_tick(start_tick);

        if let Err(e) = rewind_save::save(
            tmp_path,
            start_tick,
            self.clock.tick_rate(),
            self.config.seed,
            start_state,
            "save/load determinism check",
        ) {
            log::warn!("verify_save_load_determinism: save failed: {e}");
            return None;
        }
        let loaded = match SaveFile::load(tmp_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::warn!("verify_save_load_determinism: reload failed: {e}");
                return None;
            }
        };
        if !self.world.deserialize(loaded.ecs_data()) {
            log::warn!("verify_save_load_determinism: world rejected reloaded payload");
            return None;
        }
        self.clock.set_tick(loaded.header().save_tick);

        for _ in 0..extra_ticks {
            self.resimulate_tick(&[]);
        }
        Some(payload_hash(&self.world.serialize()))
    }

    // ── Inspection ───────────────────────────────────────────────

    /// Force alternate input at a historical tick (see
    /// [`ReplayRecorder::inject_input`](rewind_replay::ReplayRecorder::inject_input)).
    ///
    /// Together with [`rollback_to_tick`](Engine::rollback_to_tick), the
    /// only mutation inspection clients are allowed.
    pub fn inject_input(&mut self, tick: Tick, input: Vec<u8>) {
        self.recorder.inject_input(tick, input);
    }

    /// The world being driven.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// The execution-order trace history.
    pub fn tracer(&self) -> &JobTracer {
        &self.tracer
    }

    /// The content hash ladder.
    pub fn hasher(&self) -> &StateHasher {
        &self.hasher
    }

    /// The rollback snapshot store.
    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshots
    }

    /// The replay recording.
    pub fn recorder(&self) -> &ReplayRecorder {
        &self.recorder
    }

    /// The current tick.
    pub fn current_tick(&self) -> Tick {
        self.clock.current()
    }

    /// Where the engine is in the rollback lifecycle.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<W: Simulation> std::fmt::Debug for Engine<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("current_tick", &self.clock.current())
            .field("state", &self.state)
            .field("snapshots", &self.snapshots.len())
            .field("frames", &self.recorder.len())
            .finish()
    }
}

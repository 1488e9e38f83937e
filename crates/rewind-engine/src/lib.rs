//! Determinism orchestration engine for Rewind.
//!
//! [`Engine`] owns a world (anything implementing [`Simulation`]) together
//! with the instruments that watch it — a
//! [`JobTracer`](rewind_trace::JobTracer), a
//! [`StateHasher`](rewind_trace::StateHasher), a [`SnapshotManager`], and
//! a [`ReplayRecorder`](rewind_replay::ReplayRecorder) — and composes them
//! into end-to-end guarantees:
//!
//! - [`rollback_to_tick`](Engine::rollback_to_tick) — restore an exact
//!   earlier snapshot
//! - [`rollback_and_verify`](Engine::rollback_and_verify) — roll back,
//!   resimulate, and compare hashes bit-for-bit
//! - [`replay_from_save`](Engine::replay_from_save) — restore a save and
//!   drive the recorded inputs forward
//! - [`verify_save_load_determinism`](Engine::verify_save_load_determinism)
//!   — prove serialize→deserialize preserves future ticks
//!
//! All four are synchronous, blocking debugging tools, not hot-path
//! runtime features. Everything in this crate is single-threaded with
//! respect to its own state: `&mut self` on every mutation, no locks, no
//! async.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod context;
pub mod engine;
pub mod snapshots;

pub use clock::TickClock;
pub use config::{ConfigError, EngineConfig};
pub use context::{Simulation, TickContext};
pub use engine::{Engine, EngineState, TickReport};
pub use snapshots::{Snapshot, SnapshotManager};

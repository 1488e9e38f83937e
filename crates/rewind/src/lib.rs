//! Rewind: determinism verification and replay for fixed-step simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Rewind sub-crates. For most users, adding `rewind` as a single
//! dependency is sufficient.
//!
//! A fixed-step simulation plugs in by implementing two traits: the byte
//! boundary ([`WorldState`](types::WorldState)) and the update function
//! ([`Simulation`](engine::Simulation)). The [`Engine`](engine::Engine)
//! then hashes, traces, snapshots, and records every tick, and can answer
//! the question the toolkit exists for: did tick N produce the same
//! result twice?
//!
//! # Quick start
//!
//! ```rust
//! use rewind::prelude::*;
//!
//! // A world whose update is a pure function of (state, tick, input).
//! struct Odometer {
//!     distance: u64,
//! }
//!
//! impl WorldState for Odometer {
//!     fn serialize(&self) -> Vec<u8> {
//!         self.distance.to_le_bytes().to_vec()
//!     }
//!     fn deserialize(&mut self, bytes: &[u8]) -> bool {
//!         match bytes.try_into() {
//!             Ok(arr) => {
//!                 self.distance = u64::from_le_bytes(arr);
//!                 true
//!             }
//!             Err(_) => false,
//!         }
//!     }
//! }
//!
//! impl Simulation for Odometer {
//!     fn step(&mut self, ctx: &mut TickContext<'_>) {
//!         ctx.system("drive", |ctx| {
//!             let speed = ctx.input().first().copied().unwrap_or(1) as u64;
//!             self.distance += speed;
//!         });
//!     }
//! }
//!
//! // Drive ten ticks, then prove rollback-resimulate recovers tick 10.
//! let mut engine = Engine::new(Odometer { distance: 0 }, EngineConfig::default()).unwrap();
//! for _ in 0..10 {
//!     engine.advance_tick(&[3]);
//! }
//! assert_eq!(engine.world().distance, 30);
//! assert!(engine.rollback_and_verify(Tick(5), Tick(10)));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rewind-core` | `Tick`, `WorldState`, hash mixing functions |
//! | [`trace`] | `rewind-trace` | `JobTracer`, `StateHasher`, ladder comparison |
//! | [`replay`] | `rewind-replay` | Replay frames, recorder, binary codec |
//! | [`save`] | `rewind-save` | Save container, validation, directory scanning |
//! | [`engine`] | `rewind-engine` | `Engine`, snapshots, clock, configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and hash mixing (`rewind-core`).
pub use rewind_core as types;

/// Execution-order tracing and content hashing (`rewind-trace`).
pub use rewind_trace as trace;

/// Replay recording, injection, and branching (`rewind-replay`).
pub use rewind_replay as replay;

/// Versioned save container (`rewind-save`).
pub use rewind_save as save;

/// The determinism orchestration engine (`rewind-engine`).
pub use rewind_engine as engine;

/// The most commonly used items, re-exported for glob import.
pub mod prelude {
    pub use rewind_core::{Tick, WorldState};
    pub use rewind_engine::{
        Engine, EngineConfig, EngineState, Simulation, SnapshotManager, TickContext,
    };
    pub use rewind_replay::{ReplayFrame, ReplayRecorder};
    pub use rewind_save::{SaveFile, SaveHeader};
    pub use rewind_trace::{compare_hash_ladders, JobTracer, StateHasher};
}

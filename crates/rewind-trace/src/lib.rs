//! Execution-order tracing and per-tick content hashing.
//!
//! Two independent detection channels for determinism verification:
//!
//! - [`JobTracer`] records which systems executed in what order each tick
//!   and reduces the sequence to a single order-hash. It catches
//!   scheduling nondeterminism (a parallel job system dispatching in a
//!   different order) even when the resulting state happens to match.
//! - [`StateHasher`] reduces each tick's serialized world and input bytes
//!   to a content hash. It catches state divergence even when the
//!   schedule was identical.
//!
//! Both keep append-only, tick-sorted histories that read-only clients
//! (editor panels, comparison tooling) walk freely. Cross-peer comparison
//! hands two independently-populated hash ladders to
//! [`compare_hash_ladders`].
//!
//! Tracing must never crash the simulation it observes: recording calls
//! outside an open tick are logged and ignored.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod hasher;
pub mod ladder;
pub mod tracer;

pub use hasher::{HashEntry, StateHasher};
pub use ladder::{compare_hash_ladders, LadderDivergence};
pub use tracer::{JobTrace, JobTraceEntry, JobTracer};

//! Core types and hashing primitives for the Rewind determinism toolkit.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! [`Tick`] counter, the [`WorldState`] serialization boundary, and the
//! shared order-sensitive mixing functions every other Rewind crate hashes
//! with. Two executions agree exactly when these functions say they do,
//! so everything here must be a pure function of its byte inputs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod hash;
pub mod id;
pub mod traits;

pub use hash::{order_hash, payload_hash, state_hash};
pub use id::Tick;
pub use traits::WorldState;

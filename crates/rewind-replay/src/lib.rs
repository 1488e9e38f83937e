//! Replay recording, injection, and branching for Rewind simulations.
//!
//! Persists an ordered sequence of per-tick input frames, each carrying
//! the content hash recorded when the frame was produced, and supports the
//! debugging workflows built on top of that sequence: forcing alternate
//! inputs at historical ticks, extracting a prefix as the seed of a new
//! branch, and pinpointing where two recordings diverge.
//!
//! # Architecture
//!
//! - [`ReplayWriter`] streams frames to any `Write` sink
//! - [`ReplayReader`] plays back frames from any `Read` source
//! - [`ReplayRecorder`] owns the in-memory, tick-sorted sequence and the
//!   injection/branch/compare operations
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "RWND"] [VERSION u8]
//! [Frame 1] [Frame 2] ... [Frame N]
//! ```
//!
//! Each frame contains the tick, length-prefixed input bytes, the content
//! hash recorded at that tick, and a save-point flag.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod recorder;
pub mod types;
pub mod writer;

pub use error::ReplayError;
pub use reader::{FrameIter, ReplayReader};
pub use recorder::{compare_frames, ReplayRecorder};
pub use types::{ComparisonResult, ReplayFrame, TimelineEvent};
pub use writer::ReplayWriter;

/// Magic bytes at the start of every replay file.
pub const MAGIC: [u8; 4] = *b"RWND";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

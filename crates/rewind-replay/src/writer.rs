//! Replay recording writer.
//!
//! [`ReplayWriter`] streams frames to any `Write` sink, encoding the
//! binary replay format. The header is written immediately on construction.

use std::io::Write;

use crate::codec::{encode_frame, encode_header};
use crate::error::ReplayError;
use crate::types::ReplayFrame;

/// Writes replay data to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use rewind_replay::{ReplayFrame, ReplayReader, ReplayWriter};
/// use rewind_core::Tick;
///
/// // Write two frames to an in-memory buffer.
/// let mut buf = Vec::new();
/// let mut writer = ReplayWriter::new(&mut buf).unwrap();
/// for tick in 1..=2u64 {
///     let frame = ReplayFrame {
///         tick: Tick(tick),
///         input_data: vec![],
///         state_hash: tick,
///         is_save_point: false,
///     };
///     writer.write_frame(&frame).unwrap();
/// }
/// assert_eq!(writer.frames_written(), 2);
/// drop(writer);
///
/// // Read them back.
/// let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.next_frame().unwrap().unwrap().tick, Tick(1));
/// assert_eq!(reader.next_frame().unwrap().unwrap().tick, Tick(2));
/// assert!(reader.next_frame().unwrap().is_none());
/// ```
pub struct ReplayWriter<W: Write> {
    writer: W,
    frames_written: u64,
}

impl<W: Write> ReplayWriter<W> {
    /// Create a new replay writer, immediately writing the header.
    pub fn new(mut writer: W) -> Result<Self, ReplayError> {
        encode_header(&mut writer)?;
        Ok(Self {
            writer,
            frames_written: 0,
        })
    }

    /// Encode and write a single frame.
    pub fn write_frame(&mut self, frame: &ReplayFrame) -> Result<(), ReplayError> {
        encode_frame(&mut self.writer, frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

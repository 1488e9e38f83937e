//! Replay playback reader.
//!
//! [`ReplayReader`] reads frames from any `Read` source, decoding the
//! binary replay format. The header is validated on construction.

use std::io::Read;

use crate::codec::{decode_frame, decode_header};
use crate::error::ReplayError;
use crate::types::ReplayFrame;

/// Reads replay data from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production
/// code can use `BufReader<File>`.
pub struct ReplayReader<R: Read> {
    reader: R,
    frames_read: u64,
}

impl<R: Read> ReplayReader<R> {
    /// Open a replay stream, reading and validating the header.
    pub fn open(mut reader: R) -> Result<Self, ReplayError> {
        decode_header(&mut reader)?;
        Ok(Self {
            reader,
            frames_read: 0,
        })
    }

    /// Read the next frame, or `None` if the stream is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<ReplayFrame>, ReplayError> {
        let frame = decode_frame(&mut self.reader)?;
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Convert into a frame iterator.
    pub fn frames(self) -> FrameIter<R> {
        FrameIter {
            reader: self.reader,
            done: false,
        }
    }
}

/// Iterator adapter over replay frames.
pub struct FrameIter<R: Read> {
    reader: R,
    done: bool,
}

impl<R: Read> Iterator for FrameIter<R> {
    type Item = Result<ReplayFrame, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_frame(&mut self.reader) {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ReplayWriter;
    use rewind_core::Tick;

    fn make_frame(tick: u64, input: Vec<u8>) -> ReplayFrame {
        ReplayFrame {
            tick: Tick(tick),
            input_data: input,
            state_hash: tick.wrapping_mul(31),
            is_save_point: false,
        }
    }

    #[test]
    fn roundtrip_write_read_frames() {
        let mut buf = Vec::new();
        {
            let mut writer = ReplayWriter::new(&mut buf).unwrap();
            for tick in 1..=5u64 {
                writer.write_frame(&make_frame(tick, vec![tick as u8])).unwrap();
            }
            assert_eq!(writer.frames_written(), 5);
        }

        let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
        for tick in 1..=5u64 {
            let frame = reader.next_frame().unwrap().unwrap();
            assert_eq!(frame.tick, Tick(tick));
            assert_eq!(frame.input_data, vec![tick as u8]);
        }
        assert!(reader.next_frame().unwrap().is_none());
        assert_eq!(reader.frames_read(), 5);
    }

    #[test]
    fn frame_iterator_works() {
        let mut buf = Vec::new();
        {
            let mut writer = ReplayWriter::new(&mut buf).unwrap();
            for tick in 1..=3u64 {
                writer.write_frame(&make_frame(tick, vec![])).unwrap();
            }
        }

        let reader = ReplayReader::open(buf.as_slice()).unwrap();
        let frames: Vec<_> = reader.frames().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].tick, Tick(1));
        assert_eq!(frames[2].tick, Tick(3));
    }

    #[test]
    fn truncated_stream_errors() {
        let mut buf = Vec::new();
        {
            let mut writer = ReplayWriter::new(&mut buf).unwrap();
            writer.write_frame(&make_frame(1, vec![1, 2, 3])).unwrap();
        }

        // Truncate mid-frame
        buf.truncate(buf.len() - 4);
        let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
        // Should get an error, not Ok(None)
        assert!(reader.next_frame().is_err());
    }

    #[test]
    fn bad_magic_on_open() {
        let data = b"XWND\x01rest of data";
        let result = ReplayReader::open(data.as_slice());
        assert!(matches!(result, Err(ReplayError::InvalidMagic)));
    }
}

//! Versioned save container for Rewind world snapshots.
//!
//! A save is a single world snapshot in a validated binary container:
//!
//! ```text
//! [MAGIC "ASAV"] [VERSION u8]
//! [save_tick u64] [tick_rate u32] [seed u32] [state_hash u64]
//! [payload len u32] [payload bytes]
//! [metadata len u32] [metadata UTF-8]
//! ```
//!
//! [`save`] writes a container, [`SaveFile::load`] validates and reads one
//! back, and [`validate`] performs the structural check without retaining
//! the payload — the cheap path used by [`scan_dir`] when a save browser
//! needs pass/fail plus header metadata for many files.
//!
//! File extension convention: `.asav`. All side effects are confined to
//! the given path; there is no process-wide state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod format;
pub mod scan;

pub use error::SaveError;
pub use format::SaveHeader;
pub use scan::{scan_dir, SaveSummary};

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use rewind_core::hash::payload_hash;
use rewind_core::Tick;

use format::{
    decode_preamble, encode_preamble, read_metadata, read_length_prefixed_bytes, read_u32_le,
    write_length_prefixed_bytes,
};

/// Conventional file extension for save containers.
pub const SAVE_EXTENSION: &str = "asav";

/// Magic bytes at the start of every save file.
pub const MAGIC: [u8; 4] = *b"ASAV";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

/// Write a world snapshot to a save container at `path`.
///
/// The header's content hash is computed from `ecs_data` here, so a later
/// [`SaveFile::load`] can verify the payload survived the round trip.
pub fn save(
    path: &Path,
    tick: Tick,
    tick_rate: u32,
    seed: u32,
    ecs_data: &[u8],
    metadata: &str,
) -> Result<(), SaveError> {
    let header = SaveHeader {
        save_tick: tick,
        tick_rate,
        seed,
        state_hash: payload_hash(ecs_data),
    };

    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    encode_preamble(&mut w, &header)?;
    write_length_prefixed_bytes(&mut w, ecs_data)?;
    write_length_prefixed_bytes(&mut w, metadata.as_bytes())?;
    w.flush()?;
    Ok(())
}

/// A loaded, validated save container.
///
/// # Examples
///
/// ```no_run
/// use rewind_save::SaveFile;
/// use std::path::Path;
///
/// let save = SaveFile::load(Path::new("slot1.asav")).unwrap();
/// println!("saved at tick {}", save.header().save_tick);
/// let world_bytes = save.ecs_data();
/// # let _ = world_bytes;
/// ```
#[derive(Clone, Debug)]
pub struct SaveFile {
    header: SaveHeader,
    ecs_data: Vec<u8>,
    metadata: String,
}

impl SaveFile {
    /// Load and fully validate a save container.
    ///
    /// The header is validated (magic, version, structure) and the
    /// payload's content hash is checked against the recorded one before
    /// anything is exposed — a caller never sees bytes that would restore
    /// a different world than was saved.
    pub fn load(path: &Path) -> Result<Self, SaveError> {
        let file = File::open(path)?;
        let mut r = BufReader::new(file);

        let header = decode_preamble(&mut r)?;
        let ecs_data = read_length_prefixed_bytes(&mut r, "ECS payload")?;
        let metadata = read_metadata(&mut r)?;
        expect_eof(&mut r)?;

        let actual = payload_hash(&ecs_data);
        if actual != header.state_hash {
            return Err(SaveError::Corrupt {
                detail: format!(
                    "payload hash mismatch: header={:#018x}, payload={actual:#018x}",
                    header.state_hash
                ),
            });
        }

        Ok(Self {
            header,
            ecs_data,
            metadata,
        })
    }

    /// The validated save header.
    pub fn header(&self) -> &SaveHeader {
        &self.header
    }

    /// The opaque serialized world payload.
    pub fn ecs_data(&self) -> &[u8] {
        &self.ecs_data
    }

    /// The free-form metadata string recorded at save time.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    /// Consume the save, returning the payload buffer.
    pub fn into_ecs_data(self) -> Vec<u8> {
        self.ecs_data
    }
}

/// Structurally validate a save container without retaining its payload.
///
/// Checks magic, version, header shape, that the declared payload length
/// is actually present (by seeking past it), and that the metadata string
/// parses — but never holds the payload in memory. Returns the header on
/// success.
pub fn validate(path: &Path) -> Result<SaveHeader, SaveError> {
    let file = File::open(path)?;
    let mut r = BufReader::new(file);

    let header = decode_preamble(&mut r)?;

    // Skip the payload instead of reading it.
    let payload_len = read_u32_le(&mut r, "ECS payload length")?;
    r.seek(SeekFrom::Current(payload_len as i64))?;

    // The metadata read doubles as the truncation check: if the declared
    // payload ran past EOF, this read fails immediately.
    read_metadata(&mut r)?;
    expect_eof(&mut r)?;

    Ok(header)
}

/// Require the reader to be exactly at EOF.
fn expect_eof(r: &mut dyn Read) -> Result<(), SaveError> {
    let mut probe = [0u8; 1];
    match r.read(&mut probe)? {
        0 => Ok(()),
        _ => Err(SaveError::Corrupt {
            detail: "trailing data after metadata".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_and_path(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        (dir, path)
    }

    #[test]
    fn save_load_roundtrip() {
        let (_dir, path) = dir_and_path("slot.asav");
        let ecs = vec![1u8, 2, 3, 4, 5];

        save(&path, Tick(77), 60, 42, &ecs, "checkpoint before boss").unwrap();
        let loaded = SaveFile::load(&path).unwrap();

        assert_eq!(loaded.header().save_tick, Tick(77));
        assert_eq!(loaded.header().tick_rate, 60);
        assert_eq!(loaded.header().seed, 42);
        assert_eq!(loaded.header().state_hash, payload_hash(&ecs));
        assert_eq!(loaded.ecs_data(), ecs.as_slice());
        assert_eq!(loaded.metadata(), "checkpoint before boss");
    }

    #[test]
    fn empty_payload_roundtrips() {
        let (_dir, path) = dir_and_path("empty.asav");
        save(&path, Tick(0), 30, 0, &[], "").unwrap();
        let loaded = SaveFile::load(&path).unwrap();
        assert!(loaded.ecs_data().is_empty());
    }

    #[test]
    fn validate_returns_header_without_payload() {
        let (_dir, path) = dir_and_path("big.asav");
        let ecs = vec![9u8; 10_000];
        save(&path, Tick(500), 120, 7, &ecs, "").unwrap();

        let header = validate(&path).unwrap();
        assert_eq!(header.save_tick, Tick(500));
        assert_eq!(header.state_hash, payload_hash(&ecs));
    }

    #[test]
    fn load_detects_flipped_payload_byte() {
        let (_dir, path) = dir_and_path("flip.asav");
        save(&path, Tick(1), 60, 0, &[1, 2, 3, 4], "").unwrap();

        // Flip a payload byte on disk; the header hash no longer matches.
        let mut bytes = std::fs::read(&path).unwrap();
        let payload_start = MAGIC.len() + 1 + 8 + 4 + 4 + 8 + 4;
        bytes[payload_start] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        match SaveFile::load(&path) {
            Err(SaveError::Corrupt { detail }) => {
                assert!(detail.contains("hash mismatch"), "wrong detail: {detail}");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn truncated_file_is_corrupt() {
        let (_dir, path) = dir_and_path("trunc.asav");
        save(&path, Tick(1), 60, 0, &[1, 2, 3, 4], "meta").unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 6]).unwrap();

        assert!(matches!(validate(&path), Err(SaveError::Corrupt { .. })));
        assert!(matches!(SaveFile::load(&path), Err(SaveError::Corrupt { .. })));
    }

    #[test]
    fn wrong_version_distinguished_from_corrupt() {
        let (_dir, path) = dir_and_path("future.asav");
        save(&path, Tick(1), 60, 0, &[1], "").unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[4] = 99; // version byte follows the 4-byte magic
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            validate(&path),
            Err(SaveError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn trailing_data_is_corrupt() {
        let (_dir, path) = dir_and_path("trail.asav");
        save(&path, Tick(1), 60, 0, &[1], "").unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes.push(0xAB);
        std::fs::write(&path, &bytes).unwrap();

        match validate(&path) {
            Err(SaveError::Corrupt { detail }) => {
                assert!(detail.contains("trailing data"), "wrong detail: {detail}");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SaveFile::load(&dir.path().join("absent.asav"));
        assert!(matches!(result, Err(SaveError::Io(_))));
    }
}

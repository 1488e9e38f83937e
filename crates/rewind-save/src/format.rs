//! Binary encode/decode for the save container.
//!
//! All integers are little-endian. The payload and metadata are
//! length-prefixed with a `u32`. Truncation inside a structured read is
//! reported as [`SaveError::Corrupt`], not generic I/O, so callers can
//! tell a damaged file from a failing disk.

use std::io::{Read, Write};

use rewind_core::Tick;

use crate::error::SaveError;
use crate::{FORMAT_VERSION, MAGIC};

/// Fixed-size header accompanying every save payload.
///
/// Created at save time, validated at load time before any world mutation
/// occurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveHeader {
    /// The tick the world was serialized at.
    pub save_tick: Tick,
    /// Fixed-step tick rate of the saved simulation, in ticks per second.
    pub tick_rate: u32,
    /// Simulation seed at save time.
    pub seed: u32,
    /// Content hash of the ECS payload.
    pub state_hash: u64,
}

/// Read exactly `N` bytes, mapping truncation to `Corrupt`.
fn read_exact<const N: usize>(r: &mut dyn Read, what: &str) -> Result<[u8; N], SaveError> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            SaveError::Corrupt {
                detail: format!("truncated while reading {what}"),
            }
        } else {
            SaveError::Io(e)
        }
    })?;
    Ok(buf)
}

/// Read a little-endian u32, mapping truncation to `Corrupt`.
pub fn read_u32_le(r: &mut dyn Read, what: &str) -> Result<u32, SaveError> {
    Ok(u32::from_le_bytes(read_exact::<4>(r, what)?))
}

/// Read a little-endian u64, mapping truncation to `Corrupt`.
pub fn read_u64_le(r: &mut dyn Read, what: &str) -> Result<u64, SaveError> {
    Ok(u64::from_le_bytes(read_exact::<8>(r, what)?))
}

/// Read a length-prefixed byte array, mapping truncation to `Corrupt`.
pub fn read_length_prefixed_bytes(r: &mut dyn Read, what: &str) -> Result<Vec<u8>, SaveError> {
    let len = read_u32_le(r, what)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            SaveError::Corrupt {
                detail: format!("truncated while reading {what} ({len} bytes declared)"),
            }
        } else {
            SaveError::Io(e)
        }
    })?;
    Ok(buf)
}

/// Encode the container preamble: magic, version, header.
pub fn encode_preamble(w: &mut dyn Write, header: &SaveHeader) -> Result<(), SaveError> {
    w.write_all(&MAGIC)?;
    w.write_all(&[FORMAT_VERSION])?;
    w.write_all(&header.save_tick.0.to_le_bytes())?;
    w.write_all(&header.tick_rate.to_le_bytes())?;
    w.write_all(&header.seed.to_le_bytes())?;
    w.write_all(&header.state_hash.to_le_bytes())?;
    Ok(())
}

/// Decode and validate the container preamble, returning the header.
pub fn decode_preamble(r: &mut dyn Read) -> Result<SaveHeader, SaveError> {
    let magic = read_exact::<4>(r, "magic bytes")?;
    if magic != MAGIC {
        return Err(SaveError::InvalidMagic);
    }

    let [version] = read_exact::<1>(r, "format version")?;
    if version != FORMAT_VERSION {
        return Err(SaveError::UnsupportedVersion { found: version });
    }

    Ok(SaveHeader {
        save_tick: Tick(read_u64_le(r, "save tick")?),
        tick_rate: read_u32_le(r, "tick rate")?,
        seed: read_u32_le(r, "seed")?,
        state_hash: read_u64_le(r, "state hash")?,
    })
}

/// Write a length-prefixed byte array.
pub fn write_length_prefixed_bytes(w: &mut dyn Write, b: &[u8]) -> Result<(), SaveError> {
    w.write_all(&(b.len() as u32).to_le_bytes())?;
    w.write_all(b)?;
    Ok(())
}

/// Read the length-prefixed metadata string, mapping bad UTF-8 to `Corrupt`.
pub fn read_metadata(r: &mut dyn Read) -> Result<String, SaveError> {
    let bytes = read_length_prefixed_bytes(r, "metadata")?;
    String::from_utf8(bytes).map_err(|e| SaveError::Corrupt {
        detail: format!("metadata is not valid UTF-8: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_roundtrip() {
        let header = SaveHeader {
            save_tick: Tick(100),
            tick_rate: 60,
            seed: 42,
            state_hash: 0xDEADBEEF,
        };
        let mut buf = Vec::new();
        encode_preamble(&mut buf, &header).unwrap();
        let got = decode_preamble(&mut buf.as_slice()).unwrap();
        assert_eq!(header, got);
    }

    #[test]
    fn bad_magic_rejected() {
        let data = b"XSAV\x01";
        assert!(matches!(
            decode_preamble(&mut data.as_slice()),
            Err(SaveError::InvalidMagic)
        ));
    }

    #[test]
    fn bad_version_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        buf.push(7);
        assert!(matches!(
            decode_preamble(&mut buf.as_slice()),
            Err(SaveError::UnsupportedVersion { found: 7 })
        ));
    }

    #[test]
    fn truncated_header_is_corrupt_not_io() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&[0u8; 3]); // 3 of 8 save-tick bytes
        match decode_preamble(&mut buf.as_slice()) {
            Err(SaveError::Corrupt { detail }) => {
                assert!(detail.contains("save tick"), "wrong detail: {detail}");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn truncated_payload_is_corrupt() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&100u32.to_le_bytes()); // declares 100 bytes
        buf.extend_from_slice(&[1, 2, 3]); // provides 3
        match read_length_prefixed_bytes(&mut buf.as_slice(), "payload") {
            Err(SaveError::Corrupt { detail }) => {
                assert!(detail.contains("100 bytes declared"), "wrong detail: {detail}");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn metadata_bad_utf8_is_corrupt() {
        let mut buf = Vec::new();
        write_length_prefixed_bytes(&mut buf, &[0xFF, 0xFE]).unwrap();
        assert!(matches!(
            read_metadata(&mut buf.as_slice()),
            Err(SaveError::Corrupt { .. })
        ));
    }
}

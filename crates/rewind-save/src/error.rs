//! Error types for the save system.

use std::fmt;
use std::io;

/// Errors that can occur while writing, reading, or validating saves.
///
/// Version mismatch is kept distinct from corruption so tooling can offer
/// "migrate" guidance for the former and "retry/discard" for the latter,
/// and both are distinct from generic I/O failure.
#[derive(Debug)]
pub enum SaveError {
    /// An I/O error occurred opening, reading, or writing the file.
    Io(io::Error),
    /// The file does not start with the expected `b"ASAV"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// The file's structure is damaged (truncated, bad hash, trailing
    /// garbage).
    Corrupt {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"ASAV\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported save format version {found}")
            }
            Self::Corrupt { detail } => write!(f, "corrupt save file: {detail}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

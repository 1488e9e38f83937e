//! Bulk directory scanning for save browsers.

use std::path::Path;

use rewind_core::Tick;

use crate::error::SaveError;
use crate::{validate, SAVE_EXTENSION};

/// Per-file result of a directory scan.
///
/// Invalid files keep their filename with `valid: false` and zeroed
/// header fields, so a browser can still list them (greyed out) instead
/// of hiding the damage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveSummary {
    /// File name within the scanned directory.
    pub filename: String,
    /// Tick recorded in the header.
    pub save_tick: Tick,
    /// Tick rate recorded in the header.
    pub tick_rate: u32,
    /// Seed recorded in the header.
    pub seed: u32,
    /// Payload content hash recorded in the header.
    pub state_hash: u64,
    /// Whether the file passed structural validation.
    pub valid: bool,
}

/// Scan a directory for `.asav` files and validate each one.
///
/// Uses [`validate`] per candidate, so payloads are never read into
/// memory. Per-file failures (truncation, version mismatch, unreadable
/// file) demote that entry to `valid: false` rather than aborting the
/// scan; only failure to read the directory itself is an error. Results
/// are sorted by filename for a stable listing.
pub fn scan_dir(dir: &Path) -> Result<Vec<SaveSummary>, SaveError> {
    let mut summaries = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXTENSION) {
            continue;
        }
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        match validate(&path) {
            Ok(header) => summaries.push(SaveSummary {
                filename,
                save_tick: header.save_tick,
                tick_rate: header.tick_rate,
                seed: header.seed,
                state_hash: header.state_hash,
                valid: true,
            }),
            Err(e) => {
                log::debug!("save scan: {} failed validation: {e}", path.display());
                summaries.push(SaveSummary {
                    filename,
                    save_tick: Tick(0),
                    tick_rate: 0,
                    seed: 0,
                    state_hash: 0,
                    valid: false,
                });
            }
        }
    }

    summaries.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(summaries)
}

//! All-or-nothing output files.
//!
//! Packages, settings hex files and key files are written to a temporary
//! file in the destination directory and renamed into place, so a failed run
//! never leaves a truncated artifact behind.

use std::io::Write;
use std::path::Path;

use dfu_errors::{DfuError, ResultExt};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `bytes` to `path`, replacing any existing file atomically.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), DfuError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent).at_path(parent)?;
    staged.write_all(bytes).at_path(staged.path())?;
    staged.as_file().sync_all().at_path(staged.path())?;
    staged.persist(path).map_err(|e| e.error).at_path(path)?;

    debug!(path = %path.display(), size = bytes.len(), "wrote output file");
    Ok(())
}

//! Image references.

use std::path::{Path, PathBuf};

use dfu_errors::ImageKind;

/// A firmware file together with the role it plays in an update.
///
/// Existence of the file is checked by the caller; a reference is only a
/// pointer until [`FirmwareImage::load`](crate::FirmwareImage::load) reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    kind: ImageKind,
    path: PathBuf,
}

impl ImageReference {
    /// Create a reference to `path` acting as `kind`.
    pub fn new(kind: ImageKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Role of the image.
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Location of the image file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file should be read as Intel HEX.
    pub fn is_intel_hex(&self) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("hex") || e.eq_ignore_ascii_case("ihex"))
    }

    /// File name without directory and extension, used to name package entries.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.kind.to_string())
    }
}

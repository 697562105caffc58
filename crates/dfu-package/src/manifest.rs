//! `manifest.json`, the table of contents of a package.

use dfu_errors::ParseError;
use serde::{Deserialize, Serialize};

/// Name of the manifest inside the archive.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Sizes of the two halves of a combined SoftDevice and bootloader image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeInfo {
    /// Bootloader size in bytes
    pub bl_size: u32,
    /// SoftDevice size in bytes
    pub sd_size: u32,
}

/// Files of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Image binary
    pub bin_file: String,
    /// Init packet
    pub dat_file: String,
    /// Present only for combined SoftDevice and bootloader images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_read_only_metadata: Option<SizeInfo>,
}

impl ManifestEntry {
    /// Entry for `<stem>.bin` and `<stem>.dat`.
    pub fn for_stem(stem: &str) -> Self {
        Self {
            bin_file: format!("{stem}.bin"),
            dat_file: format!("{stem}.dat"),
            info_read_only_metadata: None,
        }
    }
}

/// The images of a package, keyed by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ManifestEntry>,
    /// Bootloader alone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootloader: Option<ManifestEntry>,
    /// SoftDevice alone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub softdevice: Option<ManifestEntry>,
    /// SoftDevice and bootloader merged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub softdevice_bootloader: Option<ManifestEntry>,
}

#[derive(Serialize, Deserialize)]
struct ManifestFile {
    manifest: Manifest,
}

impl Manifest {
    /// Entries in install order with their manifest keys.
    ///
    /// The SoftDevice and bootloader go before the application, which
    /// depends on them.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &ManifestEntry)> {
        [
            ("softdevice_bootloader", self.softdevice_bootloader.as_ref()),
            ("softdevice", self.softdevice.as_ref()),
            ("bootloader", self.bootloader.as_ref()),
            ("application", self.application.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, entry)| entry.map(|e| (key, e)))
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string_pretty(&ManifestFile {
            manifest: self.clone(),
        })
        .map_err(|e| ParseError::InvalidPackage(format!("manifest: {e}")))
    }

    /// Parse a manifest read from a package.
    pub fn from_json(text: &str) -> Result<Self, ParseError> {
        serde_json::from_str::<ManifestFile>(text)
            .map(|file| file.manifest)
            .map_err(|e| ParseError::InvalidPackage(format!("manifest: {e}")))
    }
}

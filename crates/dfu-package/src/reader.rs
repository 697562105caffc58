//! Reading packages back for display and verification.

use core::fmt;
use std::io::{Cursor, Read};
use std::path::Path;

use dfu_errors::{DfuError, ParseError, ResultExt};
use tracing::debug;
use zip::ZipArchive;

use crate::init_packet::Packet;
use crate::manifest::{MANIFEST_FILE, Manifest, ManifestEntry};

/// One image found in a package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageImage {
    /// Manifest key, e.g. `application`
    pub key: &'static str,
    /// File names
    pub entry: ManifestEntry,
    /// Size of the binary
    pub image_size: usize,
    /// Decoded init packet
    pub packet: Packet,
}

/// Decoded content of a package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageContents {
    /// Table of contents
    pub manifest: Manifest,
    /// Images in install order
    pub images: Vec<PackageImage>,
}

impl PackageContents {
    /// Read the package at `path`.
    pub fn read(path: &Path) -> Result<Self, DfuError> {
        let bytes = std::fs::read(path).at_path(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode a package held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DfuError> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| DfuError::archive(e.to_string()))?;

        let manifest_text = String::from_utf8(read_entry(&mut archive, MANIFEST_FILE)?)
            .map_err(|e| ParseError::InvalidPackage(format!("manifest: {e}")))?;
        let manifest = Manifest::from_json(&manifest_text)?;

        let mut images = Vec::new();
        for (key, entry) in manifest.entries() {
            let image_size = read_entry(&mut archive, &entry.bin_file)?.len();
            let packet = Packet::from_bytes(&read_entry(&mut archive, &entry.dat_file)?)?;
            images.push(PackageImage {
                key,
                entry: entry.clone(),
                image_size,
                packet,
            });
        }

        debug!(images = images.len(), "read package");
        Ok(Self { manifest, images })
    }
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Vec<u8>, DfuError> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| ParseError::InvalidPackage(format!("{name}: {e}")))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| DfuError::archive(format!("{name}: {e}")))?;
    Ok(bytes)
}

impl fmt::Display for PackageContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "|")?;
        writeln!(f, "|- Image count: {}", self.images.len())?;
        for (index, image) in self.images.iter().enumerate() {
            writeln!(f, "|")?;
            writeln!(f, "|- Image #{index}:")?;
            writeln!(f, "   |- Type: {}", image.key)?;
            writeln!(f, "   |- Image file: {}", image.entry.bin_file)?;
            writeln!(f, "   |- Image size: {}", image.image_size)?;
            if let Some(info) = image.entry.info_read_only_metadata {
                writeln!(f, "   |- SoftDevice size: {}", info.sd_size)?;
                writeln!(f, "   |- Bootloader size: {}", info.bl_size)?;
            }
            writeln!(f, "   |- Init packet file: {}", image.entry.dat_file)?;
            writeln!(f, "      |")?;
            for line in image.packet.to_string().lines() {
                writeln!(f, "      {line}")?;
            }
        }
        Ok(())
    }
}

//! Loading firmware images into flat binaries.

use dfu_errors::{DfuError, ImageKind, ResultExt, ValidationError};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::memory::MemoryMap;
use crate::reference::ImageReference;

/// Size of the Master Boot Record that precedes every SoftDevice in flash.
///
/// SoftDevice hex files include it, but it is never transferred during DFU.
pub const MBR_SIZE: u32 = 0x1000;

/// Start of the UICR/FICR registers.
///
/// Records at or above it configure the chip and are not part of the image.
pub const UICR_BASE: u32 = 0x1000_0000;

/// A firmware image read into memory as a flat binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    kind: ImageKind,
    load_address: Option<u32>,
    data: Vec<u8>,
}

impl FirmwareImage {
    /// Wrap an already flat binary.
    pub fn from_bytes(kind: ImageKind, data: Vec<u8>) -> Self {
        Self {
            kind,
            load_address: None,
            data,
        }
    }

    /// Build a flat binary from a memory map.
    ///
    /// Data at or above [`UICR_BASE`] is dropped. SoftDevice maps also drop
    /// everything below [`MBR_SIZE`].
    pub fn from_memory_map(kind: ImageKind, map: &MemoryMap) -> Result<Self, ValidationError> {
        let floor = if kind == ImageKind::SoftStack { MBR_SIZE } else { 0 };
        let (load_address, data) = map
            .flatten_within(floor, u64::from(UICR_BASE))
            .ok_or(ValidationError::EmptyImage(kind))?;
        Ok(Self {
            kind,
            load_address: Some(load_address),
            data,
        })
    }

    /// Read the file behind `reference`.
    ///
    /// Intel HEX files are flattened, anything else is taken verbatim.
    pub fn load(reference: &ImageReference) -> Result<Self, DfuError> {
        let path = reference.path();
        let image = if reference.is_intel_hex() {
            let text = std::fs::read_to_string(path).at_path(path)?;
            let map = MemoryMap::from_ihex(&text)?;
            Self::from_memory_map(reference.kind(), &map)?
        } else {
            Self::from_bytes(reference.kind(), std::fs::read(path).at_path(path)?)
        };

        if image.data.is_empty() {
            return Err(ValidationError::EmptyImage(reference.kind()).into());
        }
        image.size()?;

        debug!(
            kind = %image.kind,
            path = %path.display(),
            size = image.data.len(),
            "loaded firmware image"
        );
        Ok(image)
    }

    /// Role of the image.
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Flash address of the first byte, when known from an Intel HEX file.
    pub fn load_address(&self) -> Option<u32> {
        self.load_address
    }

    /// Image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Image size as stored in 32-bit size fields.
    pub fn size(&self) -> Result<u32, ValidationError> {
        u32::try_from(self.data.len())
            .ok()
            .ok_or(ValidationError::ImageTooLarge {
                kind: self.kind,
                size: self.data.len(),
            })
    }

    /// CRC-32 (IEEE) of the image.
    pub fn crc32(&self) -> u32 {
        crc32fast::hash(&self.data)
    }

    /// SHA-256 digest of the image.
    pub fn sha256(&self) -> [u8; 32] {
        Sha256::digest(&self.data).into()
    }

    /// SHA-256 digest as lowercase hex, for display.
    pub fn sha256_hex(&self) -> String {
        hex::encode(self.sha256())
    }

    /// Concatenate two images into one, e.g. SoftDevice followed by bootloader.
    pub fn concat(kind: ImageKind, first: &FirmwareImage, second: &FirmwareImage) -> Self {
        let mut data = Vec::with_capacity(first.data.len() + second.data.len());
        data.extend_from_slice(&first.data);
        data.extend_from_slice(&second.data);
        Self {
            kind,
            load_address: first.load_address,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_load_bin_verbatim() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("app.bin");
        std::fs::write(&path, [1u8, 2, 3])?;

        let image = FirmwareImage::load(&ImageReference::new(ImageKind::Application, &path))?;
        assert_eq!(image.data(), &[1, 2, 3]);
        assert_eq!(image.size()?, 3);
        assert_eq!(image.load_address(), None);
        Ok(())
    }

    #[test]
    fn test_load_softdevice_hex_strips_mbr() -> TestResult {
        let mut map = MemoryMap::new();
        map.insert(0x0, &[0xAA; 16]);
        map.insert(MBR_SIZE, &[0xBB; 16]);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sd.hex");
        std::fs::write(&path, map.to_ihex()?)?;

        let image = FirmwareImage::load(&ImageReference::new(ImageKind::SoftStack, &path))?;
        assert_eq!(image.load_address(), Some(MBR_SIZE));
        assert_eq!(image.data(), &[0xBB; 16]);
        Ok(())
    }

    #[test]
    fn test_load_bootloader_hex_ignores_uicr() -> TestResult {
        let mut map = MemoryMap::new();
        map.insert(0x7_8000, &[0x5A; 64]);
        map.insert(0x1000_1014, &[0x00, 0x80, 0x07, 0x00]);
        map.insert(0x1000_1018, &[0x00, 0xE0, 0x07, 0x00]);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bl.hex");
        std::fs::write(&path, map.to_ihex()?)?;

        let image = FirmwareImage::load(&ImageReference::new(ImageKind::Bootloader, &path))?;
        assert_eq!(image.load_address(), Some(0x7_8000));
        assert_eq!(image.size()?, 64);
        assert_eq!(image.data(), &[0x5A; 64]);
        Ok(())
    }

    #[test]
    fn test_uicr_only_hex_is_empty() {
        let mut map = MemoryMap::new();
        map.insert(0x1000_1014, &[0x00; 4]);
        assert_eq!(
            FirmwareImage::from_memory_map(ImageKind::Application, &map),
            Err(ValidationError::EmptyImage(ImageKind::Application))
        );
    }

    #[test]
    fn test_load_empty_file_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, [])?;

        let result = FirmwareImage::load(&ImageReference::new(ImageKind::Bootloader, &path));
        assert!(matches!(
            result,
            Err(DfuError::Validation(ValidationError::EmptyImage(
                ImageKind::Bootloader
            )))
        ));
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_io() {
        let result = FirmwareImage::load(&ImageReference::new(
            ImageKind::Application,
            "/nonexistent/app.bin",
        ));
        assert!(matches!(result, Err(DfuError::Io { .. })));
    }

    #[test]
    fn test_crc_and_hash() {
        let image = FirmwareImage::from_bytes(ImageKind::Application, b"123456789".to_vec());
        assert_eq!(image.crc32(), 0xCBF4_3926);
        assert_eq!(
            image.sha256_hex(),
            "15e2b0d3c33891ebb0f1ef609ec419420c20e320ce94c65fbc8c3312448eb225"
        );
    }

    #[test]
    fn test_concat() {
        let sd = FirmwareImage::from_bytes(ImageKind::SoftStack, vec![1, 2]);
        let bl = FirmwareImage::from_bytes(ImageKind::Bootloader, vec![3]);
        let both = FirmwareImage::concat(ImageKind::SoftStack, &sd, &bl);
        assert_eq!(both.data(), &[1, 2, 3]);
    }
}

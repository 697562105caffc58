//! Package archive generation.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::Path;

use dfu_crypto::SigningKey;
use dfu_errors::{DfuError, ImageKind};
use dfu_image::{FirmwareImage, ImageReference, write_atomically};
use dfu_settings::BootValidationMode;
use prost::Message;
use tracing::{debug, info};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::descriptor::PackageDescriptor;
use crate::init_packet::{BootValidation, Command, FwType, Hash, InitCommand, Packet};
use crate::manifest::{MANIFEST_FILE, Manifest, ManifestEntry, SizeInfo};

/// Firmware version carried by a SoftDevice-only init packet.
pub const SOFTDEVICE_FW_VERSION: u32 = 0xFFFF_FFFF;

/// Base name of the merged SoftDevice and bootloader entry.
pub const SOFTDEVICE_BOOTLOADER_STEM: &str = "sd_bl";

/// One image ready to be written with its init packet.
#[derive(Debug, Clone)]
struct PackagedImage {
    stem: String,
    fw_type: FwType,
    image: FirmwareImage,
    fw_version: u32,
    sd_req: Vec<u32>,
    sizes: Sizes,
    boot_validation: BootValidation,
}

#[derive(Debug, Clone, Copy, Default)]
struct Sizes {
    sd: Option<u32>,
    bl: Option<u32>,
    app: Option<u32>,
}

/// Writes a [`PackageDescriptor`] out as a zip package.
///
/// # Example
///
/// ```no_run
/// use dfu_package::{PackageDescriptor, PackageRequest, PackageWriter, RequirementSet};
/// use dfu_image::{ImageKind, ImageReference};
///
/// let descriptor = PackageDescriptor::assemble(PackageRequest {
///     hardware_version: Some(52),
///     application: Some(ImageReference::new(ImageKind::Application, "app.hex")),
///     application_version: Some(1),
///     stack_requirements: Some(RequirementSet::parse("0x100")?),
///     ..PackageRequest::default()
/// })?;
/// PackageWriter::new(&descriptor, None).write(std::path::Path::new("app_dfu.zip"))?;
/// # Ok::<(), dfu_errors::DfuError>(())
/// ```
pub struct PackageWriter<'a> {
    descriptor: &'a PackageDescriptor,
    key: Option<&'a SigningKey>,
}

impl<'a> PackageWriter<'a> {
    /// Writer for `descriptor`, signing init packets with `key` when given.
    pub fn new(descriptor: &'a PackageDescriptor, key: Option<&'a SigningKey>) -> Self {
        Self { descriptor, key }
    }

    /// Build the archive in memory.
    pub fn build(&self) -> Result<Vec<u8>, DfuError> {
        let images = self.collect_images()?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6));

        let mut manifest = Manifest::default();
        for packaged in &images {
            let entry = self.add_image(&mut zip, &options, packaged)?;
            match packaged.fw_type {
                FwType::Application | FwType::ExternalApplication => {
                    manifest.application = Some(entry)
                }
                FwType::Bootloader => manifest.bootloader = Some(entry),
                FwType::Softdevice => manifest.softdevice = Some(entry),
                FwType::SoftdeviceBootloader => manifest.softdevice_bootloader = Some(entry),
            }
        }

        zip.start_file(MANIFEST_FILE, options)
            .map_err(|e| DfuError::archive(e.to_string()))?;
        zip.write_all(manifest.to_json()?.as_bytes())
            .map_err(|e| DfuError::archive(e.to_string()))?;

        let bytes = zip
            .finish()
            .map_err(|e| DfuError::archive(e.to_string()))?
            .into_inner();
        debug!(size = bytes.len(), "built package archive");
        Ok(bytes)
    }

    /// Build the archive and write it to `path`.
    ///
    /// Nothing is written unless every entry was produced.
    pub fn write(&self, path: &Path) -> Result<(), DfuError> {
        let bytes = self.build()?;
        write_atomically(path, &bytes)?;
        info!(path = %path.display(), "wrote DFU package");
        Ok(())
    }

    fn collect_images(&self) -> Result<Vec<PackagedImage>, DfuError> {
        let d = self.descriptor;
        let key = self.key;
        let mut images = Vec::new();

        let softdevice = d.softstack.as_ref().map(FirmwareImage::load).transpose()?;
        let bootloader = d
            .bootloader
            .as_ref()
            .map(|(r, v)| FirmwareImage::load(r).map(|image| (r, image, *v)))
            .transpose()?;

        match (&softdevice, bootloader) {
            (Some(sd), Some((_, bl, version))) => {
                let merged = FirmwareImage::concat(ImageKind::SoftStack, sd, &bl);
                images.push(PackagedImage {
                    stem: SOFTDEVICE_BOOTLOADER_STEM.to_string(),
                    fw_type: FwType::SoftdeviceBootloader,
                    fw_version: version,
                    sd_req: d.stack_required_ids.as_slice().to_vec(),
                    sizes: Sizes {
                        sd: Some(sd.size()?),
                        bl: Some(bl.size()?),
                        app: None,
                    },
                    boot_validation: boot_validation(d.softstack_validation, sd, key)?,
                    image: merged,
                });
            }
            (Some(sd), None) => {
                let reference = d.softstack.as_ref();
                images.push(PackagedImage {
                    stem: reference.map(ImageReference::stem).unwrap_or_default(),
                    fw_type: FwType::Softdevice,
                    fw_version: SOFTDEVICE_FW_VERSION,
                    sd_req: d.stack_required_ids.as_slice().to_vec(),
                    sizes: Sizes {
                        sd: Some(sd.size()?),
                        ..Sizes::default()
                    },
                    boot_validation: boot_validation(d.softstack_validation, sd, key)?,
                    image: sd.clone(),
                });
            }
            (None, Some((reference, bl, version))) => {
                images.push(PackagedImage {
                    stem: reference.stem(),
                    fw_type: FwType::Bootloader,
                    fw_version: version,
                    sd_req: d.stack_required_ids.as_slice().to_vec(),
                    sizes: Sizes {
                        bl: Some(bl.size()?),
                        ..Sizes::default()
                    },
                    boot_validation: boot_validation(BootValidationMode::NoValidation, &bl, key)?,
                    image: bl,
                });
            }
            (None, None) => {}
        }

        if let Some((reference, version)) = &d.application {
            let app = FirmwareImage::load(reference)?;
            let sd_req = if softdevice.is_some() {
                &d.stack_new_ids
            } else {
                &d.stack_required_ids
            };
            images.push(PackagedImage {
                stem: reference.stem(),
                fw_type: FwType::Application,
                fw_version: *version,
                sd_req: sd_req.as_slice().to_vec(),
                sizes: Sizes {
                    app: Some(app.size()?),
                    ..Sizes::default()
                },
                boot_validation: boot_validation(d.application_validation, &app, key)?,
                image: app,
            });
        }

        disambiguate_stems(&mut images);
        Ok(images)
    }

    fn add_image(
        &self,
        zip: &mut ZipWriter<Cursor<Vec<u8>>>,
        options: &SimpleFileOptions,
        packaged: &PackagedImage,
    ) -> Result<ManifestEntry, DfuError> {
        let init = InitCommand {
            fw_version: Some(packaged.fw_version),
            hw_version: Some(self.descriptor.hardware_version),
            sd_req: packaged.sd_req.clone(),
            fw_type: Some(packaged.fw_type.into()),
            sd_size: Some(packaged.sizes.sd.unwrap_or(0)),
            bl_size: Some(packaged.sizes.bl.unwrap_or(0)),
            app_size: Some(packaged.sizes.app.unwrap_or(0)),
            hash: Some(Hash::sha256(&packaged.image)),
            is_debug: Some(self.descriptor.debug_mode),
            boot_validation: vec![packaged.boot_validation.clone()],
        };
        let command = Command::init(init);
        let packet = match self.key {
            Some(key) => Packet::signed(command, key),
            None => Packet::unsigned(command),
        };

        let mut entry = ManifestEntry::for_stem(&packaged.stem);
        if let (FwType::SoftdeviceBootloader, Some(sd_size), Some(bl_size)) =
            (packaged.fw_type, packaged.sizes.sd, packaged.sizes.bl)
        {
            entry.info_read_only_metadata = Some(SizeInfo { bl_size, sd_size });
        }

        for (name, bytes) in [
            (&entry.bin_file, packaged.image.data().to_vec()),
            (&entry.dat_file, packet.encode_to_vec()),
        ] {
            zip.start_file(name.as_str(), *options)
                .map_err(|e| DfuError::archive(e.to_string()))?;
            zip.write_all(&bytes)
                .map_err(|e| DfuError::archive(e.to_string()))?;
        }

        debug!(
            fw_type = packaged.fw_type.name(),
            bin = %entry.bin_file,
            size = packaged.image.data().len(),
            signed = self.key.is_some(),
            "added image to package"
        );
        Ok(entry)
    }
}

fn boot_validation(
    mode: BootValidationMode,
    image: &FirmwareImage,
    key: Option<&SigningKey>,
) -> Result<BootValidation, DfuError> {
    Ok(BootValidation::new(mode, mode.validation_bytes(image, key)?))
}

/// Rename entries whose file names would collide inside the archive.
fn disambiguate_stems(images: &mut [PackagedImage]) {
    let mut seen = BTreeSet::new();
    for packaged in images.iter_mut() {
        if packaged.stem.is_empty() || seen.contains(&packaged.stem) {
            packaged.stem = format!("{}_{}", packaged.stem, packaged.fw_type.name())
                .trim_start_matches('_')
                .to_lowercase();
        }
        seen.insert(packaged.stem.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PackageRequest, Signing};
    use crate::reader::PackageContents;
    use crate::requirements::RequirementSet;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn write_bin(dir: &Path, name: &str, len: usize) -> Result<ImageReference, std::io::Error> {
        let path = dir.join(name);
        std::fs::write(&path, vec![0xA5; len])?;
        let kind = match name {
            n if n.starts_with("sd") => ImageKind::SoftStack,
            n if n.starts_with("bl") => ImageKind::Bootloader,
            _ => ImageKind::Application,
        };
        Ok(ImageReference::new(kind, path))
    }

    #[test]
    fn test_softdevice_bootloader_merged() -> TestResult {
        let dir = tempfile::tempdir()?;
        let descriptor = PackageDescriptor::assemble(PackageRequest {
            hardware_version: Some(52),
            softstack: Some(write_bin(dir.path(), "sd.bin", 300)?),
            bootloader: Some(write_bin(dir.path(), "bl.bin", 100)?),
            bootloader_version: Some(3),
            stack_requirements: Some(RequirementSet::parse("0x91")?),
            signing: Signing::Unsigned,
            ..PackageRequest::default()
        })?;

        let contents = PackageContents::from_bytes(&PackageWriter::new(&descriptor, None).build()?)?;
        let entry = contents
            .manifest
            .softdevice_bootloader
            .as_ref()
            .ok_or("missing sd_bl entry")?;
        assert_eq!(entry.bin_file, "sd_bl.bin");
        assert_eq!(
            entry.info_read_only_metadata,
            Some(SizeInfo {
                bl_size: 100,
                sd_size: 300
            })
        );

        let image = contents.images.first().ok_or("no images")?;
        let init = image.packet.init_command().ok_or("no init command")?;
        assert_eq!(init.fw_version, Some(3));
        assert_eq!(init.fw_type, Some(FwType::SoftdeviceBootloader as i32));
        assert_eq!(init.sd_size, Some(300));
        assert_eq!(init.bl_size, Some(100));
        Ok(())
    }

    #[test]
    fn test_application_with_softdevice_uses_new_ids() -> TestResult {
        let dir = tempfile::tempdir()?;
        let descriptor = PackageDescriptor::assemble(PackageRequest {
            hardware_version: Some(52),
            softstack: Some(write_bin(dir.path(), "sd.bin", 64)?),
            application: Some(write_bin(dir.path(), "app.bin", 32)?),
            application_version: Some(5),
            stack_requirements: Some(RequirementSet::parse("0x91")?),
            stack_identifiers: Some(RequirementSet::parse("0xB7")?),
            ..PackageRequest::default()
        })?;

        let contents = PackageContents::from_bytes(&PackageWriter::new(&descriptor, None).build()?)?;
        assert_eq!(contents.images.len(), 2);

        for image in &contents.images {
            let init = image.packet.init_command().ok_or("no init command")?;
            match image.key {
                "softdevice" => {
                    assert_eq!(init.sd_req, vec![0x91, 0xB7]);
                    assert_eq!(init.fw_version, Some(SOFTDEVICE_FW_VERSION));
                }
                "application" => {
                    assert_eq!(init.sd_req, vec![0xB7]);
                    assert_eq!(init.app_size, Some(32));
                }
                other => return Err(format!("unexpected entry {other}").into()),
            }
        }
        Ok(())
    }

    #[test]
    fn test_same_stem_does_not_collide() -> TestResult {
        let dir = tempfile::tempdir()?;
        let sd_dir = dir.path().join("sd");
        std::fs::create_dir(&sd_dir)?;
        let sd_path = sd_dir.join("app.bin");
        std::fs::write(&sd_path, [1u8; 16])?;

        let descriptor = PackageDescriptor::assemble(PackageRequest {
            hardware_version: Some(52),
            softstack: Some(ImageReference::new(ImageKind::SoftStack, sd_path)),
            application: Some(write_bin(dir.path(), "app.bin", 16)?),
            application_version: Some(1),
            stack_requirements: Some(RequirementSet::parse("0x91")?),
            stack_identifiers: Some(RequirementSet::parse("0x91")?),
            ..PackageRequest::default()
        })?;

        let contents = PackageContents::from_bytes(&PackageWriter::new(&descriptor, None).build()?)?;
        let app = contents.manifest.application.ok_or("missing application")?;
        let sd = contents.manifest.softdevice.ok_or("missing softdevice")?;
        assert_eq!(sd.bin_file, "app.bin");
        assert_eq!(app.bin_file, "app_application.bin");
        Ok(())
    }

    #[test]
    fn test_missing_image_writes_nothing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let descriptor = PackageDescriptor::assemble(PackageRequest {
            debug_mode: true,
            application: Some(ImageReference::new(
                ImageKind::Application,
                dir.path().join("missing.bin"),
            )),
            ..PackageRequest::default()
        })?;

        let out = dir.path().join("out.zip");
        let result = PackageWriter::new(&descriptor, None).write(&out);
        assert!(matches!(result, Err(DfuError::Io { .. })));
        assert!(!out.exists());
        Ok(())
    }
}

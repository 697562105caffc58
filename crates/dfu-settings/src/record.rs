//! The values stored in a settings page.

use dfu_crypto::SigningKey;
use dfu_errors::{DfuError, ImageKind, ValidationError};
use dfu_image::FirmwareImage;
use tracing::debug;

use crate::family::ChipFamily;
use crate::layout::{SettingsLayout, check_validation_policy};
use crate::validation::BootValidationMode;

/// Bytes reserved for the validation value of one image.
pub const VALIDATION_BYTES_LEN: usize = 64;

/// Bank code marking bank 0 as holding a valid application.
pub const BANK_VALID_APP: u32 = 1;

/// Bank code of an empty bank.
pub const BANK_INVALID: u32 = 0;

/// Validation mode of one image together with its reference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSlot {
    /// Check the bootloader performs
    pub mode: BootValidationMode,
    /// Reference value, at most [`VALIDATION_BYTES_LEN`] bytes
    pub bytes: Vec<u8>,
}

impl ValidationSlot {
    /// Slot telling the bootloader not to check the image.
    pub fn none() -> Self {
        Self {
            mode: BootValidationMode::NoValidation,
            bytes: Vec::new(),
        }
    }

    fn for_image(
        mode: BootValidationMode,
        image: &FirmwareImage,
        key: Option<&SigningKey>,
    ) -> Result<Self, DfuError> {
        Ok(Self {
            mode,
            bytes: mode.validation_bytes(image, key)?,
        })
    }
}

/// Inputs for a freshly generated settings page.
#[derive(Debug, Clone)]
pub struct SettingsRequest<'a> {
    /// Where the page goes
    pub layout: SettingsLayout,
    /// Application in flash, if any
    pub application: Option<&'a FirmwareImage>,
    /// Version of the application in flash
    pub application_version: Option<u32>,
    /// Version of the bootloader in flash
    pub bootloader_version: u32,
    /// SoftDevice in flash, if any
    pub softdevice: Option<&'a FirmwareImage>,
    /// Boot validation applied to the application
    pub application_validation: BootValidationMode,
    /// Boot validation applied to the SoftDevice
    pub softdevice_validation: BootValidationMode,
    /// Signing key for ECDSA validation
    pub key: Option<&'a SigningKey>,
}

/// Decoded or generated settings page contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    /// Family, when known from the request or the page address
    pub family: Option<ChipFamily>,
    /// Settings page address
    pub address: u32,
    /// Backup page address, `None` when no backup is written
    pub backup_address: Option<u32>,
    /// Settings structure version
    pub settings_version: u32,
    /// Application version
    pub application_version: u32,
    /// Bootloader version
    pub bootloader_version: u32,
    /// Bank layout, always single bank
    pub bank_layout: u32,
    /// Currently active bank
    pub bank_current: u32,
    /// Size of the application in bank 0
    pub application_size: u32,
    /// CRC-32 of the application in bank 0
    pub application_crc: u32,
    /// Bank 0 bank code
    pub bank_code: u32,
    /// SoftDevice size
    pub softdevice_size: u32,
    /// SoftDevice boot validation
    pub softdevice_validation: ValidationSlot,
    /// Application boot validation
    pub application_validation: ValidationSlot,
    /// Bootloader boot validation
    pub bootloader_validation: ValidationSlot,
}

impl SettingsRecord {
    /// Build the record for a new settings page.
    pub fn build(request: &SettingsRequest<'_>) -> Result<Self, DfuError> {
        check_validation_policy(
            request.application_validation,
            request.softdevice_validation,
            request.key.is_some(),
            request.softdevice.is_some(),
        )?;

        let (application_version, application_size, application_crc, bank_code, app_slot) =
            match request.application {
                Some(app) => {
                    let version = request
                        .application_version
                        .ok_or(ValidationError::MissingVersion(ImageKind::Application))?;
                    let slot = ValidationSlot::for_image(
                        request.application_validation,
                        app,
                        request.key,
                    )?;
                    (version, app.size()?, app.crc32(), BANK_VALID_APP, slot)
                }
                None => (
                    request.application_version.unwrap_or(0),
                    0,
                    0,
                    BANK_INVALID,
                    ValidationSlot::none(),
                ),
            };

        let (softdevice_size, sd_slot) = match request.softdevice {
            Some(sd) => (
                sd.size()?,
                ValidationSlot::for_image(request.softdevice_validation, sd, request.key)?,
            ),
            None => (0, ValidationSlot::none()),
        };

        let record = Self {
            family: Some(request.layout.family),
            address: request.layout.address,
            backup_address: request.layout.backup_address,
            settings_version: request.layout.family.settings_version(),
            application_version,
            bootloader_version: request.bootloader_version,
            bank_layout: 0,
            bank_current: 0,
            application_size,
            application_crc,
            bank_code,
            softdevice_size,
            softdevice_validation: sd_slot,
            application_validation: app_slot,
            bootloader_validation: ValidationSlot::none(),
        };
        debug!(?record, "built settings record");
        Ok(record)
    }
}

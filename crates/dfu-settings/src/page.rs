//! Settings page byte layout.
//!
//! All integers are stored little-endian.
//!
//! # Memory Layout
//!
//! | Offset | Size | Field                                      |
//! |--------|------|--------------------------------------------|
//! | 0x000  | 4    | CRC-32 of bytes `0x004..0x05C`             |
//! | 0x004  | 4    | settings version                           |
//! | 0x008  | 4    | application version                        |
//! | 0x00C  | 4    | bootloader version                         |
//! | 0x010  | 4    | bank layout                                |
//! | 0x014  | 4    | current bank                               |
//! | 0x018  | 4    | bank 0 image size                          |
//! | 0x01C  | 4    | bank 0 image CRC-32                        |
//! | 0x020  | 4    | bank 0 bank code                           |
//! | 0x034  | 4    | SoftDevice size                            |
//! | 0x05C  | 512  | init command (zero)                        |
//! | 0x25C  | 4    | CRC-32 of bytes `0x260..0x323`             |
//! | 0x260  | 65   | SoftDevice validation type and value       |
//! | 0x2A1  | 65   | application validation type and value      |
//! | 0x2E2  | 65   | bootloader validation type and value       |
//!
//! Version 1 pages end at `0x05C`.

use dfu_errors::ParseError;

use crate::family::ChipFamily;
use crate::record::{SettingsRecord, VALIDATION_BYTES_LEN, ValidationSlot};
use crate::validation::BootValidationMode;

const OFFSET_CRC: usize = 0x000;
const OFFSET_SETTINGS_VERSION: usize = 0x004;
const OFFSET_APP_VERSION: usize = 0x008;
const OFFSET_BL_VERSION: usize = 0x00C;
const OFFSET_BANK_LAYOUT: usize = 0x010;
const OFFSET_BANK_CURRENT: usize = 0x014;
const OFFSET_BANK0_SIZE: usize = 0x018;
const OFFSET_BANK0_CRC: usize = 0x01C;
const OFFSET_BANK0_CODE: usize = 0x020;
const OFFSET_SD_SIZE: usize = 0x034;
const OFFSET_INIT_COMMAND: usize = 0x05C;
const OFFSET_BOOT_VALIDATION_CRC: usize = 0x25C;
const OFFSET_SD_VALIDATION: usize = 0x260;
const OFFSET_APP_VALIDATION: usize = 0x2A1;
const OFFSET_BL_VALIDATION: usize = 0x2E2;

/// Size of the init command area.
pub const INIT_COMMAND_LEN: usize = 512;

/// Length of a version 1 page.
pub const PAGE_LEN_V1: usize = OFFSET_INIT_COMMAND;

/// Length of a version 2 page.
pub const PAGE_LEN_V2: usize = OFFSET_BL_VALIDATION + 1 + VALIDATION_BYTES_LEN;

/// A settings page read back from flash contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    /// Decoded values; `family` and `backup_address` are filled in by the caller
    pub record: SettingsRecord,
    /// CRC stored at offset 0
    pub crc: u32,
    /// Whether `crc` matches the page contents
    pub crc_valid: bool,
    /// Boot validation CRC and whether it matches, version 2 pages only
    pub boot_validation_crc: Option<(u32, bool)>,
}

/// Page length for a settings version.
pub fn page_len(settings_version: u32) -> usize {
    if settings_version >= 2 {
        PAGE_LEN_V2
    } else {
        PAGE_LEN_V1
    }
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    if let Some(slot) = buf.get_mut(offset..offset + 4) {
        slot.copy_from_slice(&value.to_le_bytes());
    }
}

fn get_u32(buf: &[u8], offset: usize) -> Result<u32, ParseError> {
    buf.get(offset..offset + 4)
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| ParseError::InvalidSettingsPage(format!("truncated at offset {offset:#x}")))
}

fn put_slot(buf: &mut [u8], offset: usize, slot: &ValidationSlot) {
    if let Some(code) = buf.get_mut(offset) {
        *code = slot.mode.code();
    }
    if let Some(area) = buf.get_mut(offset + 1..offset + 1 + VALIDATION_BYTES_LEN) {
        for (dst, src) in area.iter_mut().zip(&slot.bytes) {
            *dst = *src;
        }
    }
}

fn get_slot(buf: &[u8], offset: usize) -> Result<ValidationSlot, ParseError> {
    let code = *buf.get(offset).ok_or_else(|| {
        ParseError::InvalidSettingsPage(format!("truncated at offset {offset:#x}"))
    })?;
    let mode = BootValidationMode::from_code(code).ok_or_else(|| {
        ParseError::InvalidSettingsPage(format!(
            "unknown boot validation type {code} at offset {offset:#x}"
        ))
    })?;
    let len = match mode {
        BootValidationMode::NoValidation => 0,
        BootValidationMode::Crc => 4,
        BootValidationMode::Sha256 => 32,
        BootValidationMode::EcdsaP256Sha256 => VALIDATION_BYTES_LEN,
    };
    let bytes = buf
        .get(offset + 1..offset + 1 + len)
        .ok_or_else(|| ParseError::InvalidSettingsPage(format!("truncated at offset {offset:#x}")))?
        .to_vec();
    Ok(ValidationSlot { mode, bytes })
}

fn crc_of(buf: &[u8], start: usize, end: usize) -> u32 {
    buf.get(start..end).map(crc32fast::hash).unwrap_or(0)
}

/// Serialize `record` into page bytes, computing both CRCs.
pub fn encode(record: &SettingsRecord) -> Vec<u8> {
    let mut page = vec![0u8; page_len(record.settings_version)];

    put_u32(&mut page, OFFSET_SETTINGS_VERSION, record.settings_version);
    put_u32(&mut page, OFFSET_APP_VERSION, record.application_version);
    put_u32(&mut page, OFFSET_BL_VERSION, record.bootloader_version);
    put_u32(&mut page, OFFSET_BANK_LAYOUT, record.bank_layout);
    put_u32(&mut page, OFFSET_BANK_CURRENT, record.bank_current);
    put_u32(&mut page, OFFSET_BANK0_SIZE, record.application_size);
    put_u32(&mut page, OFFSET_BANK0_CRC, record.application_crc);
    put_u32(&mut page, OFFSET_BANK0_CODE, record.bank_code);
    put_u32(&mut page, OFFSET_SD_SIZE, record.softdevice_size);

    let crc = crc_of(&page, OFFSET_SETTINGS_VERSION, OFFSET_INIT_COMMAND);
    put_u32(&mut page, OFFSET_CRC, crc);

    if record.settings_version >= 2 {
        put_slot(&mut page, OFFSET_SD_VALIDATION, &record.softdevice_validation);
        put_slot(&mut page, OFFSET_APP_VALIDATION, &record.application_validation);
        put_slot(&mut page, OFFSET_BL_VALIDATION, &record.bootloader_validation);
        let crc = crc_of(&page, OFFSET_SD_VALIDATION, PAGE_LEN_V2);
        put_u32(&mut page, OFFSET_BOOT_VALIDATION_CRC, crc);
    }
    page
}

/// Decode a page located at `address`.
///
/// Trailing bytes past the page length are ignored.
pub fn decode(address: u32, bytes: &[u8]) -> Result<DecodedPage, ParseError> {
    let settings_version = get_u32(bytes, OFFSET_SETTINGS_VERSION)?;
    if settings_version == 0 || settings_version > 2 {
        return Err(ParseError::InvalidSettingsPage(format!(
            "unsupported settings version {settings_version}"
        )));
    }
    let len = page_len(settings_version);
    if bytes.len() < len {
        return Err(ParseError::InvalidSettingsPage(format!(
            "expected {len} bytes for settings version {settings_version}, found {}",
            bytes.len()
        )));
    }

    let crc = get_u32(bytes, OFFSET_CRC)?;
    let crc_valid = crc == crc_of(bytes, OFFSET_SETTINGS_VERSION, OFFSET_INIT_COMMAND);

    let (softdevice_validation, application_validation, bootloader_validation, boot_crc) =
        if settings_version >= 2 {
            let stored = get_u32(bytes, OFFSET_BOOT_VALIDATION_CRC)?;
            let computed = crc_of(bytes, OFFSET_SD_VALIDATION, PAGE_LEN_V2);
            (
                get_slot(bytes, OFFSET_SD_VALIDATION)?,
                get_slot(bytes, OFFSET_APP_VALIDATION)?,
                get_slot(bytes, OFFSET_BL_VALIDATION)?,
                Some((stored, stored == computed)),
            )
        } else {
            (
                ValidationSlot::none(),
                ValidationSlot::none(),
                ValidationSlot::none(),
                None,
            )
        };

    let record = SettingsRecord {
        family: ChipFamily::from_settings_address(address),
        address,
        backup_address: None,
        settings_version,
        application_version: get_u32(bytes, OFFSET_APP_VERSION)?,
        bootloader_version: get_u32(bytes, OFFSET_BL_VERSION)?,
        bank_layout: get_u32(bytes, OFFSET_BANK_LAYOUT)?,
        bank_current: get_u32(bytes, OFFSET_BANK_CURRENT)?,
        application_size: get_u32(bytes, OFFSET_BANK0_SIZE)?,
        application_crc: get_u32(bytes, OFFSET_BANK0_CRC)?,
        bank_code: get_u32(bytes, OFFSET_BANK0_CODE)?,
        softdevice_size: get_u32(bytes, OFFSET_SD_SIZE)?,
        softdevice_validation,
        application_validation,
        bootloader_validation,
    };

    Ok(DecodedPage {
        record,
        crc,
        crc_valid,
        boot_validation_crc: boot_crc,
    })
}

//! Settings pages as Intel HEX files.

use core::fmt;

use dfu_errors::ParseError;
use dfu_image::MemoryMap;
use tracing::{debug, warn};

use crate::layout::BACKUP_PAGE_OFFSET;
use crate::page::{self, DecodedPage};
use crate::record::SettingsRecord;

/// Encode `record` and place it, and its backup copy, in a memory map.
pub fn to_memory_map(record: &SettingsRecord) -> MemoryMap {
    let page = page::encode(record);
    let mut map = MemoryMap::new();
    map.insert(record.address, &page);
    if let Some(backup) = record.backup_address {
        map.insert(backup, &page);
    }
    map
}

/// Encode `record` as Intel HEX text.
pub fn generate(record: &SettingsRecord) -> Result<String, ParseError> {
    to_memory_map(record).to_ihex()
}

/// Read a settings page back from Intel HEX text.
///
/// The page is the segment at a family's default settings address if there is
/// one, otherwise the lowest segment. A second segment holding the same page
/// is reported as its backup.
pub fn read(text: &str) -> Result<DecodedPage, ParseError> {
    let map = MemoryMap::from_ihex(text)?;
    let candidates: Vec<(u32, &[u8])> = map
        .segments()
        .filter(|(_, d)| d.len() >= page::PAGE_LEN_V1)
        .collect();

    let (address, data) = primary_segment(&candidates)
        .ok_or_else(|| ParseError::InvalidSettingsPage("no settings page in file".into()))?;

    let mut decoded = page::decode(address, data)?;
    let len = page::page_len(decoded.record.settings_version);
    let primary = data.get(..len);

    decoded.record.backup_address = candidates
        .iter()
        .filter(|(a, _)| *a != address)
        .find(|(_, d)| d.get(..len) == primary)
        .map(|(a, _)| *a);

    if !decoded.crc_valid {
        warn!("settings page CRC mismatch at {address:#010x}");
    }
    debug!(?decoded.record, "read settings page");
    Ok(decoded)
}

/// Pick the segment holding the settings page out of `candidates`, which are
/// in address order.
///
/// The lowest segment wins unless the same page sits exactly one backup
/// offset above it; then the lower one is the default backup.
fn primary_segment<'a>(candidates: &[(u32, &'a [u8])]) -> Option<(u32, &'a [u8])> {
    if let Some(found) = candidates
        .iter()
        .find(|(a, _)| crate::ChipFamily::from_settings_address(*a).is_some())
    {
        return Some(*found);
    }

    let &(lowest, lowest_data) = candidates.first()?;
    let head = lowest_data.get(..page::PAGE_LEN_V1);
    let same_page = |d: &[u8]| d.get(..page::PAGE_LEN_V1) == head;
    let above = lowest.checked_add(BACKUP_PAGE_OFFSET);
    let primary = candidates
        .iter()
        .find(|(a, d)| Some(*a) == above && same_page(*d))
        .copied()
        .unwrap_or((lowest, lowest_data));
    Some(primary)
}

fn hex_word(f: &mut fmt::Formatter<'_>, label: &str, value: u32) -> fmt::Result {
    writeln!(f, "* {label:<26}0x{value:08X} ({value})")
}

impl fmt::Display for DecodedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.record;
        writeln!(f, "Bootloader DFU Settings:")?;
        match r.family {
            Some(family) => writeln!(f, "* {:<26}{family}", "Family:")?,
            None => writeln!(f, "* {:<26}unknown", "Family:")?,
        }
        writeln!(f, "* {:<26}0x{:08X}", "Start Address:", r.address)?;
        match r.backup_address {
            Some(backup) => writeln!(f, "* {:<26}0x{backup:08X}", "Backup Address:")?,
            None => writeln!(f, "* {:<26}none", "Backup Address:")?,
        }
        writeln!(
            f,
            "* {:<26}0x{:08X} ({})",
            "CRC:",
            self.crc,
            if self.crc_valid { "valid" } else { "INVALID" }
        )?;
        hex_word(f, "Settings Version:", r.settings_version)?;
        hex_word(f, "App Version:", r.application_version)?;
        hex_word(f, "Bootloader Version:", r.bootloader_version)?;
        hex_word(f, "Bank Layout:", r.bank_layout)?;
        hex_word(f, "Current Bank:", r.bank_current)?;
        hex_word(f, "Application Size:", r.application_size)?;
        writeln!(f, "* {:<26}0x{:08X}", "Application CRC:", r.application_crc)?;
        hex_word(f, "Bank0 Bank Code:", r.bank_code)?;
        hex_word(f, "Softdevice Size:", r.softdevice_size)?;
        if let Some((crc, valid)) = self.boot_validation_crc {
            writeln!(
                f,
                "* {:<26}0x{crc:08X} ({})",
                "Boot Validation CRC:",
                if valid { "valid" } else { "INVALID" }
            )?;
            for (label, slot) in [
                ("SD Boot Validation:", &r.softdevice_validation),
                ("App Boot Validation:", &r.application_validation),
                ("BL Boot Validation:", &r.bootloader_validation),
            ] {
                writeln!(f, "* {label:<26}{}", slot.mode)?;
                if !slot.bytes.is_empty() {
                    writeln!(f, "  {:<26}{}", "", hex::encode(&slot.bytes))?;
                }
            }
        }
        Ok(())
    }
}

//! Bootloader settings page commands

use std::path::Path;

use anyhow::Result;
use dfu_errors::{ImageKind, ResultExt};
use dfu_image::{FirmwareImage, ImageReference, write_atomically};
use dfu_settings::{BootValidationMode, SettingsLayout, SettingsRecord, SettingsRequest};
use tracing::info;

use crate::commands::{
    SettingsCommands, SettingsGenerateArgs, application_version, flatten, load_key_checked,
    require_file,
};
use crate::output;

/// Execute settings command
pub fn execute(cmd: &SettingsCommands) -> Result<()> {
    match cmd {
        SettingsCommands::Generate(args) => generate(args),
        SettingsCommands::Display { hex_file } => display(hex_file),
    }
}

fn load_image(kind: ImageKind, path: Option<&Path>) -> Result<Option<FirmwareImage>> {
    path.map(|p| -> Result<FirmwareImage> {
        let reference = ImageReference::new(kind, require_file(p)?);
        Ok(FirmwareImage::load(&reference)?)
    })
    .transpose()
}

/// Generate a settings page
fn generate(args: &SettingsGenerateArgs) -> Result<()> {
    let layout = SettingsLayout::layout(
        args.family,
        flatten(args.start_address),
        args.no_backup,
        flatten(args.backup_address),
    )?;
    for notice in &layout.notices {
        output::print_warning(&notice.to_string());
    }

    let version = application_version(args.application_version, args.application_version_string);
    let application = load_image(ImageKind::Application, args.application.as_deref())?;
    let softdevice = load_image(ImageKind::SoftStack, args.softdevice.as_deref())?;
    let key = args.key_file.as_deref().map(load_key_checked).transpose()?;

    let softdevice_validation = args
        .sd_boot_validation
        .unwrap_or(BootValidationMode::softdevice_default(softdevice.is_some()));

    let record = SettingsRecord::build(&SettingsRequest {
        layout,
        application: application.as_ref(),
        application_version: version,
        bootloader_version: args.bootloader_version,
        softdevice: softdevice.as_ref(),
        application_validation: args.app_boot_validation,
        softdevice_validation,
        key: key.as_ref(),
    })?;

    let text = dfu_settings::hex::generate(&record)?;
    write_atomically(&args.hex_file, text.as_bytes())?;
    info!(path = %args.hex_file.display(), address = record.address, "wrote settings page");

    output::print_success(&format!(
        "Generated bootloader DFU settings at {}",
        args.hex_file.display()
    ));
    let mut decoded = dfu_settings::hex::read(&text)?;
    decoded.record.family = decoded.record.family.or(record.family);
    print!("{decoded}");
    Ok(())
}

/// Show a settings page
fn display(hex_file: &Path) -> Result<()> {
    let path = require_file(hex_file)?;
    let text = std::fs::read_to_string(path).at_path(path)?;
    let decoded = dfu_settings::hex::read(&text)?;
    print!("{decoded}");
    Ok(())
}

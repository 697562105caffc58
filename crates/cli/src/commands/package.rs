//! Update package commands

use std::path::Path;

use anyhow::Result;
use dfu_errors::ImageKind;
use dfu_image::ImageReference;
use dfu_package::{PackageContents, PackageDescriptor, PackageRequest, PackageWriter, Signing};
use tracing::info;

use crate::commands::{
    PackageCommands, PackageGenerateArgs, application_version, flatten, load_key, require_file,
    single_list,
};
use crate::output;

/// Execute package command
pub fn execute(cmd: &PackageCommands) -> Result<()> {
    match cmd {
        PackageCommands::Generate(args) => generate(args),
        PackageCommands::Display { zip_file } => display(zip_file),
    }
}

fn reference(kind: ImageKind, path: Option<&Path>) -> Result<Option<ImageReference>> {
    path.map(|p| -> Result<ImageReference> { Ok(ImageReference::new(kind, require_file(p)?)) })
        .transpose()
}

/// Generate an update package
fn generate(args: &PackageGenerateArgs) -> Result<()> {
    let application = reference(ImageKind::Application, args.application.as_deref())?;
    let bootloader = reference(ImageKind::Bootloader, args.bootloader.as_deref())?;
    let softstack = reference(ImageKind::SoftStack, args.softdevice.as_deref())?;

    let stack_requirements = single_list(&args.sd_req, "sd-req")?;
    let stack_identifiers = single_list(&args.sd_id, "sd-id")?;

    let key = args.key_file.as_deref().map(load_key).transpose()?;
    let signing = match &key {
        Some(k) if k.is_insecure() => Signing::SignedWithInsecureKey,
        Some(_) => Signing::Signed,
        None => Signing::Unsigned,
    };

    let descriptor = PackageDescriptor::assemble(PackageRequest {
        debug_mode: args.debug_mode,
        hardware_version: flatten(args.hw_version),
        application,
        application_version: application_version(
            args.application_version,
            args.application_version_string,
        ),
        bootloader,
        bootloader_version: flatten(args.bootloader_version),
        softstack,
        stack_requirements,
        stack_identifiers,
        application_validation: args.app_boot_validation,
        softstack_validation: args.sd_boot_validation,
        signing,
    })?;

    output::print_package_warnings(&descriptor.warnings);

    PackageWriter::new(&descriptor, key.as_ref()).write(&args.zip_file)?;
    info!(path = %args.zip_file.display(), "wrote update package");

    output::print_success(&format!("Zip created at {}", args.zip_file.display()));
    Ok(())
}

/// Show a package
fn display(zip_file: &Path) -> Result<()> {
    let path = require_file(zip_file)?;
    let contents = PackageContents::read(path)?;
    println!("DFU Package: <{}>:", path.display());
    print!("{contents}");
    Ok(())
}

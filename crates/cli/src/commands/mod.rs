//! Command implementations for the nrfdfu CLI

pub mod keys;
pub mod package;
pub mod settings;

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use dfu_crypto::{KeyFormat, KeyKind, SigningKey};
use dfu_errors::{DfuError, ParseError, UsageError};
use dfu_package::{RequirementSet, VersionCodec, parse_int, parse_optional_int};
use dfu_settings::{BootValidationMode, ChipFamily};
use tracing::warn;

use crate::output;

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Generate a bootloader settings page as Intel HEX
    Generate(SettingsGenerateArgs),

    /// Show the contents of a settings page Intel HEX file
    Display {
        /// Settings page Intel HEX file
        hex_file: PathBuf,
    },
}

#[derive(Args)]
pub struct SettingsGenerateArgs {
    /// Output Intel HEX file
    pub hex_file: PathBuf,

    /// Chip family: NRF51, NRF52, NRF52QFAB, NRF52810 or NRF52840
    #[arg(long)]
    pub family: ChipFamily,

    /// Application image (.hex or .bin) in flash
    #[arg(long, value_name = "PATH")]
    pub application: Option<PathBuf>,

    /// Application version as an integer, or `none`
    #[arg(long, value_name = "N", value_parser = optional_int)]
    pub application_version: Option<OptionalInt>,

    /// Application version as `major.minor.patch`
    #[arg(long, value_name = "X.Y.Z", value_parser = version_string)]
    pub application_version_string: Option<u32>,

    /// Bootloader version
    #[arg(long, value_name = "N", value_parser = int)]
    pub bootloader_version: u32,

    /// Settings page address, overriding the family default
    #[arg(long, value_name = "ADDRESS", value_parser = optional_int)]
    pub start_address: Option<OptionalInt>,

    /// Do not write a backup copy of the settings page
    #[arg(long)]
    pub no_backup: bool,

    /// Backup page address, overriding one page below the settings page
    #[arg(long, value_name = "ADDRESS", value_parser = optional_int)]
    pub backup_address: Option<OptionalInt>,

    /// SoftDevice image (.hex or .bin) in flash
    #[arg(long, value_name = "PATH")]
    pub softdevice: Option<PathBuf>,

    /// Private key (PEM) for ECDSA boot validation
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// Application boot validation
    #[arg(long, value_name = "MODE", default_value_t = BootValidationMode::Crc)]
    pub app_boot_validation: BootValidationMode,

    /// SoftDevice boot validation [default: VALIDATE_GENERATED_CRC with a SoftDevice, NO_VALIDATION without]
    #[arg(long, value_name = "MODE")]
    pub sd_boot_validation: Option<BootValidationMode>,
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Generate a new P-256 private key
    Generate {
        /// Output PEM file
        key_file: PathBuf,
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the private or public half of a key
    Display(KeyDisplayArgs),
}

#[derive(Args)]
pub struct KeyDisplayArgs {
    /// Private key PEM file
    pub key_file: PathBuf,

    /// Which half of the key pair to show
    #[arg(long, value_enum)]
    pub key: KeyArg,

    /// Output format
    #[arg(long, value_enum)]
    pub format: KeyFormatArg,

    /// Write to this file instead of standard output
    #[arg(long, visible_alias = "out_file", value_name = "PATH")]
    pub out_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyArg {
    /// Public key
    Pk,
    /// Private key
    Sk,
}

impl From<KeyArg> for KeyKind {
    fn from(arg: KeyArg) -> Self {
        match arg {
            KeyArg::Pk => KeyKind::Public,
            KeyArg::Sk => KeyKind::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyFormatArg {
    /// Hexadecimal
    Hex,
    /// C source for the bootloader (public key only)
    Code,
    /// PEM
    Pem,
    /// C source that only compiles into debug bootloaders (public key only)
    Dbgcode,
}

impl From<KeyFormatArg> for KeyFormat {
    fn from(arg: KeyFormatArg) -> Self {
        match arg {
            KeyFormatArg::Hex => KeyFormat::Hex,
            KeyFormatArg::Code => KeyFormat::Code,
            KeyFormatArg::Pem => KeyFormat::Pem,
            KeyFormatArg::Dbgcode => KeyFormat::DebugCode,
        }
    }
}

#[derive(Subcommand)]
pub enum PackageCommands {
    /// Generate a DFU update package (zip)
    Generate(PackageGenerateArgs),

    /// Show the contents of a DFU update package
    Display {
        /// Package zip file
        zip_file: PathBuf,
    },
}

#[derive(Args)]
pub struct PackageGenerateArgs {
    /// Output zip file
    pub zip_file: PathBuf,

    /// Build a debug package: version checks off, unset versions defaulted
    #[arg(long)]
    pub debug_mode: bool,

    /// Application image (.hex or .bin)
    #[arg(long, value_name = "PATH")]
    pub application: Option<PathBuf>,

    /// Application version as an integer, or `none`
    #[arg(long, value_name = "N", value_parser = optional_int)]
    pub application_version: Option<OptionalInt>,

    /// Application version as `major.minor.patch`
    #[arg(long, value_name = "X.Y.Z", value_parser = version_string)]
    pub application_version_string: Option<u32>,

    /// Bootloader image (.hex or .bin)
    #[arg(long, value_name = "PATH")]
    pub bootloader: Option<PathBuf>,

    /// Bootloader version as an integer, or `none`
    #[arg(long, value_name = "N", value_parser = optional_int)]
    pub bootloader_version: Option<OptionalInt>,

    /// Hardware version the package is for, or `none`
    #[arg(long, value_name = "N", value_parser = optional_int)]
    pub hw_version: Option<OptionalInt>,

    /// Comma-separated SoftDevice firmware IDs the package may be installed over
    #[arg(long, value_name = "LIST", value_parser = requirement_list, action = clap::ArgAction::Append)]
    pub sd_req: Vec<RequirementSet>,

    /// Comma-separated firmware IDs of the SoftDevice in the package
    #[arg(long, value_name = "LIST", value_parser = requirement_list, action = clap::ArgAction::Append)]
    pub sd_id: Vec<RequirementSet>,

    /// SoftDevice image (.hex or .bin)
    #[arg(long, value_name = "PATH")]
    pub softdevice: Option<PathBuf>,

    /// Private key (PEM) used to sign the package
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// Application boot validation
    #[arg(long, value_name = "MODE", default_value_t = BootValidationMode::Crc)]
    pub app_boot_validation: BootValidationMode,

    /// SoftDevice boot validation [default: VALIDATE_GENERATED_CRC with a SoftDevice, NO_VALIDATION without]
    #[arg(long, value_name = "MODE")]
    pub sd_boot_validation: Option<BootValidationMode>,
}

/// Integer option that also accepts `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalInt(pub Option<u32>);

fn optional_int(text: &str) -> Result<OptionalInt, ParseError> {
    parse_optional_int(text).map(OptionalInt)
}

fn int(text: &str) -> Result<u32, ParseError> {
    parse_int(text)
}

fn version_string(text: &str) -> Result<u32, ParseError> {
    VersionCodec::encode(text)
}

fn requirement_list(text: &str) -> Result<RequirementSet, ParseError> {
    RequirementSet::parse(text)
}

/// Collapse an optional `none`-able integer option.
pub fn flatten(value: Option<OptionalInt>) -> Option<u32> {
    value.and_then(|v| v.0)
}

/// Pick the application version from its two spellings.
///
/// The version string wins when both are given.
pub fn application_version(number: Option<OptionalInt>, string: Option<u32>) -> Option<u32> {
    match (flatten(number), string) {
        (Some(_), Some(from_string)) => {
            warn!("both --application-version and --application-version-string given, using the string");
            output::print_warning(
                "Both --application-version and --application-version-string given, using the version string",
            );
            Some(from_string)
        }
        (number, string) => string.or(number),
    }
}

/// A list option given at most once.
pub fn single_list(
    values: &[RequirementSet],
    option: &str,
) -> Result<Option<RequirementSet>, UsageError> {
    match values {
        [] => Ok(None),
        [one] => Ok(Some(one.clone())),
        _ => Err(UsageError::RepeatedList {
            option: option.to_string(),
        }),
    }
}

/// Fail with a usage error unless `path` exists.
pub fn require_file(path: &Path) -> Result<&Path, UsageError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(UsageError::FileNotFound(path.to_path_buf()))
    }
}

/// Load the signing key at `path`.
pub fn load_key(path: &Path) -> Result<SigningKey, DfuError> {
    Ok(SigningKey::load(require_file(path)?)?)
}

/// Load the signing key at `path`, warning loudly about published keys.
pub fn load_key_checked(path: &Path) -> Result<SigningKey, DfuError> {
    let key = load_key(path)?;
    if key.is_insecure() {
        output::print_insecure_key_banner();
    }
    Ok(key)
}

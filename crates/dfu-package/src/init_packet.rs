//! Init packets in the nRF DFU "dfu-cc" protobuf schema.
//!
//! Every image in a package is preceded by an init packet telling the
//! bootloader what the image is, what it may be installed over and how to
//! check it. The packet is optionally signed.
//!
//! # Wire format
//!
//! | message         | tag | field            | type                     |
//! |-----------------|-----|------------------|--------------------------|
//! | `Packet`        | 1   | command          | `Command`, optional      |
//! |                 | 2   | signed_command   | `SignedCommand`, optional|
//! | `SignedCommand` | 1   | command          | `Command`                |
//! |                 | 2   | signature_type   | `SignatureType`          |
//! |                 | 3   | signature        | bytes                    |
//! | `Command`       | 1   | op_code          | `OpCode`                 |
//! |                 | 2   | init             | `InitCommand`            |
//! | `InitCommand`   | 1-7 | versions, sizes  | uint32, `sd_req` packed  |
//! |                 | 8   | hash             | `Hash`                   |
//! |                 | 9   | is_debug         | bool                     |
//! |                 | 10  | boot_validation  | repeated `BootValidation`|
//!
//! Hashes and signatures are stored little-endian.

use core::fmt;

use dfu_crypto::{CryptoError, PublicKey, Signature, SigningKey};
use dfu_errors::{ImageKind, ParseError};
use dfu_image::FirmwareImage;
use dfu_settings::BootValidationMode;
use prost::Message;

/// Command kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OpCode {
    /// Reset the device
    Reset = 0,
    /// Start a transfer
    Init = 1,
}

/// What the image following the packet is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum FwType {
    /// Application
    Application = 0,
    /// SoftDevice
    Softdevice = 1,
    /// Bootloader
    Bootloader = 2,
    /// SoftDevice immediately followed by bootloader
    SoftdeviceBootloader = 3,
    /// Application stored outside the bootloader's bank
    ExternalApplication = 4,
}

impl FwType {
    /// Protobuf name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            FwType::Application => "APPLICATION",
            FwType::Softdevice => "SOFTDEVICE",
            FwType::Bootloader => "BOOTLOADER",
            FwType::SoftdeviceBootloader => "SOFTDEVICE_BOOTLOADER",
            FwType::ExternalApplication => "EXTERNAL_APPLICATION",
        }
    }
}

impl From<ImageKind> for FwType {
    fn from(kind: ImageKind) -> Self {
        match kind {
            ImageKind::Application => FwType::Application,
            ImageKind::Bootloader => FwType::Bootloader,
            ImageKind::SoftStack => FwType::Softdevice,
        }
    }
}

/// Digest algorithm of [`Hash`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum HashType {
    /// No hash
    NoHash = 0,
    /// CRC-32
    Crc = 1,
    /// SHA-128
    Sha128 = 2,
    /// SHA-256
    Sha256 = 3,
    /// SHA-512
    Sha512 = 4,
}

impl HashType {
    /// Protobuf name of the hash type.
    pub const fn name(self) -> &'static str {
        match self {
            HashType::NoHash => "NO_HASH",
            HashType::Crc => "CRC",
            HashType::Sha128 => "SHA128",
            HashType::Sha256 => "SHA256",
            HashType::Sha512 => "SHA512",
        }
    }
}

/// Boot validation type as carried in the init packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ValidationType {
    /// No check
    NoValidation = 0,
    /// CRC-32
    ValidateGeneratedCrc = 1,
    /// SHA-256
    ValidateSha256 = 2,
    /// ECDSA P-256 over SHA-256
    ValidateEcdsaP256Sha256 = 3,
}

impl From<BootValidationMode> for ValidationType {
    fn from(mode: BootValidationMode) -> Self {
        match mode {
            BootValidationMode::NoValidation => ValidationType::NoValidation,
            BootValidationMode::Crc => ValidationType::ValidateGeneratedCrc,
            BootValidationMode::Sha256 => ValidationType::ValidateSha256,
            BootValidationMode::EcdsaP256Sha256 => ValidationType::ValidateEcdsaP256Sha256,
        }
    }
}

impl From<ValidationType> for BootValidationMode {
    fn from(value: ValidationType) -> Self {
        match value {
            ValidationType::NoValidation => BootValidationMode::NoValidation,
            ValidationType::ValidateGeneratedCrc => BootValidationMode::Crc,
            ValidationType::ValidateSha256 => BootValidationMode::Sha256,
            ValidationType::ValidateEcdsaP256Sha256 => BootValidationMode::EcdsaP256Sha256,
        }
    }
}

/// Signature algorithm of a [`SignedCommand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SignatureType {
    /// ECDSA P-256 over SHA-256
    EcdsaP256Sha256 = 0,
    /// Ed25519
    Ed25519 = 1,
}

impl SignatureType {
    /// Protobuf name of the signature type.
    pub const fn name(self) -> &'static str {
        match self {
            SignatureType::EcdsaP256Sha256 => "ECDSA_P256_SHA256",
            SignatureType::Ed25519 => "ED25519",
        }
    }
}

/// Image digest.
#[derive(Clone, PartialEq, Message)]
pub struct Hash {
    /// Algorithm
    #[prost(enumeration = "HashType", required, tag = "1")]
    pub hash_type: i32,
    /// Digest, little-endian
    #[prost(bytes = "vec", required, tag = "2")]
    pub hash: Vec<u8>,
}

impl Hash {
    /// SHA-256 of `image`, stored little-endian.
    pub fn sha256(image: &FirmwareImage) -> Self {
        let mut digest = image.sha256();
        digest.reverse();
        Self {
            hash_type: HashType::Sha256.into(),
            hash: digest.to_vec(),
        }
    }
}

/// One boot validation entry.
#[derive(Clone, PartialEq, Message)]
pub struct BootValidation {
    /// Check the bootloader performs
    #[prost(enumeration = "ValidationType", required, tag = "1")]
    pub validation_type: i32,
    /// Reference value
    #[prost(bytes = "vec", required, tag = "2")]
    pub bytes: Vec<u8>,
}

impl BootValidation {
    /// Entry for `mode` over `image`.
    pub fn new(mode: BootValidationMode, bytes: Vec<u8>) -> Self {
        Self {
            validation_type: ValidationType::from(mode).into(),
            bytes,
        }
    }

    /// Mode of the entry, `None` for an unknown type.
    pub fn mode(&self) -> Option<BootValidationMode> {
        ValidationType::try_from(self.validation_type)
            .ok()
            .map(BootValidationMode::from)
    }
}

/// Description of the image being transferred.
#[derive(Clone, PartialEq, Message)]
pub struct InitCommand {
    /// Firmware version
    #[prost(uint32, optional, tag = "1")]
    pub fw_version: Option<u32>,
    /// Hardware version
    #[prost(uint32, optional, tag = "2")]
    pub hw_version: Option<u32>,
    /// SoftDevice firmware IDs the image may be installed over
    #[prost(uint32, repeated, packed = "true", tag = "3")]
    pub sd_req: Vec<u32>,
    /// Image type
    #[prost(enumeration = "FwType", optional, tag = "4")]
    pub fw_type: Option<i32>,
    /// SoftDevice size
    #[prost(uint32, optional, tag = "5")]
    pub sd_size: Option<u32>,
    /// Bootloader size
    #[prost(uint32, optional, tag = "6")]
    pub bl_size: Option<u32>,
    /// Application size
    #[prost(uint32, optional, tag = "7")]
    pub app_size: Option<u32>,
    /// Digest of the image
    #[prost(message, optional, tag = "8")]
    pub hash: Option<Hash>,
    /// Skip version checks
    #[prost(bool, optional, tag = "9")]
    pub is_debug: Option<bool>,
    /// Checks applied before booting the image
    #[prost(message, repeated, tag = "10")]
    pub boot_validation: Vec<BootValidation>,
}

/// Reset request.
#[derive(Clone, PartialEq, Message)]
pub struct ResetCommand {
    /// Delay before reset
    #[prost(uint32, required, tag = "1")]
    pub timeout: u32,
}

/// Unsigned command.
#[derive(Clone, PartialEq, Message)]
pub struct Command {
    /// Kind
    #[prost(enumeration = "OpCode", optional, tag = "1")]
    pub op_code: Option<i32>,
    /// Init payload
    #[prost(message, optional, tag = "2")]
    pub init: Option<InitCommand>,
    /// Reset payload
    #[prost(message, optional, tag = "3")]
    pub reset: Option<ResetCommand>,
}

impl Command {
    /// Wrap `init` in an `INIT` command.
    pub fn init(init: InitCommand) -> Self {
        Self {
            op_code: Some(OpCode::Init.into()),
            init: Some(init),
            reset: None,
        }
    }
}

/// Command together with its signature.
#[derive(Clone, PartialEq, Message)]
pub struct SignedCommand {
    /// Signed command
    #[prost(message, required, tag = "1")]
    pub command: Command,
    /// Algorithm
    #[prost(enumeration = "SignatureType", required, tag = "2")]
    pub signature_type: i32,
    /// Signature over the encoded command, `r || s` little-endian
    #[prost(bytes = "vec", required, tag = "3")]
    pub signature: Vec<u8>,
}

/// Top-level init packet, stored as the `.dat` file of an image.
#[derive(Clone, PartialEq, Message)]
pub struct Packet {
    /// Unsigned command
    #[prost(message, optional, tag = "1")]
    pub command: Option<Command>,
    /// Signed command
    #[prost(message, optional, tag = "2")]
    pub signed_command: Option<SignedCommand>,
}

impl Packet {
    /// Packet carrying `command` without a signature.
    pub fn unsigned(command: Command) -> Self {
        Self {
            command: Some(command),
            signed_command: None,
        }
    }

    /// Packet carrying `command` signed by `key`.
    pub fn signed(command: Command, key: &SigningKey) -> Self {
        let signature = key.sign(&command.encode_to_vec());
        Self {
            command: None,
            signed_command: Some(SignedCommand {
                command,
                signature_type: SignatureType::EcdsaP256Sha256.into(),
                signature: signature.as_bytes().to_vec(),
            }),
        }
    }

    /// Decode a packet read from a package.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        Self::decode(bytes).map_err(|e| ParseError::InvalidPackage(format!("init packet: {e}")))
    }

    /// The command, signed or not.
    pub fn command(&self) -> Option<&Command> {
        self.signed_command
            .as_ref()
            .map(|s| &s.command)
            .or(self.command.as_ref())
    }

    /// The init command, if the packet carries one.
    pub fn init_command(&self) -> Option<&InitCommand> {
        self.command().and_then(|c| c.init.as_ref())
    }

    /// Check the signature against `key`.
    ///
    /// Unsigned packets fail with [`CryptoError::InvalidSignature`].
    pub fn verify(&self, key: &PublicKey) -> Result<(), CryptoError> {
        let signed = self
            .signed_command
            .as_ref()
            .ok_or(CryptoError::InvalidSignature)?;
        let signature = Signature::from_bytes(&signed.signature)?;
        key.verify(&signed.command.encode_to_vec(), &signature)
    }
}

fn enum_name<E: TryFrom<i32>>(value: i32, name: impl Fn(E) -> &'static str) -> String {
    E::try_from(value)
        .map(|e| name(e).to_string())
        .unwrap_or_else(|_e| format!("UNKNOWN({value})"))
}

fn hex_field(f: &mut fmt::Formatter<'_>, label: &str, value: Option<u32>) -> fmt::Result {
    match value {
        Some(v) => writeln!(f, "|- {label}: 0x{v:08X} ({v})"),
        None => writeln!(f, "|- {label}: none"),
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(command) = self.command() else {
            return writeln!(f, "|- empty packet");
        };

        let op_code = command
            .op_code
            .map(|op| match OpCode::try_from(op) {
                Ok(OpCode::Init) => "INIT".to_string(),
                Ok(OpCode::Reset) => "RESET".to_string(),
                Err(_e) => format!("UNKNOWN({op})"),
            })
            .unwrap_or_else(|| "none".to_string());
        writeln!(f, "|- op_code: {op_code}")?;

        match &self.signed_command {
            Some(signed) => {
                let kind = enum_name(signed.signature_type, SignatureType::name);
                writeln!(f, "|- signature_type: {kind}")?;
                writeln!(
                    f,
                    "|- signature (little-endian): {}",
                    hex::encode(&signed.signature)
                )?;
            }
            None => writeln!(f, "|- signature: none")?,
        }

        let Some(init) = command.init.as_ref() else {
            return Ok(());
        };
        writeln!(f, "|")?;
        hex_field(f, "fw_version", init.fw_version)?;
        hex_field(f, "hw_version", init.hw_version)?;
        let sd_req: Vec<String> = init.sd_req.iter().map(|id| format!("{id:#06x}")).collect();
        writeln!(f, "|- sd_req: {}", sd_req.join(", "))?;
        let fw_type = init
            .fw_type
            .map(|t| enum_name(t, FwType::name))
            .unwrap_or_else(|| "none".to_string());
        writeln!(f, "|- type: {fw_type}")?;
        writeln!(f, "|- sd_size: {}", init.sd_size.unwrap_or(0))?;
        writeln!(f, "|- bl_size: {}", init.bl_size.unwrap_or(0))?;
        writeln!(f, "|- app_size: {}", init.app_size.unwrap_or(0))?;
        writeln!(f, "|")?;
        if let Some(hash) = &init.hash {
            writeln!(f, "|- hash_type: {}", enum_name(hash.hash_type, HashType::name))?;
            writeln!(f, "|- hash (little-endian): {}", hex::encode(&hash.hash))?;
            writeln!(f, "|")?;
        }
        for entry in &init.boot_validation {
            match entry.mode() {
                Some(mode) => writeln!(f, "|- boot_validation_type: {mode}")?,
                None => writeln!(
                    f,
                    "|- boot_validation_type: UNKNOWN({})",
                    entry.validation_type
                )?,
            }
            if !entry.bytes.is_empty() {
                writeln!(
                    f,
                    "|- boot_validation_bytes (little-endian): {}",
                    hex::encode(&entry.bytes)
                )?;
            }
        }
        writeln!(f, "|- is_debug: {}", init.is_debug.unwrap_or(false))
    }
}

//! Rendering keys for operators and for bootloader source code.

use core::fmt;

use dfu_errors::{DfuError, UsageError};

use crate::ecdsa::{RAW_LEN, SCALAR_LEN, SigningKey};

/// Which half of a key pair to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Public (verification) key, `pk`
    Public,
    /// Private (signing) key, `sk`
    Private,
}

/// Output format for a displayed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// Big-endian hexadecimal
    Hex,
    /// C array for the bootloader, coordinates little-endian
    Code,
    /// C array guarded so it only compiles into debug bootloaders
    DebugCode,
    /// PEM
    Pem,
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFormat::Hex => write!(f, "hex"),
            KeyFormat::Code => write!(f, "code"),
            KeyFormat::DebugCode => write!(f, "dbgcode"),
            KeyFormat::Pem => write!(f, "pem"),
        }
    }
}

/// Render one half of `key` in `format`.
///
/// Private keys cannot be rendered as code.
pub fn render(key: &SigningKey, kind: KeyKind, format: KeyFormat) -> Result<String, DfuError> {
    match (kind, format) {
        (KeyKind::Public, KeyFormat::Hex) => Ok(hex::encode(key.public_key().raw_be())),
        (KeyKind::Public, KeyFormat::Code) => Ok(public_key_code(&key.public_key().raw_le())),
        (KeyKind::Public, KeyFormat::DebugCode) => {
            Ok(debug_guard(&public_key_code(&key.public_key().raw_le())))
        }
        (KeyKind::Public, KeyFormat::Pem) => Ok(key.public_key().to_pem()?),
        (KeyKind::Private, KeyFormat::Hex) => Ok(hex::encode(key.scalar())),
        (KeyKind::Private, KeyFormat::Pem) => Ok(key.to_pem()?),
        (KeyKind::Private, KeyFormat::Code | KeyFormat::DebugCode) => {
            Err(UsageError::PrivateKeyAsCode.into())
        }
    }
}

fn c_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02x}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn public_key_code(raw_le: &[u8; RAW_LEN]) -> String {
    let (x, y) = raw_le.split_at(SCALAR_LEN);
    format!(
        "/** @brief Public key used to verify DFU images */\n\
         __ALIGN(4) const uint8_t pk[64] =\n\
         {{\n    {},\n    {}\n}};\n",
        c_bytes(x),
        c_bytes(y)
    )
}

fn debug_guard(code: &str) -> String {
    format!(
        "/* This public key belongs to a throwaway private key that is only intended\n   \
         for debug builds of the DFU bootloader. Generate a new key pair for production. */\n\
         #ifdef NRF_DFU_DEBUG_VERSION\n\n\
         {code}\n\
         #else\n\
         #error \"Debug public key not valid for production. Generate a new key pair.\"\n\
         #endif\n"
    )
}

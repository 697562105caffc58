//! Usage error types.
//!
//! Bad, missing or conflicting command-line level input. These are reported
//! before any output file is created.

use std::path::PathBuf;

/// Command-line usage errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// A backup address was given although backup generation is disabled
    #[error("Bootloader DFU settings backup page cannot be specified if backup is disabled")]
    ConflictingBackupConfig,

    /// The settings page sits too low in flash for a default backup page
    #[error("Settings address {address:#010x} leaves no room for a backup page below it")]
    BackupUnderflow {
        /// Settings page address
        address: u32,
    },

    /// A list option was given more than once instead of as one comma-separated value
    #[error("Please specify {option} as a comma-separated list: --{option} 0xXXXX,0xYYYY,...")]
    RepeatedList {
        /// Option name without leading dashes
        option: String,
    },

    /// ECDSA boot validation was requested without a signing key
    #[error("A signing key is required for {mode} boot validation")]
    MissingSigningKey {
        /// Requested validation mode identifier
        mode: String,
    },

    /// SoftDevice boot validation was requested without a SoftDevice image
    #[error("A SoftDevice image is required for {mode} SoftDevice boot validation")]
    MissingSoftDeviceImage {
        /// Requested validation mode identifier
        mode: String,
    },

    /// An input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Private keys cannot be rendered as C code
    #[error("Displaying the private key as code is not available")]
    PrivateKeyAsCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_list_names_option() {
        let err = UsageError::RepeatedList {
            option: "sd-req".to_string(),
        };
        assert!(err.to_string().contains("--sd-req"));
    }

    #[test]
    fn test_backup_underflow_hex_address() {
        let err = UsageError::BackupUnderflow { address: 0x800 };
        assert!(err.to_string().contains("0x00000800"));
    }
}

//! Settings page placement and boot validation policy.

use std::fmt;

use dfu_errors::UsageError;
use tracing::{info, warn};

use crate::family::ChipFamily;
use crate::validation::BootValidationMode;

/// Distance between the settings page and its default backup page.
pub const BACKUP_PAGE_OFFSET: u32 = 0x1000;

/// Placement decisions the operator should hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutNotice {
    /// A backup page is written, which older bootloaders never read
    BackupPage,
    /// The backup address was derived from a custom settings address
    DefaultBackupOffset {
        /// Derived backup page address
        backup_address: u32,
    },
}

impl fmt::Display for LayoutNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutNotice::BackupPage => write!(
                f,
                "generating a settings backup page, only read by bootloaders from nRF5 SDK 15.1 and newer"
            ),
            LayoutNotice::DefaultBackupOffset { backup_address } => write!(
                f,
                "using default offset to calculate bootloader settings backup page: 0x{backup_address:08X}"
            ),
        }
    }
}

/// Where the settings page and its backup are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsLayout {
    /// Family the page is laid out for
    pub family: ChipFamily,
    /// Settings page address
    pub address: u32,
    /// Backup page address, `None` when backup generation is disabled
    pub backup_address: Option<u32>,
    /// Notices raised while placing the pages
    pub notices: Vec<LayoutNotice>,
}

impl SettingsLayout {
    /// Work out the page addresses.
    ///
    /// `custom_address` overrides the family default. Unless `no_backup` is
    /// set, the backup goes to `custom_backup` or one page below the settings
    /// page.
    pub fn layout(
        family: ChipFamily,
        custom_address: Option<u32>,
        no_backup: bool,
        custom_backup: Option<u32>,
    ) -> Result<Self, UsageError> {
        if no_backup && custom_backup.is_some() {
            return Err(UsageError::ConflictingBackupConfig);
        }

        let address = custom_address.unwrap_or(family.settings_address());
        let mut notices = Vec::new();

        let backup_address = if no_backup {
            None
        } else {
            info!("generating settings backup page");
            notices.push(LayoutNotice::BackupPage);
            match custom_backup {
                Some(backup) => Some(backup),
                None => {
                    let backup = address
                        .checked_sub(BACKUP_PAGE_OFFSET)
                        .ok_or(UsageError::BackupUnderflow { address })?;
                    if custom_address.is_some() {
                        warn!(backup, "using default backup page offset");
                        notices.push(LayoutNotice::DefaultBackupOffset {
                            backup_address: backup,
                        });
                    }
                    Some(backup)
                }
            }
        };

        Ok(Self {
            family,
            address,
            backup_address,
            notices,
        })
    }
}

/// Check that the requested validation modes can be produced.
///
/// ECDSA needs a signing key; SoftDevice validation other than
/// `NO_VALIDATION` needs the SoftDevice image.
pub fn check_validation_policy(
    application: BootValidationMode,
    softdevice: BootValidationMode,
    has_key: bool,
    has_softdevice: bool,
) -> Result<(), UsageError> {
    for mode in [application, softdevice] {
        if mode.requires_key() && !has_key {
            return Err(UsageError::MissingSigningKey {
                mode: mode.identifier().to_string(),
            });
        }
    }
    if softdevice != BootValidationMode::NoValidation && !has_softdevice {
        return Err(UsageError::MissingSoftDeviceImage {
            mode: softdevice.identifier().to_string(),
        });
    }
    Ok(())
}

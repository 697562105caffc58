//! Package request defaulting and assembly.

use core::fmt;

use dfu_errors::DfuError;
use dfu_image::ImageReference;
use dfu_settings::{BootValidationMode, check_validation_policy};
use tracing::{debug, warn};

use crate::requirements::{RequirementSet, RequirementSetReconciler};
use crate::validator::CombinationValidator;

/// Application version used in debug mode when none is given.
pub const DEBUG_APPLICATION_VERSION: u32 = 0xFFFF_FFFF;

/// Bootloader version used in debug mode when none is given.
pub const DEBUG_BOOTLOADER_VERSION: u32 = 0xFFFF_FFFF;

/// Hardware version used in debug mode when none is given.
pub const DEBUG_HARDWARE_VERSION: u32 = 0xFFFF_FFFF;

/// SoftDevice requirement used in debug mode when none is given.
pub const DEBUG_STACK_REQUIREMENT: u32 = 0xFFFE;

/// How the package will be signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signing {
    /// No key given
    #[default]
    Unsigned,
    /// Signed with a private key
    Signed,
    /// Signed with a key whose private half is publicly known
    SignedWithInsecureKey,
}

impl Signing {
    /// Whether a key is available.
    pub fn has_key(self) -> bool {
        !matches!(self, Signing::Unsigned)
    }
}

/// Conditions worth telling the operator about that do not stop assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageWarning {
    /// Version checks in the bootloader are disabled for this package
    DebugMode,
    /// The package carries no signature
    Unsigned,
    /// The signing key is publicly known
    InsecureKey,
}

impl fmt::Display for PackageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageWarning::DebugMode => write!(
                f,
                "debug mode is on: the bootloader ignores version checks for this package"
            ),
            PackageWarning::Unsigned => {
                write!(f, "no signing key given: the package will not be signed")
            }
            PackageWarning::InsecureKey => write!(
                f,
                "the signing key is publicly known and must not be used in production"
            ),
        }
    }
}

/// Everything the operator asked for, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRequest {
    /// Build a debug package
    pub debug_mode: bool,
    /// Hardware version the package is for
    pub hardware_version: Option<u32>,
    /// Application image
    pub application: Option<ImageReference>,
    /// Application version
    pub application_version: Option<u32>,
    /// Bootloader image
    pub bootloader: Option<ImageReference>,
    /// Bootloader version
    pub bootloader_version: Option<u32>,
    /// SoftDevice image
    pub softstack: Option<ImageReference>,
    /// SoftDevice firmware IDs the package may be installed over (`--sd-req`)
    pub stack_requirements: Option<RequirementSet>,
    /// Firmware IDs of the SoftDevice being installed (`--sd-id`)
    pub stack_identifiers: Option<RequirementSet>,
    /// Boot validation applied to the application
    pub application_validation: BootValidationMode,
    /// Boot validation applied to the SoftDevice, defaulted from its presence
    pub softstack_validation: Option<BootValidationMode>,
    /// Signing key availability
    pub signing: Signing,
}

/// A validated package description, ready for the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Debug package
    pub debug_mode: bool,
    /// Hardware version
    pub hardware_version: u32,
    /// Application image and its version
    pub application: Option<(ImageReference, u32)>,
    /// Bootloader image and its version
    pub bootloader: Option<(ImageReference, u32)>,
    /// SoftDevice image
    pub softstack: Option<ImageReference>,
    /// Requirement list with the new stack IDs reconciled in
    pub stack_required_ids: RequirementSet,
    /// IDs of the SoftDevice in the package, or the requirement list without one
    pub stack_new_ids: RequirementSet,
    /// Application boot validation
    pub application_validation: BootValidationMode,
    /// SoftDevice boot validation
    pub softstack_validation: BootValidationMode,
    /// Warnings raised while assembling
    pub warnings: Vec<PackageWarning>,
}

impl PackageDescriptor {
    /// Apply defaults to `request`, validate it and build the descriptor.
    ///
    /// The first violated rule is returned. No files are touched.
    pub fn assemble(request: PackageRequest) -> Result<Self, DfuError> {
        let mut request = request;
        let mut warnings = Vec::new();

        if request.debug_mode {
            apply_debug_defaults(&mut request);
            warnings.push(PackageWarning::DebugMode);
        }

        CombinationValidator::validate(&request)?;

        let has_softstack = request.softstack.is_some();
        let softstack_validation = request
            .softstack_validation
            .unwrap_or(BootValidationMode::softdevice_default(has_softstack));
        check_validation_policy(
            request.application_validation,
            softstack_validation,
            request.signing.has_key(),
            has_softstack,
        )?;

        match request.signing {
            Signing::Unsigned => warnings.push(PackageWarning::Unsigned),
            Signing::SignedWithInsecureKey => warnings.push(PackageWarning::InsecureKey),
            Signing::Signed => {}
        }

        let required = request.stack_requirements.unwrap_or_default();
        let new_ids = request
            .stack_identifiers
            .unwrap_or_else(|| required.clone());
        let stack_required_ids = RequirementSetReconciler::reconcile(&required, &new_ids);

        let application = request.application.zip(request.application_version);
        let bootloader = request.bootloader.zip(request.bootloader_version);

        for warning in &warnings {
            warn!("{warning}");
        }

        let descriptor = Self {
            debug_mode: request.debug_mode,
            hardware_version: request.hardware_version.unwrap_or(DEBUG_HARDWARE_VERSION),
            application,
            bootloader,
            softstack: request.softstack,
            stack_required_ids,
            stack_new_ids: new_ids,
            application_validation: request.application_validation,
            softstack_validation,
            warnings,
        };
        debug!(?descriptor, "assembled package descriptor");
        Ok(descriptor)
    }

    /// Whether `warning` was raised.
    pub fn has_warning(&self, warning: PackageWarning) -> bool {
        self.warnings.contains(&warning)
    }
}

fn apply_debug_defaults(request: &mut PackageRequest) {
    if request.application.is_some() {
        request
            .application_version
            .get_or_insert(DEBUG_APPLICATION_VERSION);
    }
    if request.bootloader.is_some() {
        request
            .bootloader_version
            .get_or_insert(DEBUG_BOOTLOADER_VERSION);
    }
    request.hardware_version.get_or_insert(DEBUG_HARDWARE_VERSION);
    request
        .stack_requirements
        .get_or_insert_with(|| [DEBUG_STACK_REQUIREMENT].into_iter().collect());
}

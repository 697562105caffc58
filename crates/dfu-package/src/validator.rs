//! Which image and version combinations make a valid package.

use dfu_errors::{ImageKind, ValidationError};

use crate::descriptor::PackageRequest;

/// Checks a package request against the supported combinations.
///
/// Supported: bootloader, SoftDevice or application alone, SoftDevice with
/// bootloader, SoftDevice with application, and all three. A bootloader with
/// an application but no SoftDevice must be split into two packages.
pub struct CombinationValidator;

impl CombinationValidator {
    /// Report the first rule `request` violates.
    ///
    /// Debug defaults must already have been applied.
    pub fn validate(request: &PackageRequest) -> Result<(), ValidationError> {
        let has_app = request.application.is_some();
        let has_bl = request.bootloader.is_some();
        let has_sd = request.softstack.is_some();

        if !has_app && !has_bl && !has_sd {
            return Err(ValidationError::NoImagesSpecified);
        }
        if has_bl && has_app && !has_sd {
            return Err(ValidationError::UnsupportedCombination);
        }
        if has_app && request.application_version.is_none() {
            return Err(ValidationError::MissingVersion(ImageKind::Application));
        }
        if has_bl && request.bootloader_version.is_none() {
            return Err(ValidationError::MissingVersion(ImageKind::Bootloader));
        }
        if has_app && has_sd && request.stack_identifiers.is_none() {
            return Err(ValidationError::MissingStackIdentifier);
        }
        if request.hardware_version.is_none() {
            return Err(ValidationError::MissingHardwareVersion);
        }
        if request.stack_requirements.is_none() {
            return Err(ValidationError::MissingStackRequirement);
        }
        if !has_app && request.application_version.is_some() {
            return Err(ValidationError::VersionWithoutImage(ImageKind::Application));
        }
        if !has_bl && request.bootloader_version.is_some() {
            return Err(ValidationError::VersionWithoutImage(ImageKind::Bootloader));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::RequirementSet;
    use dfu_image::ImageReference;

    fn complete() -> PackageRequest {
        PackageRequest {
            hardware_version: Some(52),
            stack_requirements: Some([0x91].into_iter().collect::<RequirementSet>()),
            ..PackageRequest::default()
        }
    }

    fn app() -> Option<ImageReference> {
        Some(ImageReference::new(ImageKind::Application, "app.hex"))
    }

    fn bl() -> Option<ImageReference> {
        Some(ImageReference::new(ImageKind::Bootloader, "bl.hex"))
    }

    fn sd() -> Option<ImageReference> {
        Some(ImageReference::new(ImageKind::SoftStack, "sd.hex"))
    }

    #[test]
    fn test_no_images() {
        assert_eq!(
            CombinationValidator::validate(&complete()),
            Err(ValidationError::NoImagesSpecified)
        );
    }

    #[test]
    fn test_bootloader_and_application_without_softdevice() {
        let request = PackageRequest {
            application: app(),
            application_version: Some(1),
            bootloader: bl(),
            bootloader_version: Some(1),
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::UnsupportedCombination)
        );
    }

    #[test]
    fn test_all_three_accepted() {
        let request = PackageRequest {
            application: app(),
            application_version: Some(1),
            bootloader: bl(),
            bootloader_version: Some(1),
            softstack: sd(),
            stack_identifiers: Some([0xB7].into_iter().collect()),
            ..complete()
        };
        assert_eq!(CombinationValidator::validate(&request), Ok(()));
    }

    #[test]
    fn test_application_needs_version() {
        let request = PackageRequest {
            application: app(),
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::MissingVersion(ImageKind::Application))
        );
    }

    #[test]
    fn test_bootloader_needs_version() {
        let request = PackageRequest {
            bootloader: bl(),
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::MissingVersion(ImageKind::Bootloader))
        );
    }

    #[test]
    fn test_softdevice_and_application_need_sd_id() {
        let request = PackageRequest {
            application: app(),
            application_version: Some(1),
            softstack: sd(),
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::MissingStackIdentifier)
        );
    }

    #[test]
    fn test_hardware_version_and_requirement_mandatory() {
        let request = PackageRequest {
            softstack: sd(),
            hardware_version: None,
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::MissingHardwareVersion)
        );

        let request = PackageRequest {
            softstack: sd(),
            stack_requirements: None,
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::MissingStackRequirement)
        );
    }

    #[test]
    fn test_version_without_image() {
        let request = PackageRequest {
            softstack: sd(),
            bootloader_version: Some(3),
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::VersionWithoutImage(ImageKind::Bootloader))
        );
    }

    #[test]
    fn test_first_violation_wins() {
        // Missing application version and hardware version: the version is reported.
        let request = PackageRequest {
            application: app(),
            hardware_version: None,
            ..complete()
        };
        assert_eq!(
            CombinationValidator::validate(&request),
            Err(ValidationError::MissingVersion(ImageKind::Application))
        );
    }
}

//! Package combination validation errors.
//!
//! One variant per rule that decides whether a requested update package can
//! be built.

use core::fmt;

/// The three kinds of firmware image an update package can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKind {
    /// User application
    Application,
    /// Secure bootloader
    Bootloader,
    /// Wireless protocol stack (SoftDevice)
    SoftStack,
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::Application => write!(f, "application"),
            ImageKind::Bootloader => write!(f, "bootloader"),
            ImageKind::SoftStack => write!(f, "softdevice"),
        }
    }
}

/// Illegal image/version/stack combinations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No image was given at all
    #[error("No application, bootloader or SoftDevice image specified")]
    NoImagesSpecified,

    /// Bootloader and application without a SoftDevice
    #[error("Invalid combination: bootloader and application without SoftDevice, use two packages instead")]
    UnsupportedCombination,

    /// An image has no version to put in its init packet
    #[error("A version is required with the {0} image")]
    MissingVersion(ImageKind),

    /// A version was given for an image that is not part of the package
    #[error("A {0} version was given without a {0} image")]
    VersionWithoutImage(ImageKind),

    /// Application and SoftDevice without the new SoftDevice ID
    #[error("--sd-id is required with SoftDevice and application images")]
    MissingStackIdentifier,

    /// No hardware version outside debug mode
    #[error("--hw-version is required")]
    MissingHardwareVersion,

    /// No SoftDevice requirement outside debug mode
    #[error("--sd-req is required")]
    MissingStackRequirement,

    /// An image converted to zero bytes
    #[error("The {0} image is empty")]
    EmptyImage(ImageKind),

    /// An image does not fit in the 32-bit size fields
    #[error("The {kind} image is too large: {size} bytes")]
    ImageTooLarge {
        /// Offending image
        kind: ImageKind,
        /// Size in bytes
        size: usize,
    },
}

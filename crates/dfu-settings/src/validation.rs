//! Boot validation modes and the bytes the bootloader checks them against.

use core::fmt;
use core::str::FromStr;

use dfu_crypto::SigningKey;
use dfu_errors::{ParseError, UsageError};
use dfu_image::FirmwareImage;

/// How the bootloader checks an image before booting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BootValidationMode {
    /// No check
    NoValidation,
    /// CRC-32 of the image
    #[default]
    Crc,
    /// SHA-256 digest of the image
    Sha256,
    /// ECDSA P-256 signature over the SHA-256 digest of the image
    EcdsaP256Sha256,
}

impl BootValidationMode {
    /// Every mode, ordered by on-flash code.
    pub const ALL: [BootValidationMode; 4] = [
        BootValidationMode::NoValidation,
        BootValidationMode::Crc,
        BootValidationMode::Sha256,
        BootValidationMode::EcdsaP256Sha256,
    ];

    /// Identifier used on the command line and in output.
    pub const fn identifier(self) -> &'static str {
        match self {
            BootValidationMode::NoValidation => "NO_VALIDATION",
            BootValidationMode::Crc => "VALIDATE_GENERATED_CRC",
            BootValidationMode::Sha256 => "VALIDATE_GENERATED_SHA256",
            BootValidationMode::EcdsaP256Sha256 => "VALIDATE_ECDSA_P256_SHA256",
        }
    }

    /// Code stored in the settings page and the init packet.
    pub const fn code(self) -> u8 {
        match self {
            BootValidationMode::NoValidation => 0,
            BootValidationMode::Crc => 1,
            BootValidationMode::Sha256 => 2,
            BootValidationMode::EcdsaP256Sha256 => 3,
        }
    }

    /// Mode for an on-flash code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    /// Mode applied to the SoftDevice when none is requested.
    ///
    /// Without a SoftDevice image there is nothing to validate.
    pub const fn softdevice_default(has_softdevice: bool) -> Self {
        if has_softdevice {
            BootValidationMode::Crc
        } else {
            BootValidationMode::NoValidation
        }
    }

    /// Whether producing the validation bytes needs a signing key.
    pub const fn requires_key(self) -> bool {
        matches!(self, BootValidationMode::EcdsaP256Sha256)
    }

    /// Bytes the bootloader compares against for `image`.
    ///
    /// CRC-32 is stored little-endian and the SHA-256 digest byte-reversed,
    /// matching how the bootloader reads them. Signatures use the
    /// little-endian `r || s` layout.
    pub fn validation_bytes(
        self,
        image: &FirmwareImage,
        key: Option<&SigningKey>,
    ) -> Result<Vec<u8>, UsageError> {
        match self {
            BootValidationMode::NoValidation => Ok(Vec::new()),
            BootValidationMode::Crc => Ok(image.crc32().to_le_bytes().to_vec()),
            BootValidationMode::Sha256 => {
                let mut digest = image.sha256();
                digest.reverse();
                Ok(digest.to_vec())
            }
            BootValidationMode::EcdsaP256Sha256 => {
                let key = key.ok_or_else(|| UsageError::MissingSigningKey {
                    mode: self.identifier().to_string(),
                })?;
                Ok(key.sign(image.data()).as_bytes().to_vec())
            }
        }
    }
}

impl fmt::Display for BootValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for BootValidationMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.identifier().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let expected = Self::ALL.map(BootValidationMode::identifier).join(", ");
                ParseError::unknown_identifier("boot validation", s, expected)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfu_image::ImageKind;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_identifiers_and_codes() -> TestResult {
        for (code, mode) in BootValidationMode::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(mode.code()), code);
            assert_eq!(mode.identifier().parse::<BootValidationMode>()?, mode);
            assert_eq!(BootValidationMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(BootValidationMode::from_code(4), None);
        Ok(())
    }

    #[test]
    fn test_default_is_crc() {
        assert_eq!(BootValidationMode::default(), BootValidationMode::Crc);
    }

    #[test]
    fn test_softdevice_default_depends_on_image() {
        assert_eq!(
            BootValidationMode::softdevice_default(true),
            BootValidationMode::Crc
        );
        assert_eq!(
            BootValidationMode::softdevice_default(false),
            BootValidationMode::NoValidation
        );
    }

    #[test]
    fn test_unknown_identifier() {
        assert!(matches!(
            "VALIDATE_MD5".parse::<BootValidationMode>(),
            Err(ParseError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn test_validation_bytes() -> TestResult {
        let image = FirmwareImage::from_bytes(ImageKind::Application, b"123456789".to_vec());

        assert!(
            BootValidationMode::NoValidation
                .validation_bytes(&image, None)?
                .is_empty()
        );
        assert_eq!(
            BootValidationMode::Crc.validation_bytes(&image, None)?,
            vec![0x26, 0x39, 0xF4, 0xCB]
        );

        let sha = BootValidationMode::Sha256.validation_bytes(&image, None)?;
        assert_eq!(sha.len(), 32);
        assert_eq!(sha.first(), Some(&0x25));
        Ok(())
    }

    #[test]
    fn test_ecdsa_needs_key() -> TestResult {
        let image = FirmwareImage::from_bytes(ImageKind::Application, vec![0xAB; 64]);

        assert!(matches!(
            BootValidationMode::EcdsaP256Sha256.validation_bytes(&image, None),
            Err(UsageError::MissingSigningKey { .. })
        ));

        let key = SigningKey::generate();
        let bytes = BootValidationMode::EcdsaP256Sha256.validation_bytes(&image, Some(&key))?;
        let signature = dfu_crypto::Signature::from_bytes(&bytes)?;
        key.public_key().verify(image.data(), &signature)?;
        Ok(())
    }
}

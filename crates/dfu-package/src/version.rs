//! Dotted version strings packed into one integer.
//!
//! `"major.minor.patch"` becomes `major * 10000 + minor * 100 + patch`.
//! Components are not clamped, so a minor or patch above 99 carries into the
//! next group: `"1.100.0"` encodes to the same value as `"2.0.0"`. Bootloaders
//! in the field compare versions produced this way, so the carry is kept.
//! Decoding recovers the original string only when every component is below
//! 100.

use dfu_errors::ParseError;

const FIELD: &str = "version string";

/// Converts between version strings and the integers stored on the device.
pub struct VersionCodec;

impl VersionCodec {
    /// Encode `"x.y.z"`.
    pub fn encode(text: &str) -> Result<u32, ParseError> {
        let parts: Vec<&str> = text.split('.').collect();
        let &[major, minor, patch] = parts.as_slice() else {
            return Err(ParseError::bad_format(
                FIELD,
                text,
                "must be on the format x.y.z",
            ));
        };

        let component = |part: &str| -> Result<u64, ParseError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::bad_format(
                    FIELD,
                    text,
                    "components must be non-negative decimal integers",
                ));
            }
            part.parse::<u64>()
                .map_err(|_e| ParseError::overflow(FIELD, text))
        };

        let (major, minor, patch) = (component(major)?, component(minor)?, component(patch)?);
        major
            .checked_mul(10_000)
            .and_then(|v| v.checked_add(minor.checked_mul(100)?))
            .and_then(|v| v.checked_add(patch))
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ParseError::overflow(FIELD, text))
    }

    /// Render an encoded version as `"x.y.z"`.
    pub fn decode(value: u32) -> String {
        format!("{}.{}.{}", value / 10_000, (value / 100) % 100, value % 100)
    }
}

//! Parse error types.
//!
//! Raised for malformed numbers, version strings, ID lists, enumerated
//! identifiers and input files (Intel HEX, settings pages, packages).

/// Input parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Value does not have the expected shape
    #[error("Invalid format for {field} '{value}': {reason}")]
    BadFormat {
        /// Option or field being parsed
        field: String,
        /// The offending input
        value: String,
        /// What was expected
        reason: String,
    },

    /// Not a valid decimal, octal or `0x`-prefixed hex integer
    #[error("{0} is not a valid integer")]
    InvalidInteger(String),

    /// Value does not fit the target integer width
    #[error("{field} value '{value}' does not fit in 32 bits")]
    Overflow {
        /// Option or field being parsed
        field: String,
        /// The offending input
        value: String,
    },

    /// Identifier is not one of the accepted names
    #[error("Invalid value '{value}' for {field}, expected one of: {expected}")]
    UnknownIdentifier {
        /// Option or field being parsed
        field: String,
        /// The offending input
        value: String,
        /// Accepted names
        expected: String,
    },

    /// Malformed Intel HEX input
    #[error("Invalid Intel HEX data: {0}")]
    InvalidHex(String),

    /// Settings page could not be decoded
    #[error("Invalid settings page: {0}")]
    InvalidSettingsPage(String),

    /// Package archive content could not be decoded
    #[error("Invalid package: {0}")]
    InvalidPackage(String),
}

impl ParseError {
    /// Create a bad format error.
    pub fn bad_format(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ParseError::BadFormat {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid integer error.
    pub fn invalid_integer(value: impl Into<String>) -> Self {
        ParseError::InvalidInteger(value.into())
    }

    /// Create an overflow error.
    pub fn overflow(field: impl Into<String>, value: impl Into<String>) -> Self {
        ParseError::Overflow {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an unknown identifier error.
    pub fn unknown_identifier(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ParseError::UnknownIdentifier {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_format_message() {
        let err = ParseError::bad_format("version string", "1.2", "must be on the format x.y.z");
        let msg = err.to_string();
        assert!(msg.contains("1.2"));
        assert!(msg.contains("x.y.z"));
    }

    #[test]
    fn test_invalid_integer_message() {
        assert_eq!(
            ParseError::invalid_integer("0xG1").to_string(),
            "0xG1 is not a valid integer"
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            ParseError::overflow("sd-req", "0x1FFFFFFFF"),
            ParseError::overflow("sd-req", "0x1FFFFFFFF")
        );
    }
}

//! Top-level error type and classification.

use core::fmt;
use std::path::{Path, PathBuf};

use crate::{ParseError, UsageError, ValidationError};

/// Top-level error type wrapping every failure the tool can report.
#[derive(Debug, thiserror::Error)]
pub enum DfuError {
    /// Bad, missing or conflicting command-line input
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// Malformed numeric, version, list or file input
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Illegal image/version/stack combination
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Signing key could not be loaded, generated or used
    #[error("Key error: {0}")]
    Key(String),

    /// Archive could not be written or read
    #[error("Archive error: {0}")]
    Archive(String),

    /// I/O failure on a specific file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File the operation was acting on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl DfuError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DfuError::Usage(_) => ErrorCategory::Usage,
            DfuError::Parse(_) => ErrorCategory::Parse,
            DfuError::Validation(_) => ErrorCategory::Validation,
            DfuError::Key(_) => ErrorCategory::Key,
            DfuError::Archive(_) | DfuError::Io { .. } => ErrorCategory::IO,
        }
    }

    /// Create a key error with a message.
    pub fn key(msg: impl Into<String>) -> Self {
        DfuError::Key(msg.into())
    }

    /// Create an archive error with a message.
    pub fn archive(msg: impl Into<String>) -> Self {
        DfuError::Archive(msg.into())
    }

    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DfuError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Command-line usage errors
    Usage = 0,
    /// Input parsing errors
    Parse = 1,
    /// Package combination errors
    Validation = 2,
    /// Signing key errors
    Key = 3,
    /// File system and archive errors
    IO = 4,
}

impl ErrorCategory {
    /// Process exit code used by the command-line tool for this category.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Usage => 2,
            ErrorCategory::Parse => 3,
            ErrorCategory::Validation => 4,
            ErrorCategory::Key => 5,
            ErrorCategory::IO => 6,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Usage => write!(f, "Usage"),
            ErrorCategory::Parse => write!(f, "Parse"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Key => write!(f, "Key"),
            ErrorCategory::IO => write!(f, "IO"),
        }
    }
}

/// Extension trait attaching the offending path to I/O results.
pub trait ResultExt<T> {
    /// Convert an I/O failure into [`DfuError::Io`] for `path`.
    fn at_path(self, path: &Path) -> Result<T, DfuError>;
}

impl<T> ResultExt<T> for std::io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T, DfuError> {
        self.map_err(|e| DfuError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageKind;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Usage.to_string(), "Usage");
        assert_eq!(ErrorCategory::Validation.to_string(), "Validation");
        assert_eq!(ErrorCategory::IO.to_string(), "IO");
    }

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let codes = [
            ErrorCategory::Usage.exit_code(),
            ErrorCategory::Parse.exit_code(),
            ErrorCategory::Validation.exit_code(),
            ErrorCategory::Key.exit_code(),
            ErrorCategory::IO.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_dfu_error_category() {
        let err: DfuError = ValidationError::MissingVersion(ImageKind::Bootloader).into();
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: DfuError = UsageError::ConflictingBackupConfig.into();
        assert_eq!(err.category(), ErrorCategory::Usage);

        let err = DfuError::archive("truncated");
        assert_eq!(err.category(), ErrorCategory::IO);
    }

    #[test]
    fn test_at_path_keeps_source() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.at_path(Path::new("app.hex"));
        assert!(matches!(
            err,
            Err(DfuError::Io { ref path, ref source })
                if *path == PathBuf::from("app.hex") && source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_dfu_error_is_std_error() {
        let err: DfuError = ParseError::invalid_integer("0xZZ").into();
        let _: &dyn std::error::Error = &err;
    }
}

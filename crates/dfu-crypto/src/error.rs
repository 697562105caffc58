//! Error types for key handling and signing

use dfu_errors::DfuError;
use thiserror::Error;

/// Cryptographic operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature does not match the data and key
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key material could not be decoded or encoded
    #[error("Key format error: {0}")]
    KeyFormatError(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid signature length
    #[error("Invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidSignatureLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },
}

impl From<p256::elliptic_curve::Error> for CryptoError {
    fn from(e: p256::elliptic_curve::Error) -> Self {
        CryptoError::KeyFormatError(e.to_string())
    }
}

impl From<CryptoError> for DfuError {
    fn from(e: CryptoError) -> Self {
        DfuError::key(e.to_string())
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = std::result::Result<T, CryptoError>;

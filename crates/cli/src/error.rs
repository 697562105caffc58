//! Error types and exit codes for the nrfdfu CLI

use dfu_crypto::CryptoError;
use dfu_errors::{DfuError, ErrorCategory, ParseError, UsageError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Confirmation prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Process exit code for a failed command.
///
/// Library errors map through their category; anything else exits with 1.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(category)
        .map(ErrorCategory::exit_code)
        .unwrap_or(1)
}

fn category(cause: &(dyn std::error::Error + 'static)) -> Option<ErrorCategory> {
    if let Some(e) = cause.downcast_ref::<DfuError>() {
        Some(e.category())
    } else if cause.is::<UsageError>() {
        Some(ErrorCategory::Usage)
    } else if cause.is::<ParseError>() {
        Some(ErrorCategory::Parse)
    } else if cause.is::<ValidationError>() {
        Some(ErrorCategory::Validation)
    } else if cause.is::<CryptoError>() {
        Some(ErrorCategory::Key)
    } else {
        None
    }
}

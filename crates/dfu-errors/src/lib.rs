//! Error taxonomy for the nrfdfu tool
//!
//! Every library crate in the workspace reports failures through the types in
//! this crate so that the command-line front end can classify them and pick an
//! exit code without knowing where they came from.
//!
//! # Architecture
//!
//! - [`common`]: the top-level [`DfuError`], its [`ErrorCategory`] and the
//!   [`ResultExt`] helper for attaching file paths to I/O failures
//! - [`usage`]: bad, missing or conflicting command-line input
//! - [`parse`]: malformed numbers, version strings, lists and input files
//! - [`validation`]: illegal image/version/stack combinations
//!
//! All detected problems are fatal to the current invocation. Nothing here is
//! retried.
//!
//! # Example
//!
//! ```
//! use dfu_errors::prelude::*;
//!
//! fn require_images(count: usize) -> Result<()> {
//!     if count == 0 {
//!         return Err(ValidationError::NoImagesSpecified.into());
//!     }
//!     Ok(())
//! }
//!
//! let err = require_images(0).unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Validation);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod parse;
pub mod prelude;
pub mod usage;
pub mod validation;

pub use common::{DfuError, ErrorCategory, ResultExt};
pub use parse::ParseError;
pub use usage::UsageError;
pub use validation::{ImageKind, ValidationError};

/// A specialized `Result` type for nrfdfu operations.
pub type Result<T> = std::result::Result<T, DfuError>;

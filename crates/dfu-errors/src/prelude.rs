//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use dfu_errors::prelude::*;
//!
//! fn parse_family(name: &str) -> Result<u32> {
//!     match name {
//!         "NRF52" => Ok(0x0007_F000),
//!         other => Err(ParseError::unknown_identifier("family", other, "NRF52").into()),
//!     }
//! }
//!
//! assert!(parse_family("NRF53").is_err());
//! ```

pub use crate::{
    Result,
    common::{DfuError, ErrorCategory, ResultExt},
    parse::ParseError,
    usage::UsageError,
    validation::{ImageKind, ValidationError},
};

//! Bootloader DFU settings for nrfdfu
//!
//! The bootloader keeps a settings page at a fixed flash address recording
//! which images are installed, their versions and how to validate them before
//! boot. This crate decides where that page goes and what it contains.
//!
//! # Architecture
//!
//! - [`family`]: chip families and their default settings page address
//! - [`layout`]: settings and backup page placement, validation policy
//! - [`validation`]: boot validation modes and their reference values
//! - [`record`]: the values stored in a page
//! - [`page`]: the byte layout, with CRCs
//! - [`hex`]: Intel HEX output and read-back
//!
//! # Example
//!
//! ```
//! use dfu_settings::{ChipFamily, SettingsLayout};
//!
//! let layout = SettingsLayout::layout(ChipFamily::Nrf52, None, false, None)?;
//! assert_eq!(layout.address, 0x0007_F000);
//! assert_eq!(layout.backup_address, Some(0x0007_E000));
//! # Ok::<(), dfu_errors::UsageError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod family;
pub mod hex;
pub mod layout;
pub mod page;
pub mod record;
pub mod validation;

pub use family::ChipFamily;
pub use layout::{BACKUP_PAGE_OFFSET, LayoutNotice, SettingsLayout, check_validation_policy};
pub use page::DecodedPage;
pub use record::{SettingsRecord, SettingsRequest, ValidationSlot};
pub use validation::BootValidationMode;

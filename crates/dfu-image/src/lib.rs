//! Firmware image handling for nrfdfu
//!
//! This crate knows how to turn the files an operator points at into the
//! flat binaries that end up in update packages and settings pages:
//!
//! - [`reference`]: what kind of image a file is and where it lives
//! - [`firmware`]: loading `.bin` and Intel HEX images, hashing them
//! - [`memory`]: sparse memory maps read from and written to Intel HEX
//! - [`staging`]: all-or-nothing output files
//!
//! # Example
//!
//! ```
//! use dfu_image::MemoryMap;
//!
//! let mut map = MemoryMap::new();
//! map.insert(0x0007_F000, &[0x01, 0x02, 0x03, 0x04]);
//! let text = map.to_ihex()?;
//! let back = MemoryMap::from_ihex(&text)?;
//! assert_eq!(back.read(0x0007_F000, 4), Some(vec![1, 2, 3, 4]));
//! # Ok::<(), dfu_errors::ParseError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod firmware;
pub mod memory;
pub mod reference;
pub mod staging;

pub use dfu_errors::ImageKind;
pub use firmware::{FirmwareImage, MBR_SIZE, UICR_BASE};
pub use memory::MemoryMap;
pub use reference::ImageReference;
pub use staging::write_atomically;

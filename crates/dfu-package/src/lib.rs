//! Signed nRF DFU update packages
//!
//! Turns the images, versions and SoftDevice compatibility lists an operator
//! supplies into a validated [`PackageDescriptor`], then into a zip package
//! holding one binary and one init packet per image plus a manifest.
//!
//! # Architecture
//!
//! - [`numeric`]: integer options in hex, octal or decimal
//! - [`version`]: `major.minor.patch` strings as a single integer
//! - [`requirements`]: SoftDevice ID lists and their reconciliation
//! - [`validator`]: which image combinations form a valid package
//! - [`descriptor`]: defaulting and assembly of the package description
//! - [`init_packet`]: the protobuf init packet and its signature
//! - [`manifest`]: `manifest.json`
//! - [`writer`] / [`reader`]: the zip archive
//!
//! Validation completes before any file is read, and the archive is built in
//! memory before it is written.
//!
//! # Example
//!
//! ```
//! use dfu_package::{RequirementSet, RequirementSetReconciler, VersionCodec};
//!
//! assert_eq!(VersionCodec::encode("2.7.31")?, 20731);
//! assert_eq!(VersionCodec::decode(20731), "2.7.31");
//!
//! let required = RequirementSet::parse("0x91")?;
//! let new_ids = RequirementSet::parse("0x95")?;
//! let merged = RequirementSetReconciler::reconcile(&required, &new_ids);
//! assert_eq!(merged.as_slice(), &[0x91, 0x95]);
//! # Ok::<(), dfu_errors::ParseError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod descriptor;
pub mod init_packet;
pub mod manifest;
pub mod numeric;
pub mod prelude;
pub mod reader;
pub mod requirements;
pub mod validator;
pub mod version;
pub mod writer;

pub use descriptor::{PackageDescriptor, PackageRequest, PackageWarning, Signing};
pub use init_packet::Packet;
pub use manifest::Manifest;
pub use numeric::{parse_int, parse_optional_int};
pub use reader::{PackageContents, PackageImage};
pub use requirements::{RequirementSet, RequirementSetReconciler};
pub use validator::CombinationValidator;
pub use version::VersionCodec;
pub use writer::PackageWriter;

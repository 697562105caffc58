//! P-256 signing keys for nrfdfu
//!
//! This crate provides ECDSA P-256 support for:
//! - Generating and storing signing keys
//! - Signing init packets so the bootloader can authenticate updates
//! - Rendering public keys for inclusion in bootloader builds
//!
//! # Architecture
//!
//! - [`ecdsa`]: keys, signatures, nRF byte order
//! - [`display`]: hex, PEM and C source renderings of a key
//! - [`error`]: Error types for cryptographic operations
//!
//! # Security Considerations
//!
//! - Key generation uses `OsRng`
//! - The development key in [`ecdsa::DEVELOPMENT_SCALAR`] is public; keys
//!   equal to it are flagged by [`SigningKey::is_insecure`]
//!
//! # Example
//!
//! ```
//! use dfu_crypto::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = SigningKey::generate();
//! let signature = key.sign(b"init command");
//! key.public_key().verify(b"init command", &signature)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod display;
pub mod ecdsa;
pub mod error;
pub mod prelude;

pub use display::{KeyFormat, KeyKind, render};
pub use ecdsa::{PublicKey, Signature, SigningKey};
pub use error::{CryptoError, CryptoResult};

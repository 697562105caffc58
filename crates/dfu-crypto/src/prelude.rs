//! Prelude for dfu-crypto
//!
//! # Example
//!
//! ```
//! use dfu_crypto::prelude::*;
//!
//! let key = SigningKey::generate();
//! assert!(!key.is_insecure());
//! ```

pub use crate::display::{KeyFormat, KeyKind, render};
pub use crate::ecdsa::{PublicKey, Signature, SigningKey};
pub use crate::error::{CryptoError, CryptoResult};

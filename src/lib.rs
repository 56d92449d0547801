#![deny(missing_docs)]

//! A library for converting Bcrypt password hashes between the
//! [Modular Crypt Format](https://passlib.readthedocs.io/en/stable/modular_crypt_format.html)
//! (MCF) string produced by `crypt(3)` and most Bcrypt libraries, and a compact binary form
//! called BMCF.
//!
//! An MCF Bcrypt hash is 60 characters of text:
//!
//! _$2y$14$i5btSOiulHhaPHPbgNUGdObga/GC.AVG/y5HHY1ra7L0C9dpCaw8u_
//!
//! The same hash in BMCF is 40 bytes. The first byte carries the scheme (`2`, `2a`, `2x`, or
//! `2y`) in its three most significant bits and the cost in its five least significant bits.
//! The 16-byte salt and the 23-byte digest follow as raw bytes. Conversion is lossless in both
//! directions, so BMCF can be stored in a `BINARY(40)` column and turned back into the string
//! that password verification libraries expect.
//!
//! This crate neither computes nor verifies hashes. It only re-serializes hashes that have
//! already been computed.
//!
//! # Examples
//!
//! Convert an MCF hash to BMCF and back:
//!
//! ```rust
//! let mcf = "$2y$14$i5btSOiulHhaPHPbgNUGdObga/GC.AVG/y5HHY1ra7L0C9dpCaw8u";
//!
//! let bmcf = mcf_hash::decode(mcf).unwrap();
//! assert_eq!(bmcf.len(), 40);
//! assert_eq!(bmcf[0], 0x80 | 14);
//!
//! assert_eq!(mcf_hash::encode(&bmcf).unwrap(), mcf);
//! ```
//!
//! Inspect the parts of a hash:
//!
//! ```rust
//! use mcf_hash::{BinaryHash, Scheme};
//! use std::str::FromStr;
//!
//! let hash = BinaryHash::from_str(
//!     "$2a$04$EGdrhbKUv8Oc9vGiXX0HQOxSg445d458Muh7DAHskb6QbtCvdxcie",
//! )
//! .unwrap();
//!
//! assert_eq!(hash.scheme(), Scheme::Bcrypt2a);
//! assert_eq!(hash.cost(), 4);
//! assert_eq!(hash.salt_bytes().len(), 16);
//! assert_eq!(hash.as_bytes().len(), 23);
//! ```
//!
//! Hashes of other schemes are rejected:
//!
//! ```rust
//! use mcf_hash::McfError;
//!
//! let sha256_crypt = "$5$rounds=5000$saltstring$5B8vYYiY.CVt1RlTTf8KbXBH3hsxY/GNooZF";
//!
//! assert!(matches!(
//!     mcf_hash::decode(sha256_crypt),
//!     Err(McfError::UnsupportedScheme(_))
//! ));
//! ```
//!
//! The cost field of a BMCF header only has 5 bits. By default, a cost from 32 to 99 is
//! truncated to its low 5 bits when decoding. Use a [`Codec`] with strict cost checking to
//! reject such hashes instead:
//!
//! ```rust
//! use mcf_hash::{Codec, McfError};
//!
//! let mcf = "$2y$40$i5btSOiulHhaPHPbgNUGdObga/GC.AVG/y5HHY1ra7L0C9dpCaw8u";
//!
//! assert_eq!(mcf_hash::decode(mcf).unwrap()[0], 0x80 | 8);
//!
//! let codec = Codec::new().strict_cost(true);
//! assert!(matches!(codec.decode(mcf), Err(McfError::InvalidCost(_))));
//! ```

pub mod bcrypt64;
mod codec;
mod error;
mod lexer;
pub mod scheme;

pub use codec::{BinaryHash, Codec};
pub use error::McfError;
pub use scheme::Scheme;

/// Length of a Bcrypt salt, in bytes
pub const SALT_LEN: usize = 16;

/// Length of a Bcrypt digest, in bytes. Bcrypt computes 24 bytes but only 23 are kept.
pub const DIGEST_LEN: usize = 23;

/// Length of a binary Bcrypt hash: the header byte, the salt, and the digest
pub const BMCF_LEN: usize = 1 + SALT_LEN + DIGEST_LEN;

/// The shortest byte sequence [`encode()`] will examine before rejecting it as malformed
pub const MIN_BMCF_LEN: usize = 13;

/// Length of the Bcrypt-base64-encoded salt in an MCF hash string
pub const SALT_ENCODED_LEN: usize = 22;

/// Length of the Bcrypt-base64-encoded digest in an MCF hash string
pub const DIGEST_ENCODED_LEN: usize = 31;

/// Length of the salt and digest together in an MCF hash string
pub const PAYLOAD_LEN: usize = SALT_ENCODED_LEN + DIGEST_ENCODED_LEN;

/// The highest cost a BMCF header can hold
pub const MAX_COST: u8 = 31;

/// Bits of the BMCF header byte that identify the scheme
pub const SCHEME_MASK: u8 = 0xE0;

/// Bits of the BMCF header byte that hold the cost
pub const COST_MASK: u8 = 0x1F;

/// Converts an MCF hash string into BMCF bytes using the default [`Codec`].
///
/// # Errors
///
/// * [`McfError::InvalidInput`] if `mcf` is empty
/// * [`McfError::UnsupportedScheme`] if `mcf` does not start with a registered Bcrypt scheme
///   such as `$2y$`
/// * [`McfError::InvalidCost`] if the cost is not two decimal digits
/// * [`McfError::InvalidHash`] if the salt and digest are not 53 characters long
/// * [`McfError::InvalidEncoding`] if the salt or digest is not valid Bcrypt base64
pub fn decode(mcf: &str) -> Result<[u8; BMCF_LEN], McfError> {
    Codec::default().decode(mcf)
}

/// Converts BMCF bytes into an MCF hash string using the default [`Codec`].
///
/// # Errors
///
/// * [`McfError::InvalidInput`] if `bmcf` is shorter than [`MIN_BMCF_LEN`] bytes
/// * [`McfError::UnsupportedScheme`] if the header byte does not identify a registered scheme
/// * [`McfError::InvalidHash`] if `bmcf` is not exactly [`BMCF_LEN`] bytes long
pub fn encode(bmcf: &[u8]) -> Result<String, McfError> {
    Codec::default().encode(bmcf)
}

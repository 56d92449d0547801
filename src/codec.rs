use crate::bcrypt64;
use crate::error::McfError;
use crate::lexer::TokenizedHash;
use crate::scheme::Scheme;
use crate::{BMCF_LEN, COST_MASK, DIGEST_LEN, MAX_COST, MIN_BMCF_LEN, SALT_LEN, SCHEME_MASK};

use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Options for converting between MCF strings and BMCF bytes.
///
/// The defaults reproduce the behavior of [`decode()`](crate::decode) and
/// [`encode()`](crate::encode). The only option concerns costs that are written with two
/// digits but do not fit into the 5-bit cost field of the BMCF header (32 to 99). By default
/// such a cost is truncated to its low five bits, which means the binary hash no longer
/// describes the same cost as the string it came from. Enabling [`strict_cost()`] rejects
/// those hashes instead.
///
/// [`strict_cost()`]: Codec::strict_cost
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codec {
    strict_cost: bool,
}

impl Codec {
    /// Create a new `Codec` with default options (costs above 31 are truncated).
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, a cost above 31 makes decoding fail with [`McfError::InvalidCost`] instead of
    /// being truncated into the 5-bit cost field.
    pub fn strict_cost(mut self, strict: bool) -> Self {
        self.strict_cost = strict;
        self
    }

    /// Parses an MCF hash string into a [`BinaryHash`].
    pub fn parse(&self, mcf: &str) -> Result<BinaryHash, McfError> {
        let tokenized_hash = TokenizedHash::from_str(mcf)?;

        let cost = if tokenized_hash.cost > MAX_COST {
            if self.strict_cost {
                return Err(McfError::InvalidCost("Cost does not fit in 5 bits"));
            }

            let truncated = tokenized_hash.cost & COST_MASK;
            warn!(
                cost = tokenized_hash.cost,
                truncated, "Bcrypt cost does not fit in 5 bits and was truncated"
            );

            truncated
        } else {
            tokenized_hash.cost
        };

        let salt = bcrypt64::decode(&tokenized_hash.b64_salt)?;
        let digest = bcrypt64::decode(&tokenized_hash.b64_hash)?;

        Ok(BinaryHash {
            scheme: tokenized_hash.scheme,
            cost,
            salt: salt
                .try_into()
                .map_err(|_| McfError::InvalidHash("Salt must be 16 bytes long"))?,
            digest: digest
                .try_into()
                .map_err(|_| McfError::InvalidHash("Digest must be 23 bytes long"))?,
        })
    }

    /// Converts an MCF hash string into its 40-byte binary form.
    pub fn decode(&self, mcf: &str) -> Result<[u8; BMCF_LEN], McfError> {
        match self.parse(mcf) {
            Ok(hash) => {
                trace!(scheme = %hash.scheme, cost = hash.cost, "Decoded MCF hash");
                Ok(hash.to_bytes())
            }
            Err(e) => {
                debug!(error = %e, "Rejected MCF hash");
                Err(e)
            }
        }
    }

    /// Converts a binary hash back into an MCF hash string.
    pub fn encode(&self, bmcf: &[u8]) -> Result<String, McfError> {
        match BinaryHash::try_from(bmcf) {
            Ok(hash) => {
                trace!(scheme = %hash.scheme, cost = hash.cost, "Encoded BMCF hash");
                Ok(hash.to_string())
            }
            Err(e) => {
                debug!(error = %e, len = bmcf.len(), "Rejected BMCF hash");
                Err(e)
            }
        }
    }
}

/// A Bcrypt hash split into its parts: the scheme, the cost, the salt, and the digest.
///
/// A `BinaryHash` can be built from an MCF string (via [`FromStr`]) or from BMCF bytes (via
/// [`TryFrom`]), and turned back into either form with [`to_string()`](ToString::to_string)
/// and [`to_bytes()`](BinaryHash::to_bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BinaryHash {
    scheme: Scheme,
    cost: u8,
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl BinaryHash {
    /// Assembles a hash from its parts. Fails if `cost` does not fit in 5 bits.
    pub fn from_parts(
        scheme: Scheme,
        cost: u8,
        salt: &[u8; SALT_LEN],
        digest: &[u8; DIGEST_LEN],
    ) -> Result<Self, McfError> {
        if cost > MAX_COST {
            return Err(McfError::InvalidCost("Cost does not fit in 5 bits"));
        }

        Ok(Self {
            scheme,
            cost,
            salt: *salt,
            digest: *digest,
        })
    }

    /// The Bcrypt variant the hash was produced with.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The base-2 logarithm of the number of Bcrypt key expansion rounds.
    pub fn cost(&self) -> u8 {
        self.cost
    }

    /// The BMCF header byte: the scheme identifier in the top 3 bits, the cost in the low 5.
    pub fn header(&self) -> u8 {
        self.scheme.identifier() | self.cost
    }

    /// Returns a reference to a byte slice of the salt used to generate the hash.
    pub fn salt_bytes(&self) -> &[u8] {
        &self.salt
    }

    /// Returns a reference to a byte slice of the hash digest.
    pub fn as_bytes(&self) -> &[u8] {
        &self.digest
    }

    /// Serializes the hash to BMCF: the header byte, then the salt, then the digest.
    pub fn to_bytes(&self) -> [u8; BMCF_LEN] {
        let mut bytes = [0u8; BMCF_LEN];
        bytes[0] = self.header();
        bytes[1..1 + SALT_LEN].copy_from_slice(&self.salt);
        bytes[1 + SALT_LEN..].copy_from_slice(&self.digest);
        bytes
    }
}

impl fmt::Display for BinaryHash {
    /// Writes the MCF hash string, which looks something like this:
    ///
    /// _$2y$14$i5btSOiulHhaPHPbgNUGdObga/GC.AVG/y5HHY1ra7L0C9dpCaw8u_
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}{}",
            self.scheme,
            self.cost,
            bcrypt64::encode(&self.salt),
            bcrypt64::encode(&self.digest),
        )
    }
}

impl FromStr for BinaryHash {
    type Err = McfError;

    /// Parses an MCF hash string with the default [`Codec`] options.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Codec::default().parse(s)
    }
}

impl TryFrom<&[u8]> for BinaryHash {
    type Error = McfError;

    /// Parses BMCF bytes. The scheme is checked before the length so that hashes of future
    /// schemes with other lengths are reported as unsupported rather than malformed.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < MIN_BMCF_LEN {
            return Err(McfError::InvalidInput(
                "Binary hash must be at least 13 bytes long",
            ));
        }

        let header = bytes[0];
        let scheme = Scheme::from_identifier(header & SCHEME_MASK)?;

        if bytes.len() != BMCF_LEN {
            return Err(McfError::InvalidHash("Binary Bcrypt hash must be 40 bytes long"));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[1..1 + SALT_LEN]);

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&bytes[1 + SALT_LEN..]);

        Ok(Self {
            scheme,
            cost: header - scheme.identifier(),
            salt,
            digest,
        })
    }
}

impl TryFrom<[u8; BMCF_LEN]> for BinaryHash {
    type Error = McfError;

    fn try_from(bytes: [u8; BMCF_LEN]) -> Result<Self, Self::Error> {
        BinaryHash::try_from(&bytes[..])
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::BinaryHash;

    use serde::de::{self, Deserialize, Deserializer, Visitor};
    use serde::ser::{Serialize, Serializer};
    use std::fmt;
    use std::str::FromStr;

    impl Serialize for BinaryHash {
        /// Human-readable formats get the MCF string, binary formats the 40 BMCF bytes.
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.collect_str(self)
            } else {
                serializer.serialize_bytes(&self.to_bytes())
            }
        }
    }

    struct BinaryHashVisitor;

    impl<'de> Visitor<'de> for BinaryHashVisitor {
        type Value = BinaryHash;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a Bcrypt MCF hash string or 40 BMCF bytes")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            BinaryHash::from_str(v).map_err(E::custom)
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            BinaryHash::try_from(v).map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for BinaryHash {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(BinaryHashVisitor)
            } else {
                deserializer.deserialize_bytes(BinaryHashVisitor)
            }
        }
    }
}

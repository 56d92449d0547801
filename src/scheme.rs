//! The registry of hash schemes that have a binary (BMCF) representation.
//!
//! A scheme occupies the three most significant bits of the BMCF header byte. Only the Bcrypt
//! family is registered; the remaining identifiers are reserved:
//!
//! | Identifier | Tag       |
//! |------------|-----------|
//! | `0x00`     | reserved  |
//! | `0x20`     | `2`       |
//! | `0x40`     | `2a`      |
//! | `0x60`     | `2x`      |
//! | `0x80`     | `2y`      |
//! | `0xA0`     | reserved  |
//! | `0xC0`     | reserved  |
//! | `0xE0`     | reserved  |

use crate::error::McfError;
use crate::{COST_MASK, SCHEME_MASK};

use std::fmt;
use std::str::FromStr;

/// A Bcrypt variant, identified by the tag between the first two `$` of an MCF hash.
///
/// The variants only differ in how the original password was hashed (see
/// <https://en.wikipedia.org/wiki/Bcrypt#Versioning_history>). Their salts and digests have
/// the same layout, so all of them are serialized the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// `$2$`, the original OpenBSD Bcrypt
    Bcrypt2,

    /// `$2a$`
    Bcrypt2a,

    /// `$2x$`, marks hashes produced by the pre-2011 crypt_blowfish sign-extension bug
    Bcrypt2x,

    /// `$2y$`, crypt_blowfish hashes produced after the sign-extension fix
    Bcrypt2y,
}

// Indexed by `identifier >> 5`
const BY_IDENTIFIER: [Option<Scheme>; 8] = [
    None,
    Some(Scheme::Bcrypt2),
    Some(Scheme::Bcrypt2a),
    Some(Scheme::Bcrypt2x),
    Some(Scheme::Bcrypt2y),
    None,
    None,
    None,
];

const fn same_tag(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }

    true
}

// The identifier table must agree with `identifier()`, and no two schemes may share a tag
const _: () = {
    let mut i = 0;
    while i < BY_IDENTIFIER.len() {
        if let Some(scheme) = BY_IDENTIFIER[i] {
            assert!(scheme.identifier() as usize == i << 5);
            assert!(scheme.identifier() & COST_MASK == 0);
        }
        i += 1;
    }

    let mut i = 0;
    while i < Scheme::ALL.len() {
        let mut j = i + 1;
        while j < Scheme::ALL.len() {
            assert!(!same_tag(Scheme::ALL[i].tag(), Scheme::ALL[j].tag()));
            j += 1;
        }
        i += 1;
    }
};

impl Scheme {
    /// Every registered scheme, in identifier order.
    pub const ALL: [Scheme; 4] = [
        Scheme::Bcrypt2,
        Scheme::Bcrypt2a,
        Scheme::Bcrypt2x,
        Scheme::Bcrypt2y,
    ];

    /// The 3-bit identifier of the scheme, already shifted into the most significant bits of
    /// a byte.
    pub const fn identifier(self) -> u8 {
        match self {
            Scheme::Bcrypt2 => 0x20,
            Scheme::Bcrypt2a => 0x40,
            Scheme::Bcrypt2x => 0x60,
            Scheme::Bcrypt2y => 0x80,
        }
    }

    /// The textual tag of the scheme, without the surrounding `$` delimiters.
    pub const fn tag(self) -> &'static str {
        match self {
            Scheme::Bcrypt2 => "2",
            Scheme::Bcrypt2a => "2a",
            Scheme::Bcrypt2x => "2x",
            Scheme::Bcrypt2y => "2y",
        }
    }

    /// Looks up the scheme for an identifier. The identifier must be exact; bits that belong
    /// to the cost field have to be masked off by the caller.
    pub fn from_identifier(identifier: u8) -> Result<Self, McfError> {
        if identifier & COST_MASK != 0 {
            return Err(McfError::UnsupportedScheme(
                "Scheme identifier overlaps the cost bits",
            ));
        }

        BY_IDENTIFIER[usize::from((identifier & SCHEME_MASK) >> 5)]
            .ok_or(McfError::UnsupportedScheme("Reserved scheme identifier"))
    }

    /// Looks up the scheme for a textual tag such as `2y`.
    pub fn from_tag(tag: &str) -> Result<Self, McfError> {
        match tag {
            "2" => Ok(Scheme::Bcrypt2),
            "2a" => Ok(Scheme::Bcrypt2a),
            "2x" => Ok(Scheme::Bcrypt2x),
            "2y" => Ok(Scheme::Bcrypt2y),
            _ => Err(McfError::UnsupportedScheme("Unrecognized scheme tag")),
        }
    }
}

impl FromStr for Scheme {
    type Err = McfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::from_tag(s)
    }
}

impl TryFrom<u8> for Scheme {
    type Error = McfError;

    fn try_from(identifier: u8) -> Result<Self, Self::Error> {
        Scheme::from_identifier(identifier)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returns the identifier registered for `tag`.
pub fn identifier_for_tag(tag: &str) -> Result<u8, McfError> {
    Scheme::from_tag(tag).map(Scheme::identifier)
}

/// Returns the tag registered for `identifier`.
pub fn tag_for_identifier(identifier: u8) -> Result<&'static str, McfError> {
    Scheme::from_identifier(identifier).map(Scheme::tag)
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Scheme;

    use serde::de::{self, Deserialize, Deserializer, Visitor};
    use serde::ser::{Serialize, Serializer};
    use std::fmt;

    impl Serialize for Scheme {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.tag())
        }
    }

    struct SchemeVisitor;

    impl<'de> Visitor<'de> for SchemeVisitor {
        type Value = Scheme;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a Bcrypt scheme tag (2, 2a, 2x or 2y)")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Scheme::from_tag(v).map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for Scheme {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_str(SchemeVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_table() {
        assert_eq!(identifier_for_tag("2").unwrap(), 0x20);
        assert_eq!(identifier_for_tag("2a").unwrap(), 0x40);
        assert_eq!(identifier_for_tag("2x").unwrap(), 0x60);
        assert_eq!(identifier_for_tag("2y").unwrap(), 0x80);

        assert_eq!(tag_for_identifier(0x20).unwrap(), "2");
        assert_eq!(tag_for_identifier(0x40).unwrap(), "2a");
        assert_eq!(tag_for_identifier(0x60).unwrap(), "2x");
        assert_eq!(tag_for_identifier(0x80).unwrap(), "2y");
    }

    #[test]
    fn test_registry_is_bijective() {
        for scheme in Scheme::ALL {
            assert_eq!(Scheme::from_identifier(scheme.identifier()).unwrap(), scheme);
            assert_eq!(Scheme::from_tag(scheme.tag()).unwrap(), scheme);
            assert_eq!(scheme.to_string(), scheme.tag());
        }
    }

    #[test]
    fn test_same_tag() {
        assert!(same_tag("2a", "2a"));
        assert!(!same_tag("2a", "2y"));
        assert!(!same_tag("2", "2a"));

        for a in Scheme::ALL {
            for b in Scheme::ALL {
                assert_eq!(same_tag(a.tag(), b.tag()), a == b);
            }
        }
    }

    #[test]
    fn test_reserved_identifiers() {
        for identifier in [0x00, 0xA0, 0xC0, 0xE0] {
            assert!(matches!(
                tag_for_identifier(identifier),
                Err(McfError::UnsupportedScheme(_))
            ));
        }
    }

    #[test]
    fn test_identifier_with_cost_bits() {
        assert!(matches!(
            Scheme::from_identifier(0x80 | 14),
            Err(McfError::UnsupportedScheme(_))
        ));
        assert!(Scheme::try_from(0x81).is_err());
    }

    #[test]
    fn test_unknown_tags() {
        for tag in ["", "1", "2b", "2Y", "5", "6", "argon2id", "2y "] {
            assert!(matches!(
                identifier_for_tag(tag),
                Err(McfError::UnsupportedScheme(_))
            ));
        }

        assert!("2b".parse::<Scheme>().is_err());
        assert_eq!("2x".parse::<Scheme>().unwrap(), Scheme::Bcrypt2x);
    }
}

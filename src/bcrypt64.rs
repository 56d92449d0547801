//! The base64 flavor used by Bcrypt.
//!
//! Bcrypt encodes salts and digests with the same bit grouping as standard base64, but with a
//! different alphabet and without padding. Character `i` of [`BCRYPT_ALPHABET`] stands for the
//! same 6-bit value as character `i` of [`STANDARD_ALPHABET`], so converting between the two is
//! a per-character substitution layered over a standard base64 engine.

use crate::error::McfError;

use base64::engine::general_purpose::STANDARD_NO_PAD as b64_stdnopad;
use base64::Engine;

/// The standard base64 alphabet (RFC 4648)
pub const STANDARD_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// The alphabet used by Bcrypt hash strings
pub const BCRYPT_ALPHABET: &[u8; 64] =
    b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Neither alphabet contains a byte outside of ASCII
const INVALID: u8 = 0xFF;

const fn substitution_table(from: &[u8; 64], to: &[u8; 64]) -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;

    while i < 64 {
        table[from[i] as usize] = to[i];
        i += 1;
    }

    table
}

static STANDARD_TO_BCRYPT: [u8; 256] = substitution_table(STANDARD_ALPHABET, BCRYPT_ALPHABET);
static BCRYPT_TO_STANDARD: [u8; 256] = substitution_table(BCRYPT_ALPHABET, STANDARD_ALPHABET);

/// Encodes `bytes` using the Bcrypt alphabet. The output is never padded.
pub fn encode<B>(bytes: &B) -> String
where
    B: AsRef<[u8]> + ?Sized,
{
    b64_stdnopad
        .encode(bytes)
        .bytes()
        .map(|c| {
            let substituted = STANDARD_TO_BCRYPT[usize::from(c)];
            debug_assert_ne!(substituted, INVALID);
            char::from(substituted)
        })
        .collect()
}

/// Decodes Bcrypt-flavored base64 text into raw bytes.
///
/// The text must be unpadded and canonical: unused low bits of the final character have to be
/// zero, which guarantees that re-encoding the result reproduces `encoded` exactly.
pub fn decode<E>(encoded: &E) -> Result<Vec<u8>, McfError>
where
    E: AsRef<[u8]> + ?Sized,
{
    let standard = encoded
        .as_ref()
        .iter()
        .map(|&c| match BCRYPT_TO_STANDARD[usize::from(c)] {
            INVALID => Err(McfError::InvalidEncoding(
                "Character outside of the Bcrypt base64 alphabet",
            )),
            s => Ok(s),
        })
        .collect::<Result<Vec<u8>, McfError>>()?;

    match b64_stdnopad.decode(standard) {
        Ok(bytes) => Ok(bytes),
        Err(_) => Err(McfError::InvalidEncoding(
            "Malformed Bcrypt base64 length or trailing bits",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::OsRng, Fill};

    #[test]
    fn test_alphabets_correspond() {
        for i in 0..64 {
            assert_eq!(
                STANDARD_TO_BCRYPT[usize::from(STANDARD_ALPHABET[i])],
                BCRYPT_ALPHABET[i]
            );
            assert_eq!(
                BCRYPT_TO_STANDARD[usize::from(BCRYPT_ALPHABET[i])],
                STANDARD_ALPHABET[i]
            );
        }

        assert_eq!(STANDARD_TO_BCRYPT[usize::from(b'=')], INVALID);
        assert_eq!(BCRYPT_TO_STANDARD[usize::from(b'+')], INVALID);
        assert_eq!(BCRYPT_TO_STANDARD[usize::from(b'$')], INVALID);
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"\x00"), "..");
        assert_eq!(encode(b"hello"), "YETqZE6");
        assert_eq!(encode(b"\xff\xfe\xfd"), "9957");
        assert_eq!(encode(&[0u8; 16]), "......................");
        assert_eq!(encode(&[0xffu8; 16]), "999999999999999999999u");
        assert_eq!(encode(&[0xffu8; 23]), "9999999999999999999999999999996");
    }

    #[test]
    fn test_encode_never_pads() {
        for len in 0..32 {
            let encoded = encode(&vec![0xA5u8; len]);
            assert!(!encoded.contains('='));
            assert_eq!(encoded.len(), (len * 4 + 2) / 3);
        }
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("YETqZE6").unwrap(), b"hello");
        assert_eq!(decode("..").unwrap(), vec![0u8]);
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
        assert_eq!(
            decode("i5btSOiulHhaPHPbgNUGdO").unwrap(),
            vec![
                0x93, 0xb7, 0x6f, 0x51, 0x09, 0x30, 0x9c, 0x98, 0xdc, 0x44, 0x94, 0x5d, 0x88,
                0xf5, 0x88, 0x7d,
            ]
        );
    }

    #[test]
    fn test_decode_invalid_characters() {
        for text in [
            "YETqZE6=",
            "YETq+E6",
            "YETq_E6",
            "YETq-E6",
            "YETq$E6",
            "YETq E6",
            "YETqZ\u{e9}",
        ] {
            assert!(matches!(decode(text), Err(McfError::InvalidEncoding(_))));
        }
    }

    #[test]
    fn test_decode_dot_and_slash() {
        // '.' and '/' are the first two Bcrypt characters, unlike in standard base64
        assert_eq!(decode("YETq/E6").unwrap(), vec![104, 101, 108, 4, 111]);
        assert_eq!(
            decode("bga/GC.AVG/y5HHY1ra7L0C9dpCaw8u").unwrap(),
            vec![
                0x76, 0x27, 0x01, 0x20, 0x40, 0x02, 0x5c, 0x80, 0x74, 0xec, 0x92, 0x5a, 0xde,
                0xd7, 0x3d, 0x37, 0x61, 0x3f, 0x7e, 0xb1, 0x1c, 0xcb, 0xec,
            ]
        );
    }

    #[test]
    fn test_decode_malformed() {
        // A single dangling character cannot hold a whole byte
        assert!(matches!(decode("YETqZ"), Err(McfError::InvalidEncoding(_))));

        // Non-zero unused bits in the final character
        assert!(matches!(
            decode("9999999999999999999999"),
            Err(McfError::InvalidEncoding(_))
        ));
        assert!(matches!(decode(".."), Ok(_)));
        assert!(matches!(decode(".A"), Err(McfError::InvalidEncoding(_))));
    }

    #[test]
    fn test_random_round_trip() {
        for len in 0..64 {
            let mut bytes = vec![0u8; len];
            bytes
                .try_fill(&mut OsRng)
                .expect("Failed to fill buffer with random bytes");

            assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
        }
    }
}

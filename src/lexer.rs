use crate::error::McfError;
use crate::scheme::Scheme;
use crate::{PAYLOAD_LEN, SALT_ENCODED_LEN};

use std::str::FromStr;

/// The fields of an MCF hash string, checked for shape but not yet decoded.
pub struct TokenizedHash {
    pub scheme: Scheme,
    /// The cost exactly as written, which may exceed what fits into a BMCF header
    pub cost: u8,
    pub b64_salt: String,
    pub b64_hash: String,
}

impl FromStr for TokenizedHash {
    type Err = McfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(McfError::InvalidInput("Hash string is empty"));
        }

        if !s.starts_with('$') {
            // Most likely a traditional DES-based crypt hash
            return Err(McfError::UnsupportedScheme("Must begin with $"));
        }

        let mut fields = s.splitn(4, '$').skip(1);

        let (scheme, cost) = match (fields.next(), fields.next()) {
            (Some(tag), Some(cost)) => (Scheme::from_tag(tag)?, cost),
            _ => return Err(McfError::UnsupportedScheme("Missing '$' delimiter")),
        };

        if cost.len() != 2 || !cost.bytes().all(|c| c.is_ascii_digit()) {
            return Err(McfError::InvalidCost("Cost must be two decimal digits"));
        }

        let cost: u8 = match cost.parse() {
            Ok(c) => c,
            Err(_) => return Err(McfError::InvalidCost("Cost must be two decimal digits")),
        };

        let payload = fields.next().unwrap_or_default();
        if payload.len() != PAYLOAD_LEN {
            return Err(McfError::InvalidHash(
                "Salt and digest must be 53 characters long",
            ));
        }

        if !payload.is_ascii() {
            return Err(McfError::InvalidEncoding(
                "Character outside of the Bcrypt base64 alphabet",
            ));
        }

        let (salt, hash) = payload.split_at(SALT_ENCODED_LEN);

        Ok(Self {
            scheme,
            cost,
            b64_salt: String::from(salt),
            b64_hash: String::from(hash),
        })
    }
}

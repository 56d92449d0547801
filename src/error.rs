use thiserror::Error;

/// Errors that may occur when converting between MCF and BMCF
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum McfError {
    /// Indicates that the input does not have the minimum shape required to be examined at
    /// all, such as an empty string or a binary hash shorter than 13 bytes
    #[error("McfError: Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Indicates that the hash scheme is not one of the registered Bcrypt variants. Hashes
    /// that do not begin with `$` (e.g. traditional DES-based crypt hashes) also produce this
    /// error.
    #[error("McfError: Unsupported scheme: {0}")]
    UnsupportedScheme(&'static str),

    /// Indicates that the cost field is not made of exactly two decimal digits, or that the
    /// cost does not fit in the 5-bit cost field of a binary hash
    #[error("McfError: Invalid cost: {0}")]
    InvalidCost(&'static str),

    /// Indicates that a provided hash was expected to be valid, but has the wrong length for
    /// its scheme
    #[error("McfError: Invalid hash: {0}")]
    InvalidHash(&'static str),

    /// Indicates that the salt or digest text is not valid Bcrypt-flavored base64.
    ///
    /// Text whose final character has non-zero unused low bits is rejected rather than
    /// having those bits dropped, so hashes written by encoders that leave padding bits set
    /// do not decode.
    #[error("McfError: Invalid encoding: {0}")]
    InvalidEncoding(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            McfError::UnsupportedScheme("Unrecognized scheme tag").to_string(),
            "McfError: Unsupported scheme: Unrecognized scheme tag"
        );
        assert_eq!(
            McfError::InvalidCost("Cost must be two decimal digits").to_string(),
            "McfError: Invalid cost: Cost must be two decimal digits"
        );
    }
}

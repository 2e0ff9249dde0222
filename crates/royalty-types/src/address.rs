//! Participant identities.
//!
//! An [`Address`] is an opaque 32-byte identifier for the admin, members and
//! payers. The all-zero address is reserved as the null address and can never
//! be registered as a member.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// BLAKE3 context used by [`Address::from_label`].
pub const LABEL_ADDRESS_CONTEXT: &str = "Royalty v1 label-address";

/// A 32-byte participant identity, serialized as lowercase hex.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(#[serde_as(as = "serde_with::hex::Hex")] pub [u8; 32]);

/// Error returned when parsing an [`Address`] from hex.
#[derive(Debug, thiserror::Error)]
pub enum AddressParseError {
    /// Input is not valid hex.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Input decoded to the wrong number of bytes.
    #[error("address must be 32 bytes, got {0}")]
    Length(usize),
}

impl Address {
    /// The null address.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Derive a deterministic address from a human-readable label.
    pub fn from_label(label: &str) -> Self {
        Self(blake3::derive_key(LABEL_ADDRESS_CONTEXT, label.as_bytes()))
    }

    /// Whether this is the null address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        let len = bytes.len();
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AddressParseError::Length(len))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Truncated to the first 4 bytes
        write!(f, "Address({}..)", &hex::encode(&self.0[..4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_label("alice").is_zero());
    }

    #[test]
    fn test_from_label_deterministic() {
        assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
    }

    #[test]
    fn test_display_parse() {
        let addr = Address::from_label("alice");
        let text = addr.to_string();
        assert_eq!(text.len(), 64);
        let parsed: Address = text.parse().expect("parse");
        assert_eq!(parsed, addr);

        let prefixed: Address = format!("0x{text}").parse().expect("parse 0x");
        assert_eq!(prefixed, addr);
    }

    #[test]
    fn test_parse_wrong_length() {
        let result = "abcd".parse::<Address>();
        assert!(matches!(result, Err(AddressParseError::Length(2))));
    }

    #[test]
    fn test_parse_invalid_hex() {
        let result = "zz".repeat(32).parse::<Address>();
        assert!(matches!(result, Err(AddressParseError::Hex(_))));
    }

    #[test]
    fn test_serde_hex() {
        let addr = Address::from_label("bob");
        let json = serde_json::to_string(&addr).expect("serialize");
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, addr);
    }
}

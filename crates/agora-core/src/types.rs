//! Core identifier types for the Agora engine.
//!
//! Content-addressed identifiers are BLAKE3 hashes, displayed as hex.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account/contract address (20 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address, never a valid participant
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic address from a label (test/deployment helper)
    pub fn derive(label: &str) -> Self {
        let hash = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash.as_bytes()[..20]);
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Is this the zero address?
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 20 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Function selector: the leading four bytes of action data
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector([u8; 4]);

impl Selector {
    /// Create a selector from raw bytes
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Extract the selector from action data.
    ///
    /// Returns `None` when the payload is shorter than four bytes.
    pub fn of(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&data[..4]);
        Some(Self(bytes))
    }

    /// Derive a selector from a function signature string
    pub fn from_signature(signature: &str) -> Self {
        let hash = blake3::hash(signature.as_bytes());
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&hash.as_bytes()[..4]);
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Content digest computed with BLAKE3
///
/// Used for stake commitments, timelock operation keys, and multi-sig
/// action identities. The hash-equality check is the sole authorization
/// for a two-phase protocol transition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Create a digest from raw bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash the concatenation of the given parts
    pub fn of(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}..)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_round_trip() {
        let addr = Address::derive("alice");
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::derive("alice").is_zero());
    }

    #[test]
    fn test_selector_extraction() {
        assert_eq!(Selector::of(&[1, 2, 3]), None);
        let sel = Selector::of(&[0xde, 0xad, 0xbe, 0xef, 0x00]).unwrap();
        assert_eq!(sel.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_digest_deterministic() {
        let a = Digest::of(&[b"one", b"two"]);
        let b = Digest::of(&[b"one", b"two"]);
        let c = Digest::of(&[b"onet", b"wo"]);
        assert_eq!(a, b);
        // Parts are concatenated, so the split point does not matter
        assert_eq!(a, c);
    }

    #[test]
    fn test_address_serde() {
        let addr = Address::derive("bob");
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }
}

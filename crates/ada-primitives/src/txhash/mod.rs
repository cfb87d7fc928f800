//! Transaction hash type.
//!
//! Provides `TxHash` — a 32-byte array displayed as hex in natural byte
//! order, matching Cardano's convention for transaction ids (no byte
//! reversal, unlike Bitcoin-family chains).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::blake2b_256;
use crate::PrimitivesError;

/// Size of a transaction hash in bytes.
pub const TX_HASH_SIZE: usize = 32;

/// A 32-byte transaction id: the Blake2b-256 digest of an encoded
/// transaction body.
///
/// Displayed as 64 lowercase hex characters in natural byte order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TxHash([u8; TX_HASH_SIZE]);

impl TxHash {
    /// Create a TxHash from a raw 32-byte array.
    ///
    /// # Arguments
    /// * `bytes` - The 32 hash bytes.
    ///
    /// # Returns
    /// A new `TxHash`.
    pub fn new(bytes: [u8; TX_HASH_SIZE]) -> Self {
        TxHash(bytes)
    }

    /// Create a TxHash from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(TxHash)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != TX_HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                TX_HASH_SIZE
            )));
        }
        let mut arr = [0u8; TX_HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(TxHash(arr))
    }

    /// Create a TxHash from a 64-character hex string.
    ///
    /// Unlike Bitcoin-family hashes, the string represents bytes in
    /// natural order; no reversal is applied.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of exactly 64 characters.
    ///
    /// # Returns
    /// `Ok(TxHash)` on success, or an error for invalid input.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let decoded = hex::decode(hex_str)?;
        Self::from_bytes(&decoded)
    }

    /// Compute the transaction id of an encoded transaction body.
    ///
    /// # Arguments
    /// * `body` - The canonically encoded transaction body bytes.
    ///
    /// # Returns
    /// The Blake2b-256 digest of the body as a `TxHash`.
    pub fn of_body(body: &[u8]) -> Self {
        TxHash(blake2b_256(body))
    }

    /// Access the internal byte array as a reference.
    ///
    /// # Returns
    /// A reference to the 32-byte internal array.
    pub fn as_bytes(&self) -> &[u8; TX_HASH_SIZE] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxHash::from_hex(s)
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let hash = TxHash::of_body(b"some transaction body");
        let parsed = TxHash::from_hex(&hash.to_string()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_no_byte_reversal() {
        let mut bytes = [0u8; TX_HASH_SIZE];
        bytes[0] = 0xab;
        let hash = TxHash::new(bytes);
        assert!(hash.to_string().starts_with("ab"));
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(TxHash::from_bytes(&[0u8; 31]).is_err());
        assert!(TxHash::from_bytes(&[0u8; 33]).is_err());
        assert!(TxHash::from_hex("abcd").is_err());
        assert!(TxHash::from_hex("zz").is_err());
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let lo = TxHash::new([0u8; 32]);
        let mut hi_bytes = [0u8; 32];
        hi_bytes[0] = 1;
        let hi = TxHash::new(hi_bytes);
        assert!(lo < hi);
    }

    #[test]
    fn test_marshalling() {
        /// Helper struct for JSON round-trip testing.
        #[derive(Serialize, Deserialize)]
        struct TestData {
            hash: TxHash,
        }

        let data = TestData {
            hash: TxHash::of_body(b"hello"),
        };
        let json = serde_json::to_string(&data).unwrap();
        let data2: TestData = serde_json::from_str(&json).unwrap();
        assert_eq!(data.hash, data2.hash);
    }
}

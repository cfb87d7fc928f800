//! Hash function primitives for the ada SDK.
//!
//! Provides Blake2b-224, Blake2b-256, and HMAC-SHA-512 used throughout
//! the Cardano wallet core: credentials and pool ids are Blake2b-224 key
//! hashes, transaction ids are Blake2b-256 digests of the encoded body,
//! and hierarchical key derivation chains HMAC-SHA-512.

use blake2::digest::consts::{U28, U32};
use blake2::{Blake2b, Digest};
use hmac::{Hmac, Mac};
use sha2::Sha512;

type Blake2b224 = Blake2b<U28>;
type Blake2b256 = Blake2b<U32>;
type HmacSha512 = Hmac<Sha512>;

/// Compute Blake2b-224 hash of the input data.
///
/// This is the credential hash: payment and staking credentials are the
/// Blake2b-224 digest of the controlling key bytes.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 28-byte Blake2b-224 digest.
pub fn blake2b_224(data: &[u8]) -> [u8; 28] {
    let mut hasher = Blake2b224::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Blake2b-256 hash of the input data.
///
/// This is the transaction id hash: the id of a transaction is the
/// Blake2b-256 digest of its canonically encoded body.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte Blake2b-256 digest.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute HMAC-SHA-512 of the data under the given key.
///
/// Used for hierarchical deterministic key derivation: each derivation
/// step chains the parent key material through HMAC-SHA-512.
///
/// # Arguments
/// * `key` - The HMAC key.
/// * `data` - Byte slice to authenticate.
///
/// # Returns
/// A 64-byte HMAC-SHA-512 digest.
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

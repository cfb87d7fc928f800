/// Cardano wallet SDK - Hashing, transaction ids, and canonical CBOR.
///
/// This crate provides the foundational building blocks for the ada SDK:
/// - Hash functions (Blake2b-224, Blake2b-256, HMAC-SHA-512)
/// - Transaction hash type for transaction identification
/// - Canonical CBOR encoding used for transaction bodies

pub mod hash;
pub mod txhash;
pub mod cbor;

mod error;
pub use error::PrimitivesError;

#![deny(missing_docs)]

//! Cardano wallet SDK - Complete SDK.
//!
//! Re-exports all ada SDK components for convenient single-crate usage.

pub use ada_primitives as primitives;
pub use ada_keys as keys;
pub use ada_ledger as ledger;
pub use ada_transaction as transaction;

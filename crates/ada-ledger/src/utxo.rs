//! UTXO value types.
//!
//! An `OutputRef` is the structural identity of an unspent output:
//! the producing transaction's hash plus the output index. It is a
//! proper value type with derived equality and ordering — never a
//! concatenated string, which would make hash "ab" index 12 collide
//! with hash "ab1" index 2.

use std::fmt;

use ada_keys::Address;
use ada_primitives::txhash::TxHash;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Structural reference to a transaction output.
///
/// Orders by (tx_hash, index) ascending, which is also the canonical
/// input ordering in encoded transaction bodies.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub struct OutputRef {
    /// Hash of the producing transaction.
    pub tx_hash: TxHash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl OutputRef {
    /// Create a new output reference.
    pub fn new(tx_hash: TxHash, index: u32) -> Self {
        OutputRef { tx_hash, index }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.index)
    }
}

/// An unspent transaction output as observed in a snapshot.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Utxo {
    /// The output's structural reference.
    pub output_ref: OutputRef,
    /// The address controlling the output.
    pub address: Address,
    /// The lovelace and asset value held by the output.
    pub value: Value,
}

impl Utxo {
    /// Create a new UTXO.
    pub fn new(output_ref: OutputRef, address: Address, value: Value) -> Self {
        Utxo {
            output_ref,
            address,
            value,
        }
    }
}

/// Ledger-side lifecycle state of a UTXO.
///
/// `Unspent → Locked` when selected by a build in progress,
/// `Locked → Spent` when a submission is confirmed, and
/// `Locked → Unspent` when a build aborts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum UtxoState {
    /// Available for selection.
    Unspent,
    /// Reserved by a build in progress.
    Locked,
    /// Consumed by a confirmed transaction.
    Spent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_with_first_byte(b: u8) -> TxHash {
        let mut bytes = [0u8; 32];
        bytes[0] = b;
        TxHash::new(bytes)
    }

    #[test]
    fn test_ordering_by_hash_then_index() {
        let a = OutputRef::new(hash_with_first_byte(1), 9);
        let b = OutputRef::new(hash_with_first_byte(2), 0);
        let c = OutputRef::new(hash_with_first_byte(2), 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_structural_identity_no_string_collisions() {
        // Same hash, different index: distinct refs.
        let h = hash_with_first_byte(7);
        assert_ne!(OutputRef::new(h, 12), OutputRef::new(h, 2));
        // Different hash, same index: distinct refs.
        assert_ne!(
            OutputRef::new(hash_with_first_byte(1), 2),
            OutputRef::new(hash_with_first_byte(2), 2)
        );
    }

    #[test]
    fn test_display() {
        let r = OutputRef::new(TxHash::default(), 3);
        assert!(r.to_string().ends_with("#3"));
    }
}

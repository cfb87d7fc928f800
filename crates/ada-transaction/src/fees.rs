//! Linear fee computation.
//!
//! The fee of a transaction is a linear function of its encoded byte
//! size: `fee(size) = coefficient * size + constant`. Both parameters
//! come from the network configuration collaborator.

use serde::{Deserialize, Serialize};

/// A linear fee function over encoded transaction size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearFee {
    /// Per-byte fee coefficient (lovelace).
    pub coefficient: u64,
    /// Flat fee constant (lovelace).
    pub constant: u64,
}

impl LinearFee {
    /// Create a fee function from its two parameters.
    pub fn new(coefficient: u64, constant: u64) -> Self {
        LinearFee {
            coefficient,
            constant,
        }
    }

    /// The fee for a transaction of the given encoded size.
    ///
    /// # Arguments
    /// * `size` - Encoded transaction size in bytes.
    ///
    /// # Returns
    /// `coefficient * size + constant`, saturating at `u64::MAX`.
    pub fn fee_for_size(&self, size: usize) -> u64 {
        self.coefficient
            .saturating_mul(size as u64)
            .saturating_add(self.constant)
    }
}

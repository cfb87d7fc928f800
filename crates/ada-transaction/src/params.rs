//! Protocol parameters consumed from the network configuration
//! collaborator.
//!
//! Nothing in this crate hardcodes a fee coefficient, deposit amount, or
//! dust threshold; callers construct `ProtocolParams` from whatever the
//! network currently advertises.

use ada_keys::Network;
use serde::{Deserialize, Serialize};

use crate::fees::LinearFee;

/// Externally supplied protocol parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Per-byte fee coefficient (lovelace).
    pub fee_coefficient: u64,
    /// Flat fee constant (lovelace).
    pub fee_constant: u64,
    /// Minimum lovelace a standalone output must carry.
    pub min_utxo_value: u64,
    /// Deposit locked by a stake key registration.
    pub key_deposit: u64,
    /// Deposit locked by a stake pool registration.
    pub pool_deposit: u64,
    /// Slots added to the current slot to form a transaction's ttl.
    pub ttl_offset: u64,
    /// The network these parameters describe.
    pub network: Network,
}

impl ProtocolParams {
    /// The linear fee function described by these parameters.
    pub fn linear_fee(&self) -> LinearFee {
        LinearFee::new(self.fee_coefficient, self.fee_constant)
    }

    /// The ttl for a transaction built at the given slot.
    ///
    /// # Arguments
    /// * `current_slot` - The chain tip slot at build time.
    pub fn ttl_for(&self, current_slot: u64) -> u64 {
        current_slot.saturating_add(self.ttl_offset)
    }
}

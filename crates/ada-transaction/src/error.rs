use ada_keys::{Address, Credential};
use ada_ledger::{AssetId, LedgerError};

use crate::tx::TxState;

/// Error types for transaction building.
///
/// Every variant here is fatal: it aborts the build, releases all locks,
/// and leaves the registered stake key set unchanged. Non-fatal
/// conditions travel as [`BuildWarning`](crate::tx::BuildWarning)s on
/// successful results instead.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The spendable UTXOs cannot cover outputs, fee, and deposits.
    #[error("insufficient funds: need {needed} lovelace, {available} available")]
    InsufficientFunds {
        /// Total lovelace the build requires.
        needed: u64,
        /// Total lovelace spendable.
        available: u64,
    },
    /// A requested asset quantity cannot be covered by spendable UTXOs.
    #[error("insufficient funds: asset {asset} short by {shortfall}")]
    InsufficientAsset {
        /// The asset that cannot be covered.
        asset: AssetId,
        /// How many units are missing.
        shortfall: u64,
    },
    /// The fee/change fixed point did not stabilize within two passes.
    #[error("fee did not converge: {previous} then {last}")]
    FeeConvergence {
        /// Fee computed on the previous pass.
        previous: u64,
        /// Fee computed on the last pass.
        last: u64,
    },
    /// A delegation or deregistration names an unregistered credential.
    #[error("stake key {0} is not registered")]
    NotRegistered(Credential),
    /// A registration names an already-registered credential.
    #[error("stake key {0} is already registered")]
    AlreadyRegistered(Credential),
    /// A build target pays to a reward address.
    #[error("reward address {0} cannot be a payment target")]
    RewardTarget(Address),
    /// The request carries neither targets nor certificates.
    #[error("nothing to build: no targets and no certificates")]
    EmptyBuild,
    /// An operation ran against the wrong lifecycle state.
    #[error("invalid state: expected {expected}, transaction is {actual}")]
    InvalidState {
        /// The state the operation requires.
        expected: &'static str,
        /// The state the transaction is in.
        actual: TxState,
    },
    /// An underlying ledger error (double spend, lock contention, ...).
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    /// An underlying key/address error.
    #[error("keys error: {0}")]
    Keys(#[from] ada_keys::KeysError),
}

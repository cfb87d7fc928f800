use ada_keys::Address;

use crate::utxo::OutputRef;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A UTXO selected for spending is already locked or spent.
    #[error("double spend: utxo {0} is already locked or spent")]
    DoubleSpend(OutputRef),
    /// A referenced UTXO is not present in the ledger.
    #[error("unknown utxo {0}")]
    UnknownRef(OutputRef),
    /// A state transition required the UTXO to be locked first.
    #[error("utxo {0} is not locked")]
    NotLocked(OutputRef),
    /// Value aggregation overflowed a u64.
    #[error("value overflow while aggregating")]
    ValueOverflow,
    /// Value subtraction went below zero.
    #[error("value underflow: {0}")]
    ValueUnderflow(String),
    /// An asset name exceeded the 32-byte limit.
    #[error("asset name too long: {0} bytes, max 32")]
    AssetNameTooLong(usize),
    /// An address in the requested scope is locked by a concurrent build.
    #[error("address {0} is locked by a concurrent build")]
    LockContention(Address),
}

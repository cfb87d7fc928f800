/// Cardano wallet SDK - UTXO accounting.
///
/// Provides the multi-asset value model, the in-memory UTXO index with
/// its unspent/locked/spent lifecycle, the registered stake key set with
/// transactional deltas, and the per-address build lock registry.

pub mod value;
pub mod utxo;
pub mod ledger;
pub mod stake;
pub mod guard;

mod error;
pub use error::LedgerError;

pub use guard::{LockHandle, LockRegistry};
pub use ledger::UtxoLedger;
pub use stake::{RegisteredStakeKeys, StakeKeyDelta};
pub use utxo::{OutputRef, Utxo, UtxoState};
pub use value::{AssetId, AssetName, PolicyId, Value};

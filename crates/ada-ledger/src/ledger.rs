//! In-memory UTXO index.
//!
//! The ledger merges snapshots from the backend data provider, tracks
//! each UTXO's lifecycle state, and flags UTXOs under mangled addresses
//! (base addresses whose staking credential is not derivable from the
//! wallet's seed) so input selection can exclude them.

use std::collections::{BTreeMap, BTreeSet};

use ada_keys::{Address, Credential};
use tracing::debug;

use crate::utxo::{OutputRef, Utxo, UtxoState};
use crate::value::Value;
use crate::LedgerError;

/// One tracked UTXO with its lifecycle state.
#[derive(Clone, Debug)]
struct LedgerEntry {
    utxo: Utxo,
    state: UtxoState,
    mangled: bool,
}

/// In-memory index of available UTXOs.
#[derive(Default)]
pub struct UtxoLedger {
    entries: BTreeMap<OutputRef, LedgerEntry>,
    recognized_staking: BTreeSet<Credential>,
}

impl UtxoLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a staking credential as derivable from the wallet's seed.
    ///
    /// Consulted at ingest time: a base address whose staking credential
    /// has not been registered here is treated as mangled.
    pub fn register_staking_credential(&mut self, credential: Credential) {
        self.recognized_staking.insert(credential);
    }

    /// Whether the staking credential of an address is recognizable.
    ///
    /// Only base addresses carry a staking credential that needs
    /// recognition; every other kind is trivially recognizable.
    fn recognizes(&self, address: &Address) -> bool {
        match address.staking_credential() {
            Some(staking) if !address.is_reward() => self.recognized_staking.contains(staking),
            _ => true,
        }
    }

    /// Merge a UTXO snapshot into the ledger.
    ///
    /// Deduplicates by `OutputRef`: refs already present keep their
    /// existing state (a re-observed `Locked` or `Spent` entry is never
    /// resurrected to `Unspent`).
    ///
    /// # Arguments
    /// * `snapshot` - UTXOs observed by the backend data provider.
    ///
    /// # Returns
    /// The number of new entries added.
    pub fn ingest(&mut self, snapshot: Vec<Utxo>) -> usize {
        let mut added = 0;
        for utxo in snapshot {
            if self.entries.contains_key(&utxo.output_ref) {
                continue;
            }
            let mangled = !self.recognizes(&utxo.address);
            if mangled {
                debug!(utxo = %utxo.output_ref, "ingested utxo with unrecognized staking credential");
            }
            self.entries.insert(
                utxo.output_ref,
                LedgerEntry {
                    utxo,
                    state: UtxoState::Unspent,
                    mangled,
                },
            );
            added += 1;
        }
        debug!(added, total = self.entries.len(), "snapshot ingested");
        added
    }

    /// All unspent UTXOs under the given addresses.
    ///
    /// Includes mangled UTXOs; callers that select inputs should use
    /// [`spendable`](UtxoLedger::spendable) instead.
    pub fn query(&self, addresses: &BTreeSet<Address>) -> Vec<Utxo> {
        self.entries
            .values()
            .filter(|e| e.state == UtxoState::Unspent && addresses.contains(&e.utxo.address))
            .map(|e| e.utxo.clone())
            .collect()
    }

    /// Unspent, non-mangled UTXOs under the given addresses, plus the
    /// refs that were excluded as mangled.
    ///
    /// # Returns
    /// `(spendable, excluded_mangled_refs)`.
    pub fn spendable(&self, addresses: &BTreeSet<Address>) -> (Vec<Utxo>, Vec<OutputRef>) {
        let mut spendable = Vec::new();
        let mut excluded = Vec::new();
        for entry in self.entries.values() {
            if entry.state != UtxoState::Unspent || !addresses.contains(&entry.utxo.address) {
                continue;
            }
            if entry.mangled {
                excluded.push(entry.utxo.output_ref);
            } else {
                spendable.push(entry.utxo.clone());
            }
        }
        (spendable, excluded)
    }

    /// Sum the lovelace and per-asset totals of a set of UTXOs.
    ///
    /// # Returns
    /// The aggregate `Value`, or `LedgerError::ValueOverflow`.
    pub fn aggregate(utxos: &[Utxo]) -> Result<Value, LedgerError> {
        let mut total = Value::default();
        for utxo in utxos {
            total = total.checked_add(&utxo.value)?;
        }
        Ok(total)
    }

    /// The lifecycle state of a UTXO, if known.
    pub fn state_of(&self, output_ref: &OutputRef) -> Option<UtxoState> {
        self.entries.get(output_ref).map(|e| e.state)
    }

    /// Whether a known UTXO is flagged as mangled.
    pub fn is_mangled(&self, output_ref: &OutputRef) -> bool {
        self.entries
            .get(output_ref)
            .map(|e| e.mangled)
            .unwrap_or(false)
    }

    /// Lock a set of UTXOs for a build in progress.
    ///
    /// All-or-nothing: if any ref is unknown, already locked, or spent,
    /// the whole call fails and no state changes.
    ///
    /// # Arguments
    /// * `refs` - The refs selected by the build.
    ///
    /// # Returns
    /// `Ok(())`, or `DoubleSpend`/`UnknownRef` naming the offending ref.
    pub fn lock(&mut self, refs: &[OutputRef]) -> Result<(), LedgerError> {
        for r in refs {
            match self.entries.get(r) {
                None => return Err(LedgerError::UnknownRef(*r)),
                Some(entry) if entry.state != UtxoState::Unspent => {
                    return Err(LedgerError::DoubleSpend(*r))
                }
                Some(_) => {}
            }
        }
        for r in refs {
            if let Some(entry) = self.entries.get_mut(r) {
                entry.state = UtxoState::Locked;
            }
        }
        debug!(count = refs.len(), "utxos locked");
        Ok(())
    }

    /// Release locked UTXOs back to `Unspent`.
    ///
    /// Lenient by design: this runs on abort paths, so unknown or
    /// already-unspent refs are ignored rather than failing the abort.
    pub fn unlock(&mut self, refs: &[OutputRef]) {
        for r in refs {
            if let Some(entry) = self.entries.get_mut(r) {
                if entry.state == UtxoState::Locked {
                    entry.state = UtxoState::Unspent;
                }
            }
        }
        debug!(count = refs.len(), "utxos unlocked");
    }

    /// Mark locked UTXOs as spent after a confirmed submission.
    ///
    /// # Arguments
    /// * `refs` - The refs consumed by the confirmed transaction.
    ///
    /// # Returns
    /// `Ok(())`, or `NotLocked`/`UnknownRef` if a ref was not locked
    /// first. Checks all refs before mutating any.
    pub fn mark_spent(&mut self, refs: &[OutputRef]) -> Result<(), LedgerError> {
        for r in refs {
            match self.entries.get(r) {
                None => return Err(LedgerError::UnknownRef(*r)),
                Some(entry) if entry.state != UtxoState::Locked => {
                    return Err(LedgerError::NotLocked(*r))
                }
                Some(_) => {}
            }
        }
        for r in refs {
            if let Some(entry) = self.entries.get_mut(r) {
                entry.state = UtxoState::Spent;
            }
        }
        debug!(count = refs.len(), "utxos marked spent");
        Ok(())
    }

    /// The number of tracked UTXOs in any state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger tracks no UTXOs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Transaction assembly.
//!
//! The builder turns a build request into an unsigned transaction:
//! acquire the address lock, gather spendable UTXOs (mangled ones
//! excluded with a warning), sequence certificates, select inputs
//! smallest-first until lovelace and every requested asset are covered,
//! resolve the fee/change fixed point, and lock the selected refs. The
//! lock is held through certificate attachment and handed to the caller
//! at finalize; every fatal error releases everything it acquired.

use std::collections::BTreeSet;

use ada_keys::Address;
use ada_ledger::{
    LockHandle, LockRegistry, RegisteredStakeKeys, StakeKeyDelta, Utxo, UtxoLedger, Value,
};
use ada_primitives::txhash::TxHash;
use tracing::debug;

use crate::certificate::{self, Certificate, SequencedCertificates};
use crate::encode;
use crate::params::ProtocolParams;
use crate::tx::{BuildWarning, TxOutput, TxState, UnsignedTx};
use crate::BuildError;

/// A requested payment: address plus value.
#[derive(Clone, Debug)]
pub struct TxTarget {
    /// The receiving address.
    pub address: Address,
    /// The lovelace and assets to pay.
    pub value: Value,
}

/// Everything a build needs from the caller.
#[derive(Clone, Debug)]
pub struct BuildRequest {
    /// The wallet addresses the build may spend from.
    pub from_addresses: BTreeSet<Address>,
    /// The requested payments.
    pub targets: Vec<TxTarget>,
    /// Where change goes.
    pub change_address: Address,
    /// Certificates to attach, in caller order.
    pub certificates: Vec<Certificate>,
    /// Absolute slot after which the transaction is invalid.
    pub ttl: u64,
}

/// A build in progress, holding its locks and staged stake key delta.
#[derive(Debug)]
pub struct PendingBuild {
    tx: UnsignedTx,
    state: TxState,
    warnings: Vec<BuildWarning>,
    selected: Vec<Utxo>,
    lock: LockHandle,
    delta: StakeKeyDelta,
    request: BuildRequest,
}

impl PendingBuild {
    /// The transaction as assembled so far.
    pub fn tx(&self) -> &UnsignedTx {
        &self.tx
    }

    /// The current lifecycle state.
    pub fn state(&self) -> TxState {
        self.state
    }

    /// Non-fatal conditions gathered during assembly.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// The UTXOs selected as inputs.
    pub fn selected(&self) -> &[Utxo] {
        &self.selected
    }
}

/// A finalized transaction: signer-ready bytes plus the computed id.
///
/// Carries the address lock handle; the caller releases it after
/// marking the inputs spent (confirmed) or unlocking them (abandoned).
#[derive(Debug)]
pub struct FinalizedTx {
    /// The finalized body.
    pub tx: UnsignedTx,
    /// Canonical body bytes for the external signer.
    pub bytes: Vec<u8>,
    /// The transaction id (Blake2b-256 of `bytes`).
    pub tx_id: TxHash,
    /// Non-fatal conditions gathered during assembly.
    pub warnings: Vec<BuildWarning>,
    /// The address lock, now owned by the caller.
    pub lock: LockHandle,
}

impl FinalizedTx {
    /// A short human-readable summary: truncated id and addresses plus
    /// totals. The only formatting this core exposes; real presentation
    /// belongs to the UI layer.
    pub fn summary(&self) -> String {
        let id = self.tx_id.to_string();
        let mut lines = vec![format!(
            "tx {}… ({} inputs, fee {} lovelace, ttl {})",
            &id[..16],
            self.tx.inputs.len(),
            self.tx.fee,
            self.tx.ttl
        )];
        for output in &self.tx.outputs {
            let addr = output.address.to_hex();
            let shown = if addr.len() > 16 {
                format!("{}…{}", &addr[..10], &addr[addr.len() - 6..])
            } else {
                addr
            };
            lines.push(format!("  → {}: {}", shown, output.value));
        }
        if !self.tx.certificates.is_empty() {
            lines.push(format!("  {} certificate(s)", self.tx.certificates.len()));
        }
        lines.join("\n")
    }
}

/// Outcome of one assembly attempt at a given input selection.
enum Attempt {
    /// The selection covers everything; the transaction is complete.
    Complete {
        tx: UnsignedTx,
        dust_folded: Option<u64>,
    },
    /// The selection is short on lovelace.
    Short { needed: u64 },
}

/// Orchestrates input selection, fee/change resolution, and certificate
/// attachment.
pub struct TransactionBuilder {
    params: ProtocolParams,
}

impl TransactionBuilder {
    /// Create a builder over the given protocol parameters.
    pub fn new(params: ProtocolParams) -> Self {
        TransactionBuilder { params }
    }

    /// The parameters this builder was constructed with.
    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Build an unsigned transaction for the request.
    ///
    /// Acquires the address lock, selects and locks inputs, and resolves
    /// fee and change. On success the returned build holds both the
    /// address lock and the input locks; on any error everything is
    /// released before returning.
    ///
    /// # Arguments
    /// * `ledger` - The UTXO index to select from.
    /// * `locks` - The address lock registry.
    /// * `stake_keys` - The registered stake key set (read-only here).
    /// * `request` - Targets, scope, change address, certificates, ttl.
    ///
    /// # Returns
    /// A `PendingBuild` in `FeeComputed` (no certificates) or
    /// `CertificatesAttached` state.
    pub fn build_unsigned_tx(
        &self,
        ledger: &mut UtxoLedger,
        locks: &LockRegistry,
        stake_keys: &RegisteredStakeKeys,
        request: BuildRequest,
    ) -> Result<PendingBuild, BuildError> {
        if request.targets.is_empty() && request.certificates.is_empty() {
            return Err(BuildError::EmptyBuild);
        }
        for target in &request.targets {
            if target.address.is_reward() {
                return Err(BuildError::RewardTarget(target.address.clone()));
            }
        }

        let lock = locks.acquire(request.from_addresses.clone())?;

        let assembled = self.assemble(ledger, stake_keys, &request);
        let (tx, selected, warnings, delta) = match assembled {
            Ok(parts) => parts,
            Err(e) => {
                locks.release(lock);
                return Err(e);
            }
        };

        if let Err(e) = ledger.lock(&tx.inputs) {
            locks.release(lock);
            return Err(e.into());
        }

        let state = if tx.certificates.is_empty() {
            TxState::FeeComputed
        } else {
            TxState::CertificatesAttached
        };
        debug!(
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            certificates = tx.certificates.len(),
            fee = tx.fee,
            "unsigned transaction assembled"
        );

        Ok(PendingBuild {
            tx,
            state,
            warnings,
            selected,
            lock,
            delta,
            request,
        })
    }

    /// Attach certificates to a build in progress.
    ///
    /// Re-assembles the transaction with the extended certificate batch:
    /// deposits change the required input coverage, so selection, fee,
    /// and change are recomputed. On any error the whole build aborts —
    /// all input locks and the address lock are released, and the
    /// registered stake key set is untouched.
    ///
    /// # Arguments
    /// * `pending` - The build to extend (consumed).
    /// * `certificates` - Certificates to append, in caller order.
    ///
    /// # Returns
    /// The re-assembled build in `CertificatesAttached` state.
    pub fn attach_certificates(
        &self,
        ledger: &mut UtxoLedger,
        locks: &LockRegistry,
        stake_keys: &RegisteredStakeKeys,
        pending: PendingBuild,
        certificates: Vec<Certificate>,
    ) -> Result<PendingBuild, BuildError> {
        let PendingBuild {
            tx,
            state,
            lock,
            mut request,
            ..
        } = pending;

        ledger.unlock(&tx.inputs);

        if !matches!(state, TxState::FeeComputed | TxState::CertificatesAttached) {
            locks.release(lock);
            return Err(BuildError::InvalidState {
                expected: "fee-computed or certificates-attached",
                actual: state,
            });
        }

        request.certificates.extend(certificates);

        let assembled = self.assemble(ledger, stake_keys, &request);
        let (tx, selected, warnings, delta) = match assembled {
            Ok(parts) => parts,
            Err(e) => {
                locks.release(lock);
                return Err(e);
            }
        };

        if let Err(e) = ledger.lock(&tx.inputs) {
            locks.release(lock);
            return Err(e.into());
        }

        Ok(PendingBuild {
            tx,
            state: TxState::CertificatesAttached,
            warnings,
            selected,
            lock,
            delta,
            request,
        })
    }

    /// Finalize a build: encode the body, compute the id, commit the
    /// staged stake key delta, and hand the address lock to the caller.
    ///
    /// The selected inputs remain locked; the caller marks them spent on
    /// confirmation or unlocks them on abandonment, then releases the
    /// lock handle.
    ///
    /// # Returns
    /// The signer-ready `FinalizedTx`.
    pub fn finalize(
        &self,
        ledger: &mut UtxoLedger,
        locks: &LockRegistry,
        stake_keys: &mut RegisteredStakeKeys,
        pending: PendingBuild,
    ) -> Result<FinalizedTx, BuildError> {
        let PendingBuild {
            tx,
            state,
            warnings,
            selected,
            lock,
            delta,
            ..
        } = pending;

        if let Err(e) = state.advance(TxState::Finalized) {
            ledger.unlock(&tx.inputs);
            locks.release(lock);
            return Err(e);
        }

        // Conservation must hold on every finalized transaction.
        debug_assert!(Self::conserves(&tx, &selected, &self.params));

        let bytes = encode::encode_body(&tx);
        let tx_id = TxHash::of_body(&bytes);
        stake_keys.commit(delta);
        debug!(%tx_id, size = bytes.len(), "transaction finalized");

        Ok(FinalizedTx {
            tx,
            bytes,
            tx_id,
            warnings,
            lock,
        })
    }

    /// Abort a build in progress, releasing every lock it holds.
    ///
    /// The staged stake key delta is dropped; `RegisteredStakeKeys` is
    /// never touched by an aborted build.
    pub fn abort(&self, ledger: &mut UtxoLedger, locks: &LockRegistry, pending: PendingBuild) {
        ledger.unlock(&pending.tx.inputs);
        locks.release(pending.lock);
        debug!("build aborted");
    }

    /// Check value conservation over a completed transaction.
    fn conserves(tx: &UnsignedTx, selected: &[Utxo], params: &ProtocolParams) -> bool {
        let deposit: u64 = tx
            .certificates
            .iter()
            .filter(|c| matches!(c.certificate, Certificate::StakeRegistration { .. }))
            .count() as u64
            * params.key_deposit;
        let refund: u64 = tx
            .certificates
            .iter()
            .filter(|c| matches!(c.certificate, Certificate::StakeDeregistration { .. }))
            .count() as u64
            * params.key_deposit;

        let input_total = match UtxoLedger::aggregate(selected) {
            Ok(v) => v,
            Err(_) => return false,
        };
        let output_total = match tx.total_output_value() {
            Ok(v) => v,
            Err(_) => return false,
        };

        input_total.lovelace + refund == output_total.lovelace + tx.fee + deposit
            && input_total.assets == output_total.assets
    }

    /// Assemble a transaction: selection plus the fee/change fixed point.
    ///
    /// Pure with respect to locks; callers handle acquisition/release.
    fn assemble(
        &self,
        ledger: &UtxoLedger,
        stake_keys: &RegisteredStakeKeys,
        request: &BuildRequest,
    ) -> Result<(UnsignedTx, Vec<Utxo>, Vec<BuildWarning>, StakeKeyDelta), BuildError> {
        let (mut spendable, excluded) = ledger.spendable(&request.from_addresses);
        let mut warnings: Vec<BuildWarning> = excluded
            .into_iter()
            .map(|output_ref| BuildWarning::UnrecognizedStakingCredential { output_ref })
            .collect();

        let sequenced = certificate::sequence(&request.certificates, stake_keys, &self.params)?;

        // Smallest-first by lovelace; refs break ties so the order is
        // fully deterministic.
        spendable.sort_by(|a, b| {
            a.value
                .lovelace
                .cmp(&b.value.lovelace)
                .then(a.output_ref.cmp(&b.output_ref))
        });

        let mut target_total = Value::default();
        for target in &request.targets {
            target_total = target_total.checked_add(&target.value)?;
        }

        let mut used = vec![false; spendable.len()];

        // Cover every requested asset first; lovelace coverage follows.
        for (asset, needed) in &target_total.assets {
            let mut have: u64 = spendable
                .iter()
                .zip(&used)
                .filter(|(_, u)| **u)
                .map(|(utxo, _)| utxo.value.assets.get(asset).copied().unwrap_or(0))
                .sum();
            while have < *needed {
                let next = spendable.iter().enumerate().find(|(i, utxo)| {
                    !used[*i] && utxo.value.assets.get(asset).copied().unwrap_or(0) > 0
                });
                match next {
                    Some((i, utxo)) => {
                        used[i] = true;
                        have += utxo.value.assets.get(asset).copied().unwrap_or(0);
                    }
                    None => {
                        return Err(BuildError::InsufficientAsset {
                            asset: asset.clone(),
                            shortfall: *needed - have,
                        })
                    }
                }
            }
        }

        // A transaction always spends at least one input, even when a
        // deregistration refund would cover the outflow by itself.
        if !used.iter().any(|u| *u) {
            if spendable.is_empty() {
                let needed = target_total
                    .lovelace
                    .saturating_add(sequenced.deposit)
                    .saturating_add(self.params.fee_constant);
                return Err(BuildError::InsufficientFunds {
                    needed,
                    available: 0,
                });
            }
            used[0] = true;
        }

        // Accumulate lovelace smallest-first until the fee/change fixed
        // point settles.
        loop {
            let selected: Vec<Utxo> = spendable
                .iter()
                .zip(&used)
                .filter(|(_, u)| **u)
                .map(|(utxo, _)| utxo.clone())
                .collect();

            match self.resolve_fee_and_change(&selected, &target_total, &sequenced, request)? {
                Attempt::Complete { tx, dust_folded } => {
                    if let Some(amount) = dust_folded {
                        warnings.push(BuildWarning::DustFolded { amount });
                    }
                    return Ok((tx, selected, warnings, sequenced.delta));
                }
                Attempt::Short { needed } => {
                    match used.iter().position(|u| !*u) {
                        Some(i) => used[i] = true,
                        None => {
                            let available = UtxoLedger::aggregate(&spendable)?
                                .lovelace
                                .saturating_add(sequenced.refund);
                            return Err(BuildError::InsufficientFunds { needed, available });
                        }
                    }
                }
            }
        }
    }

    /// Resolve the fee/change fixed point for one input selection.
    ///
    /// Computes a fee from the candidate's encoded size, derives change,
    /// and repeats until the fee reproduces itself — at most two
    /// re-computations after the initial candidate, per the change
    /// policy: a stable output count cannot keep moving the size.
    fn resolve_fee_and_change(
        &self,
        selected: &[Utxo],
        target_total: &Value,
        sequenced: &SequencedCertificates,
        request: &BuildRequest,
    ) -> Result<Attempt, BuildError> {
        let linear = self.params.linear_fee();
        let min_utxo = self.params.min_utxo_value;

        let input_total = UtxoLedger::aggregate(selected)?;
        if let Some((asset, shortfall)) = target_total.assets.iter().find_map(|(id, needed)| {
            let held = input_total.assets.get(id).copied().unwrap_or(0);
            (held < *needed).then(|| (id.clone(), *needed - held))
        }) {
            return Err(BuildError::InsufficientAsset { asset, shortfall });
        }

        // Assets not paid out ride back on the change output.
        let surplus_assets = Value {
            lovelace: 0,
            assets: input_total.assets.clone(),
        }
        .checked_sub(&Value {
            lovelace: 0,
            assets: target_total.assets.clone(),
        })?
        .assets;

        let inflow = input_total
            .lovelace
            .checked_add(sequenced.refund)
            .ok_or(ada_ledger::LedgerError::ValueOverflow)?;
        let outflow_base = target_total
            .lovelace
            .checked_add(sequenced.deposit)
            .ok_or(ada_ledger::LedgerError::ValueOverflow)?;

        let base = {
            let mut tx = UnsignedTx::new(request.ttl);
            for utxo in selected {
                tx.add_input(utxo.output_ref);
            }
            for target in &request.targets {
                tx.add_output(TxOutput::new(target.address.clone(), target.value.clone()));
            }
            tx.certificates = sequenced.certificates.clone();
            tx
        };

        let with_change = |fee: u64, change: u64| -> UnsignedTx {
            let mut tx = base.clone();
            tx.fee = fee;
            tx.add_output(TxOutput::new(
                request.change_address.clone(),
                Value {
                    lovelace: change,
                    assets: surplus_assets.clone(),
                },
            ));
            tx
        };

        // Initial candidate assumes a change output is present.
        let mut fee = linear.fee_for_size(encode::candidate_size(&with_change(0, 0)));
        let mut previous = fee;

        for _pass in 0..3 {
            let outflow = outflow_base.saturating_add(fee);
            if inflow < outflow {
                return Ok(Attempt::Short { needed: outflow });
            }
            let change = inflow - outflow;

            if !surplus_assets.is_empty() {
                // Assets can never be folded into the fee; the change
                // output is mandatory and must itself be valid.
                if change < min_utxo {
                    return Ok(Attempt::Short {
                        needed: outflow.saturating_add(min_utxo - change),
                    });
                }
                let candidate = with_change(fee, change);
                let required = linear.fee_for_size(encode::candidate_size(&candidate));
                if required == fee {
                    return Ok(Attempt::Complete {
                        tx: candidate,
                        dust_folded: None,
                    });
                }
                previous = fee;
                fee = required;
                continue;
            }

            if change >= min_utxo {
                let candidate = with_change(fee, change);
                let required = linear.fee_for_size(encode::candidate_size(&candidate));
                if required == fee {
                    return Ok(Attempt::Complete {
                        tx: candidate,
                        dust_folded: None,
                    });
                }
                previous = fee;
                fee = required;
                continue;
            }

            // Dust: fold the remainder into the fee instead of emitting
            // a below-minimum output. Dropping the change output only
            // shrinks the body, so the folded fee still covers it.
            let mut tx = base.clone();
            tx.fee = fee + change;
            let dust_folded = if change > 0 { Some(change) } else { None };
            return Ok(Attempt::Complete { tx, dust_folded });
        }

        Err(BuildError::FeeConvergence {
            previous,
            last: fee,
        })
    }
}

//! Unsigned transaction model and lifecycle.
//!
//! The transaction body holds inputs (as structural refs), outputs in
//! builder-insertion order, certificates in `cert_index` order, the fee,
//! and the ttl. The lifecycle state machine covers the full journey of a
//! transaction; this crate owns every transition up to `Finalized`, the
//! signer and submitter collaborators own the rest.

use std::fmt;

use ada_keys::Address;
use ada_ledger::{LedgerError, OutputRef, Value};
use serde::{Deserialize, Serialize};

use crate::certificate::AttachedCertificate;
use crate::BuildError;

/// A transaction output: an address and the value paid to it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TxOutput {
    /// The receiving address.
    pub address: Address,
    /// The lovelace and assets paid.
    pub value: Value,
}

impl TxOutput {
    /// Create a new output.
    pub fn new(address: Address, value: Value) -> Self {
        TxOutput { address, value }
    }
}

/// An unsigned transaction body.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct UnsignedTx {
    /// Input refs, kept sorted ascending, no duplicates.
    pub inputs: Vec<OutputRef>,
    /// Outputs in builder-insertion order.
    pub outputs: Vec<TxOutput>,
    /// Certificates in `cert_index` order.
    pub certificates: Vec<AttachedCertificate>,
    /// The fee in lovelace.
    pub fee: u64,
    /// Absolute slot after which the transaction is invalid.
    pub ttl: u64,
}

impl UnsignedTx {
    /// Create an empty transaction with the given ttl.
    pub fn new(ttl: u64) -> Self {
        UnsignedTx {
            ttl,
            ..Default::default()
        }
    }

    /// Add an input ref, keeping the list sorted and duplicate-free.
    pub fn add_input(&mut self, output_ref: OutputRef) {
        if let Err(position) = self.inputs.binary_search(&output_ref) {
            self.inputs.insert(position, output_ref);
        }
    }

    /// Append an output.
    pub fn add_output(&mut self, output: TxOutput) {
        self.outputs.push(output);
    }

    /// Sum of all output values.
    pub fn total_output_value(&self) -> Result<Value, LedgerError> {
        let mut total = Value::default();
        for output in &self.outputs {
            total = total.checked_add(&output.value)?;
        }
        Ok(total)
    }
}

/// Lifecycle state of a transaction.
///
/// This core owns `Draft` through `Finalized`; everything after belongs
/// to the signer and network collaborators.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TxState {
    /// Build started, nothing selected yet.
    Draft,
    /// Inputs selected and locked.
    InputsSelected,
    /// Fee and change resolved; conservation holds from here on.
    FeeComputed,
    /// Certificates validated and attached.
    CertificatesAttached,
    /// Body encoded, id computed; terminal for this core.
    Finalized,
    /// Witnessed by the external signer.
    Signed,
    /// Handed to the network submitter.
    Submitted,
    /// Submission accepted, awaiting confirmation.
    Pending,
    /// Confirmed on chain.
    Successful,
    /// Rejected or timed out.
    Failed,
}

impl TxState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: TxState) -> bool {
        use TxState::*;
        matches!(
            (self, next),
            (Draft, InputsSelected)
                | (InputsSelected, FeeComputed)
                | (FeeComputed, CertificatesAttached)
                | (FeeComputed, Finalized)
                | (CertificatesAttached, Finalized)
                | (Finalized, Signed)
                | (Signed, Submitted)
                | (Submitted, Pending)
                | (Submitted, Successful)
                | (Submitted, Failed)
                | (Pending, Successful)
                | (Pending, Failed)
        )
    }

    /// Transition to `next`, or fail with `InvalidState`.
    pub fn advance(self, next: TxState) -> Result<TxState, BuildError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BuildError::InvalidState {
                expected: next.name(),
                actual: self,
            })
        }
    }

    /// The state's display name.
    pub fn name(self) -> &'static str {
        match self {
            TxState::Draft => "draft",
            TxState::InputsSelected => "inputs-selected",
            TxState::FeeComputed => "fee-computed",
            TxState::CertificatesAttached => "certificates-attached",
            TxState::Finalized => "finalized",
            TxState::Signed => "signed",
            TxState::Submitted => "submitted",
            TxState::Pending => "pending",
            TxState::Successful => "successful",
            TxState::Failed => "failed",
        }
    }
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Non-fatal conditions attached to a successful build.
///
/// The caller decides whether to surface them; they never abort a build.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BuildWarning {
    /// A change amount below the dust threshold was folded into the fee.
    DustFolded {
        /// The folded lovelace amount.
        amount: u64,
    },
    /// A UTXO was excluded because its staking credential is not
    /// derivable from the wallet's seed.
    UnrecognizedStakingCredential {
        /// The excluded UTXO.
        output_ref: OutputRef,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::DustFolded { amount } => {
                write!(f, "change of {} lovelace folded into fee", amount)
            }
            BuildWarning::UnrecognizedStakingCredential { output_ref } => {
                write!(f, "utxo {} has an unrecognized staking credential", output_ref)
            }
        }
    }
}

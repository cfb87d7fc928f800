//! Canonical transaction body encoding.
//!
//! The encoded body is the single source of truth for both fee
//! computation (fee is a function of encoded size) and the transaction
//! id (Blake2b-256 of the body). Determinism rules: inputs sort
//! ascending by (tx hash, output index), outputs keep builder-insertion
//! order, certificates keep `cert_index` order, and asset bundles encode
//! in lexicographic key order.

use std::collections::BTreeMap;

use ada_ledger::value::{AssetName, PolicyId};
use ada_ledger::Value;
use ada_primitives::cbor::CborWriter;
use ada_primitives::txhash::TxHash;

use crate::certificate::Certificate;
use crate::tx::UnsignedTx;

/// Body map key for the input set.
const KEY_INPUTS: u64 = 0;
/// Body map key for the output list.
const KEY_OUTPUTS: u64 = 1;
/// Body map key for the fee.
const KEY_FEE: u64 = 2;
/// Body map key for the ttl.
const KEY_TTL: u64 = 3;
/// Body map key for the certificate list.
const KEY_CERTIFICATES: u64 = 4;

/// How to encode amounts whose magnitude is still in flux.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Sizing {
    /// Minimal-width heads; the final, canonical form.
    Canonical,
    /// Fee, ttl, and output lovelace at fixed 9-byte width, so a fee
    /// adjustment between fixed-point passes cannot change the size.
    Candidate,
}

fn write_amount(w: &mut CborWriter, amount: u64, sizing: Sizing) {
    match sizing {
        Sizing::Canonical => w.write_unsigned(amount),
        Sizing::Candidate => w.write_fixed_width_unsigned(amount),
    }
}

fn write_value(w: &mut CborWriter, value: &Value, sizing: Sizing) {
    if value.assets.is_empty() {
        write_amount(w, value.lovelace, sizing);
        return;
    }

    // Group the flat asset map by policy for the nested encoding. Both
    // levels come out in lexicographic order from the BTreeMaps.
    let mut by_policy: BTreeMap<PolicyId, BTreeMap<&AssetName, u64>> = BTreeMap::new();
    for (id, quantity) in &value.assets {
        by_policy
            .entry(id.policy_id)
            .or_default()
            .insert(&id.asset_name, *quantity);
    }

    w.write_array_header(2);
    write_amount(w, value.lovelace, sizing);
    w.write_map_header(by_policy.len());
    for (policy, assets) in &by_policy {
        w.write_bytes(&policy.0);
        w.write_map_header(assets.len());
        for (name, quantity) in assets {
            w.write_bytes(name.as_bytes());
            w.write_unsigned(*quantity);
        }
    }
}

fn write_stake_credential(w: &mut CborWriter, credential: &ada_keys::Credential) {
    w.write_array_header(2);
    w.write_unsigned(0);
    w.write_bytes(credential.as_bytes());
}

fn write_certificate(w: &mut CborWriter, certificate: &Certificate) {
    match certificate {
        Certificate::StakeRegistration { staking }
        | Certificate::StakeDeregistration { staking } => {
            w.write_array_header(2);
            w.write_unsigned(certificate.tag());
            write_stake_credential(w, staking);
        }
        Certificate::StakeDelegation { staking, pool } => {
            w.write_array_header(3);
            w.write_unsigned(certificate.tag());
            write_stake_credential(w, staking);
            w.write_bytes(&pool.0);
        }
    }
}

fn write_body(tx: &UnsignedTx, sizing: Sizing) -> Vec<u8> {
    let mut w = CborWriter::with_capacity(256);

    let entries = if tx.certificates.is_empty() { 4 } else { 5 };
    w.write_map_header(entries);

    // Inputs, sorted ascending by (tx hash, output index). The builder
    // keeps them sorted already; sorting a copy here makes the encoding
    // deterministic for hand-built bodies too.
    w.write_unsigned(KEY_INPUTS);
    let mut inputs = tx.inputs.clone();
    inputs.sort_unstable();
    w.write_array_header(inputs.len());
    for input in &inputs {
        w.write_array_header(2);
        w.write_bytes(input.tx_hash.as_bytes());
        w.write_unsigned(input.index as u64);
    }

    // Outputs in insertion order.
    w.write_unsigned(KEY_OUTPUTS);
    w.write_array_header(tx.outputs.len());
    for output in &tx.outputs {
        w.write_array_header(2);
        w.write_bytes(&output.address.to_bytes());
        write_value(&mut w, &output.value, sizing);
    }

    w.write_unsigned(KEY_FEE);
    write_amount(&mut w, tx.fee, sizing);

    w.write_unsigned(KEY_TTL);
    write_amount(&mut w, tx.ttl, sizing);

    // Certificates in cert_index order.
    if !tx.certificates.is_empty() {
        w.write_unsigned(KEY_CERTIFICATES);
        w.write_array_header(tx.certificates.len());
        for attached in &tx.certificates {
            write_certificate(&mut w, &attached.certificate);
        }
    }

    w.into_bytes()
}

/// Encode a transaction body canonically.
///
/// # Arguments
/// * `tx` - The unsigned transaction.
///
/// # Returns
/// The canonical body bytes handed to the signer and hashed for the id.
pub fn encode_body(tx: &UnsignedTx) -> Vec<u8> {
    write_body(tx, Sizing::Canonical)
}

/// The size a fee candidate occupies, with in-flux amounts at fixed
/// width.
///
/// Always at least the canonical size, so a fee computed from it covers
/// the finalized body.
///
/// # Arguments
/// * `tx` - The candidate transaction.
///
/// # Returns
/// The candidate's encoded byte size.
pub fn candidate_size(tx: &UnsignedTx) -> usize {
    write_body(tx, Sizing::Candidate).len()
}

/// Compute the transaction id: Blake2b-256 of the canonical body.
///
/// # Arguments
/// * `tx` - The unsigned transaction.
///
/// # Returns
/// The transaction id.
pub fn tx_id(tx: &UnsignedTx) -> TxHash {
    TxHash::of_body(&encode_body(tx))
}

use std::collections::BTreeSet;

use proptest::prelude::*;

use ada_keys::{Address, AddressKind, Chain, HdPath, KeyDeriver, Network};
use ada_ledger::{LockRegistry, OutputRef, RegisteredStakeKeys, Utxo, UtxoLedger, Value};
use ada_primitives::txhash::TxHash;
use ada_transaction::{
    BuildError, BuildRequest, Certificate, ProtocolParams, TransactionBuilder, TxTarget,
};

const SEED: &[u8] = b"proptest wallet seed 0123456789ab";

fn deriver() -> KeyDeriver {
    KeyDeriver::new(SEED)
}

fn wallet_address() -> Address {
    deriver()
        .derive(
            &HdPath::cip1852(0, Chain::External, 0),
            AddressKind::Base,
            Network::Testnet,
        )
        .unwrap()
}

fn change_address() -> Address {
    deriver()
        .derive(
            &HdPath::cip1852(0, Chain::Internal, 0),
            AddressKind::Base,
            Network::Testnet,
        )
        .unwrap()
}

fn recipient() -> Address {
    KeyDeriver::new(b"proptest recipient seed 01234567")
        .derive(
            &HdPath::cip1852(0, Chain::External, 0),
            AddressKind::Enterprise,
            Network::Testnet,
        )
        .unwrap()
}

fn params() -> ProtocolParams {
    ProtocolParams {
        fee_coefficient: 44,
        fee_constant: 155_381,
        min_utxo_value: 1_000_000,
        key_deposit: 2_000_000,
        pool_deposit: 500_000_000,
        ttl_offset: 7200,
        network: Network::Testnet,
    }
}

fn build(
    utxo_amounts: &[u64],
    target_amount: u64,
) -> (
    Result<(ada_transaction::UnsignedTx, Vec<Utxo>), BuildError>,
    UtxoLedger,
) {
    let mut ledger = UtxoLedger::new();
    ledger.register_staking_credential(deriver().staking_credential(0));
    let utxos: Vec<Utxo> = utxo_amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            let mut bytes = [0u8; 32];
            bytes[0] = i as u8;
            Utxo::new(
                OutputRef::new(TxHash::new(bytes), 0),
                wallet_address(),
                Value::new(*amount),
            )
        })
        .collect();
    ledger.ingest(utxos);

    let locks = LockRegistry::new();
    let stake_keys = RegisteredStakeKeys::new();
    let builder = TransactionBuilder::new(params());
    let from_addresses: BTreeSet<Address> =
        [wallet_address(), change_address()].into_iter().collect();

    let result = builder
        .build_unsigned_tx(
            &mut ledger,
            &locks,
            &stake_keys,
            BuildRequest {
                from_addresses,
                targets: vec![TxTarget {
                    address: recipient(),
                    value: Value::new(target_amount),
                }],
                change_address: change_address(),
                certificates: vec![],
                ttl: 7200,
            },
        )
        .map(|pending| (pending.tx().clone(), pending.selected().to_vec()));
    (result, ledger)
}

fn certificate_deposits(tx: &ada_transaction::UnsignedTx, key_deposit: u64) -> (u64, u64) {
    let deposits = tx
        .certificates
        .iter()
        .filter(|c| matches!(c.certificate, Certificate::StakeRegistration { .. }))
        .count() as u64
        * key_deposit;
    let refunds = tx
        .certificates
        .iter()
        .filter(|c| matches!(c.certificate, Certificate::StakeDeregistration { .. }))
        .count() as u64
        * key_deposit;
    (deposits, refunds)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn successful_builds_conserve_value(
        utxo_amounts in prop::collection::vec(200_000u64..20_000_000, 1..8),
        target_amount in 1u64..5_000_000,
    ) {
        let (result, _ledger) = build(&utxo_amounts, target_amount);
        if let Ok((tx, selected)) = result {
            let (deposits, refunds) = certificate_deposits(&tx, params().key_deposit);
            let input_total = UtxoLedger::aggregate(&selected).unwrap();
            let output_total = tx.total_output_value().unwrap();
            prop_assert_eq!(
                input_total.lovelace + refunds,
                output_total.lovelace + tx.fee + deposits
            );
            prop_assert_eq!(input_total.assets, output_total.assets);
        }
    }

    #[test]
    fn change_is_never_dust(
        utxo_amounts in prop::collection::vec(200_000u64..20_000_000, 1..8),
        target_amount in 1u64..5_000_000,
    ) {
        let (result, _ledger) = build(&utxo_amounts, target_amount);
        if let Ok((tx, _)) = result {
            for output in &tx.outputs {
                if output.address == change_address() {
                    prop_assert!(output.value.lovelace >= params().min_utxo_value);
                }
            }
        }
    }

    #[test]
    fn failed_builds_leave_every_utxo_unspent(
        utxo_amounts in prop::collection::vec(1u64..500_000, 1..4),
        target_amount in 10_000_000u64..50_000_000,
    ) {
        let (result, ledger) = build(&utxo_amounts, target_amount);
        if result.is_err() {
            for i in 0..utxo_amounts.len() {
                let mut bytes = [0u8; 32];
                bytes[0] = i as u8;
                let state = ledger.state_of(&OutputRef::new(TxHash::new(bytes), 0));
                prop_assert_eq!(state, Some(ada_ledger::UtxoState::Unspent));
            }
        }
    }

    #[test]
    fn inputs_are_sorted_and_unique(
        utxo_amounts in prop::collection::vec(200_000u64..2_000_000, 1..8),
        target_amount in 1u64..3_000_000,
    ) {
        let (result, _ledger) = build(&utxo_amounts, target_amount);
        if let Ok((tx, _)) = result {
            prop_assert!(tx.inputs.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn certificate_indices_match_positions(
        register in any::<bool>(),
        delegate in any::<bool>(),
    ) {
        let mut ledger = UtxoLedger::new();
        ledger.register_staking_credential(deriver().staking_credential(0));
        ledger.ingest(vec![Utxo::new(
            OutputRef::new(TxHash::new([1u8; 32]), 0),
            wallet_address(),
            Value::new(50_000_000),
        )]);

        let mut certificates = Vec::new();
        if register {
            certificates.push(Certificate::StakeRegistration {
                staking: deriver().staking_credential(0),
            });
        }
        if register && delegate {
            certificates.push(Certificate::StakeDelegation {
                staking: deriver().staking_credential(0),
                pool: ada_transaction::PoolKeyHash([7; 28]),
            });
        }

        let locks = LockRegistry::new();
        let stake_keys = RegisteredStakeKeys::new();
        let builder = TransactionBuilder::new(params());
        let from_addresses: BTreeSet<Address> =
            [wallet_address(), change_address()].into_iter().collect();

        let result = builder.build_unsigned_tx(
            &mut ledger,
            &locks,
            &stake_keys,
            BuildRequest {
                from_addresses,
                targets: vec![TxTarget {
                    address: recipient(),
                    value: Value::new(1_500_000),
                }],
                change_address: change_address(),
                certificates,
                ttl: 7200,
            },
        );

        let pending = result.unwrap();
        for (i, attached) in pending.tx().certificates.iter().enumerate() {
            prop_assert_eq!(attached.cert_index, i as u32);
        }
    }
}

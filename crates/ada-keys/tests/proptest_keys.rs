use proptest::prelude::*;

use ada_keys::{Address, AddressKind, Chain, ChainPointer, Credential, HdPath, KeyDeriver, Network};

fn arb_chain() -> impl Strategy<Value = Chain> {
    prop_oneof![
        Just(Chain::External),
        Just(Chain::Internal),
        Just(Chain::ChimericAccount),
    ]
}

fn arb_network() -> impl Strategy<Value = Network> {
    prop_oneof![Just(Network::Mainnet), Just(Network::Testnet)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn derivation_is_deterministic(
        seed in prop::collection::vec(any::<u8>(), 16..64),
        account in 0u32..8,
        chain in arb_chain(),
        index in 0u32..1024,
    ) {
        let path = HdPath::cip1852(account, chain, index);
        let a = KeyDeriver::new(&seed).credential(&path);
        let b = KeyDeriver::new(&seed).credential(&path);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn distinct_indices_give_distinct_credentials(
        seed in prop::collection::vec(any::<u8>(), 16..64),
        index_a in 0u32..512,
        index_b in 0u32..512,
    ) {
        prop_assume!(index_a != index_b);
        let deriver = KeyDeriver::new(&seed);
        let a = deriver.credential(&HdPath::cip1852(0, Chain::External, index_a));
        let b = deriver.credential(&HdPath::cip1852(0, Chain::External, index_b));
        prop_assert_ne!(a, b);
    }

    #[test]
    fn address_bytes_roundtrip(
        payment in prop::array::uniform28(any::<u8>()),
        staking in prop::array::uniform28(any::<u8>()),
        network in arb_network(),
        slot in any::<u64>(),
        tx_index in 0u64..65536,
        cert_index in 0u64..256,
    ) {
        let addresses = vec![
            Address::Enterprise { payment: Credential::new(payment), network },
            Address::Base {
                payment: Credential::new(payment),
                staking: Credential::new(staking),
                network,
            },
            Address::Pointer {
                payment: Credential::new(payment),
                pointer: ChainPointer { slot, tx_index, cert_index },
                network,
            },
            Address::Reward { staking: Credential::new(staking), network },
            Address::Byron { root: Credential::new(payment), network },
        ];
        for address in addresses {
            let parsed = Address::from_bytes(&address.to_bytes()).unwrap();
            prop_assert_eq!(&address, &parsed);
            prop_assert_eq!(address.to_bytes(), parsed.to_bytes());
        }
    }

    #[test]
    fn derived_addresses_roundtrip_through_hex(
        seed in prop::collection::vec(any::<u8>(), 16..64),
        index in 0u32..256,
        network in arb_network(),
    ) {
        let deriver = KeyDeriver::new(&seed);
        let address = deriver
            .derive(&HdPath::cip1852(0, Chain::External, index), AddressKind::Base, network)
            .unwrap();
        let parsed = Address::from_hex(&address.to_hex()).unwrap();
        prop_assert_eq!(address, parsed);
    }
}

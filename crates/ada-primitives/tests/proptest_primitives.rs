use proptest::prelude::*;

use ada_primitives::cbor::CborWriter;
use ada_primitives::hash::{blake2b_224, blake2b_256, sha512_hmac};
use ada_primitives::txhash::TxHash;

/// Expected minimal head width for an unsigned argument.
fn head_width(value: u64) -> usize {
    if value < 24 {
        1
    } else if value <= u8::MAX as u64 {
        2
    } else if value <= u16::MAX as u64 {
        3
    } else if value <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn unsigned_heads_are_minimal_width(value in any::<u64>()) {
        let mut w = CborWriter::new();
        w.write_unsigned(value);
        prop_assert_eq!(w.len(), head_width(value));
    }

    #[test]
    fn byte_strings_carry_exact_payload(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut w = CborWriter::new();
        w.write_bytes(&bytes);
        let encoded = w.into_bytes();
        prop_assert_eq!(encoded.len(), head_width(bytes.len() as u64) + bytes.len());
        prop_assert_eq!(&encoded[encoded.len() - bytes.len()..], &bytes[..]);
    }

    #[test]
    fn fixed_width_unsigned_never_shorter_than_minimal(value in any::<u64>()) {
        let mut minimal = CborWriter::new();
        minimal.write_unsigned(value);
        let mut fixed = CborWriter::new();
        fixed.write_fixed_width_unsigned(value);
        prop_assert!(fixed.len() >= minimal.len());
        prop_assert_eq!(fixed.len(), 9);
    }

    #[test]
    fn hashes_are_deterministic(data in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assert_eq!(blake2b_224(&data), blake2b_224(&data));
        prop_assert_eq!(blake2b_256(&data), blake2b_256(&data));
    }

    #[test]
    fn hmac_is_deterministic(
        key in prop::collection::vec(any::<u8>(), 1..64),
        data in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assert_eq!(sha512_hmac(&key, &data), sha512_hmac(&key, &data));
    }

    #[test]
    fn txhash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = TxHash::new(bytes);
        let parsed = TxHash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(hash, parsed);
    }
}

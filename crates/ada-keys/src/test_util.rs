//! Test utilities for degraded-address scenarios.
//!
//! A "mangled" address pairs a wallet-controlled payment credential with
//! staking credential bytes that no key derivable from the wallet's seed
//! can produce. Wallets must treat UTXOs under such addresses as
//! unspendable by automatic selection. No production code path constructs
//! one; this module exists so tests can.

use crate::address::{Address, Credential};
use crate::derive::KeyDeriver;
use crate::path::HdPath;
use crate::Network;

/// Construct a base address whose staking credential is foreign to the
/// wallet.
///
/// The payment credential is derived normally from `deriver` at `path`;
/// the staking credential comes from an unrelated deriver seeded with
/// `foreign_seed`, so it cannot be recognized by the wallet.
///
/// # Arguments
/// * `deriver` - The wallet's own key deriver.
/// * `path` - Payment key path (CIP-1852, external or internal chain).
/// * `foreign_seed` - Seed for the unrecognizable staking credential.
/// * `network` - The network the address targets.
pub fn mangled_base(
    deriver: &KeyDeriver,
    path: &HdPath,
    foreign_seed: &[u8],
    network: Network,
) -> Address {
    let payment = deriver.credential(path);
    let staking = KeyDeriver::new(foreign_seed).staking_credential(0);
    Address::Base {
        payment,
        staking,
        network,
    }
}

/// Construct a base address from an explicit pair of credentials.
///
/// Useful when a test needs full control over the staking bytes.
pub fn base_with_staking(payment: Credential, staking: Credential, network: Network) -> Address {
    Address::Base {
        payment,
        staking,
        network,
    }
}

//! Deterministic credential derivation from a wallet seed.
//!
//! KeyDeriver walks an HD path from the root key material, chaining
//! HMAC-SHA-512 at every level, and hashes the resulting key bytes into
//! a Blake2b-224 credential. Identical (seed, path, kind) inputs always
//! yield byte-identical addresses.

use ada_primitives::hash::{blake2b_224, sha512_hmac};

use crate::address::{Address, AddressKind, Credential};
use crate::path::{Chain, DerivationScheme, HdPath, Segment};
use crate::{KeysError, Network};

/// Domain separation string mixed into the root key derivation.
const ROOT_DOMAIN: &[u8] = b"ada hd seed";

/// Key material at one level of the derivation tree.
#[derive(Clone)]
struct DerivedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl DerivedKey {
    fn from_digest(digest: [u8; 64]) -> Self {
        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&digest[..32]);
        chain_code.copy_from_slice(&digest[32..]);
        DerivedKey { key, chain_code }
    }
}

/// Derives credentials and addresses from a wallet seed.
///
/// Holds only the root key material; the seed itself is consumed at
/// construction and never stored or logged.
#[derive(Clone)]
pub struct KeyDeriver {
    root: DerivedKey,
}

impl KeyDeriver {
    /// Create a new KeyDeriver from a wallet seed.
    ///
    /// # Arguments
    /// * `seed` - Entropy from the key-management collaborator.
    pub fn new(seed: &[u8]) -> Self {
        KeyDeriver {
            root: DerivedKey::from_digest(sha512_hmac(ROOT_DOMAIN, seed)),
        }
    }

    /// Derive one child level.
    ///
    /// Hardened segments are domain-separated from soft ones so the two
    /// index spaces can never collide.
    fn child(parent: &DerivedKey, segment: Segment) -> DerivedKey {
        let mut data = Vec::with_capacity(1 + 32 + 4);
        data.push(if segment.hardened { 0x00 } else { 0x02 });
        data.extend_from_slice(&parent.key);
        data.extend_from_slice(&segment.index.to_be_bytes());
        DerivedKey::from_digest(sha512_hmac(&parent.chain_code, &data))
    }

    /// Walk the full path from the root.
    fn key_at(&self, path: &HdPath) -> DerivedKey {
        let mut key = self.root.clone();
        for segment in path.segments() {
            key = Self::child(&key, segment);
        }
        key
    }

    /// Derive the credential at the given path.
    ///
    /// # Arguments
    /// * `path` - The full five-level derivation path.
    ///
    /// # Returns
    /// The Blake2b-224 credential of the derived key.
    pub fn credential(&self, path: &HdPath) -> Credential {
        Credential::new(blake2b_224(&self.key_at(path).key))
    }

    /// The account's staking credential: chimeric chain, index 0.
    ///
    /// # Arguments
    /// * `account` - The account number.
    ///
    /// # Returns
    /// The staking credential base addresses of this account pair with.
    pub fn staking_credential(&self, account: u32) -> Credential {
        self.credential(&HdPath::cip1852(account, Chain::ChimericAccount, 0))
    }

    /// Derive an address of the given kind at the given path.
    ///
    /// Deterministic and pure: identical (seed, path, kind, network)
    /// always yields identical bytes.
    ///
    /// # Arguments
    /// * `path` - The derivation path for the payment (or staking) key.
    /// * `kind` - The address kind to construct.
    /// * `network` - The network the address targets.
    ///
    /// # Returns
    /// `Ok(Address)` on success. Fails with `SchemeKindMismatch` when the
    /// path's scheme cannot produce the kind, and `InvalidChainForKind`
    /// when the chain level is wrong for it (reward addresses require the
    /// chimeric account chain; no other kind may use it).
    pub fn derive(
        &self,
        path: &HdPath,
        kind: AddressKind,
        network: Network,
    ) -> Result<Address, KeysError> {
        let scheme = path.scheme()?;

        match kind {
            AddressKind::Byron => {
                if scheme != DerivationScheme::Bip44 {
                    return Err(KeysError::SchemeKindMismatch {
                        kind: kind.name(),
                        scheme,
                    });
                }
                if path.chain == Chain::ChimericAccount {
                    return Err(KeysError::InvalidChainForKind {
                        kind: kind.name(),
                        chain: path.chain,
                    });
                }
                Ok(Address::Byron {
                    root: self.credential(path),
                    network,
                })
            }
            AddressKind::Reward => {
                if scheme != DerivationScheme::Cip1852 {
                    return Err(KeysError::SchemeKindMismatch {
                        kind: kind.name(),
                        scheme,
                    });
                }
                if path.chain != Chain::ChimericAccount {
                    return Err(KeysError::InvalidChainForKind {
                        kind: kind.name(),
                        chain: path.chain,
                    });
                }
                Ok(Address::Reward {
                    staking: self.credential(path),
                    network,
                })
            }
            AddressKind::Enterprise | AddressKind::Base | AddressKind::Pointer(_) => {
                if scheme != DerivationScheme::Cip1852 {
                    return Err(KeysError::SchemeKindMismatch {
                        kind: kind.name(),
                        scheme,
                    });
                }
                if path.chain == Chain::ChimericAccount {
                    return Err(KeysError::InvalidChainForKind {
                        kind: kind.name(),
                        chain: path.chain,
                    });
                }
                let payment = self.credential(path);
                Ok(match kind {
                    AddressKind::Enterprise => Address::Enterprise { payment, network },
                    AddressKind::Base => Address::Base {
                        payment,
                        staking: self.staking_credential(path.account.index),
                        network,
                    },
                    AddressKind::Pointer(pointer) => Address::Pointer {
                        payment,
                        pointer,
                        network,
                    },
                    _ => unreachable!("outer match restricts kinds"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ChainPointer;

    const SEED: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_derivation_is_deterministic() {
        let a = KeyDeriver::new(SEED);
        let b = KeyDeriver::new(SEED);
        let path = HdPath::cip1852(0, Chain::External, 5);

        let addr_a = a.derive(&path, AddressKind::Base, Network::Mainnet).unwrap();
        let addr_b = b.derive(&path, AddressKind::Base, Network::Mainnet).unwrap();
        assert_eq!(addr_a.to_bytes(), addr_b.to_bytes());
    }

    #[test]
    fn test_distinct_paths_distinct_credentials() {
        let deriver = KeyDeriver::new(SEED);
        let a = deriver.credential(&HdPath::cip1852(0, Chain::External, 0));
        let b = deriver.credential(&HdPath::cip1852(0, Chain::External, 1));
        let c = deriver.credential(&HdPath::cip1852(0, Chain::Internal, 0));
        let d = deriver.credential(&HdPath::cip1852(1, Chain::External, 0));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_distinct_seeds_distinct_credentials() {
        let path = HdPath::cip1852(0, Chain::External, 0);
        let a = KeyDeriver::new(SEED).credential(&path);
        let b = KeyDeriver::new(b"another seed entirely").credential(&path);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hardened_and_soft_do_not_collide() {
        let deriver = KeyDeriver::new(SEED);
        let mut hardened = HdPath::cip1852(0, Chain::External, 7);
        hardened.index = Segment::hardened(7);
        let soft = HdPath::cip1852(0, Chain::External, 7);
        assert_ne!(deriver.credential(&hardened), deriver.credential(&soft));
    }

    #[test]
    fn test_base_address_pairs_account_staking_credential() {
        let deriver = KeyDeriver::new(SEED);
        let addr = deriver
            .derive(
                &HdPath::cip1852(0, Chain::External, 0),
                AddressKind::Base,
                Network::Mainnet,
            )
            .unwrap();
        assert_eq!(
            addr.staking_credential(),
            Some(&deriver.staking_credential(0))
        );
    }

    #[test]
    fn test_reward_requires_chimeric_chain() {
        let deriver = KeyDeriver::new(SEED);

        let err = deriver
            .derive(
                &HdPath::cip1852(0, Chain::External, 0),
                AddressKind::Reward,
                Network::Mainnet,
            )
            .unwrap_err();
        assert!(matches!(err, KeysError::InvalidChainForKind { .. }));

        let ok = deriver.derive(
            &HdPath::cip1852(0, Chain::ChimericAccount, 0),
            AddressKind::Reward,
            Network::Mainnet,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_non_reward_kinds_reject_chimeric_chain() {
        let deriver = KeyDeriver::new(SEED);
        let path = HdPath::cip1852(0, Chain::ChimericAccount, 0);

        for kind in [
            AddressKind::Enterprise,
            AddressKind::Base,
            AddressKind::Pointer(ChainPointer {
                slot: 1,
                tx_index: 0,
                cert_index: 0,
            }),
        ] {
            let err = deriver.derive(&path, kind, Network::Mainnet).unwrap_err();
            assert!(
                matches!(err, KeysError::InvalidChainForKind { .. }),
                "kind {}",
                kind.name()
            );
        }
    }

    #[test]
    fn test_scheme_kind_mismatch() {
        let deriver = KeyDeriver::new(SEED);

        // Shelley kinds are not derivable under BIP-44.
        let err = deriver
            .derive(
                &HdPath::bip44(0, Chain::External, 0),
                AddressKind::Base,
                Network::Mainnet,
            )
            .unwrap_err();
        assert!(matches!(err, KeysError::SchemeKindMismatch { .. }));

        // Byron addresses are not derivable under CIP-1852.
        let err = deriver
            .derive(
                &HdPath::cip1852(0, Chain::External, 0),
                AddressKind::Byron,
                Network::Mainnet,
            )
            .unwrap_err();
        assert!(matches!(err, KeysError::SchemeKindMismatch { .. }));

        // Byron derivation under BIP-44 works.
        let ok = deriver.derive(
            &HdPath::bip44(0, Chain::External, 0),
            AddressKind::Byron,
            Network::Mainnet,
        );
        assert!(ok.is_ok());
    }
}

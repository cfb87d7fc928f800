//! Staking certificates and their sequencing rules.
//!
//! Certificates attach to a transaction in a fixed order — any
//! registration first, then delegation or deregistration — and each is
//! validated against the effective registered set: the on-chain set plus
//! whatever earlier certificates in the same batch changed. Deposits and
//! refunds are accounted here so the builder can fold them into input
//! coverage.

use std::collections::BTreeSet;
use std::fmt;

use ada_keys::Credential;
use ada_ledger::{RegisteredStakeKeys, StakeKeyDelta};
use serde::{Deserialize, Serialize};

use crate::params::ProtocolParams;
use crate::BuildError;

/// Size of a pool key hash in bytes.
pub const POOL_KEY_HASH_SIZE: usize = 28;

/// A 28-byte stake pool key hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PoolKeyHash(pub [u8; POOL_KEY_HASH_SIZE]);

impl fmt::Display for PoolKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// An on-chain staking directive.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Certificate {
    /// Register a stake key, locking the key deposit.
    StakeRegistration {
        /// The staking credential being registered.
        staking: Credential,
    },
    /// Delegate a registered stake key to a pool.
    StakeDelegation {
        /// The staking credential delegating.
        staking: Credential,
        /// The target pool.
        pool: PoolKeyHash,
    },
    /// Deregister a stake key, refunding the key deposit.
    StakeDeregistration {
        /// The staking credential being deregistered.
        staking: Credential,
    },
}

impl Certificate {
    /// The staking credential the certificate concerns.
    pub fn staking_credential(&self) -> &Credential {
        match self {
            Certificate::StakeRegistration { staking }
            | Certificate::StakeDelegation { staking, .. }
            | Certificate::StakeDeregistration { staking } => staking,
        }
    }

    /// The certificate's wire tag in the encoded body.
    pub(crate) fn tag(&self) -> u64 {
        match self {
            Certificate::StakeRegistration { .. } => 0,
            Certificate::StakeDeregistration { .. } => 1,
            Certificate::StakeDelegation { .. } => 2,
        }
    }

    fn is_registration(&self) -> bool {
        matches!(self, Certificate::StakeRegistration { .. })
    }
}

/// A certificate bound to its position in the transaction.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AttachedCertificate {
    /// The certificate.
    pub certificate: Certificate,
    /// Position within the transaction's certificate list, from 0.
    pub cert_index: u32,
}

/// The result of sequencing a certificate batch.
#[derive(Debug, Default)]
pub struct SequencedCertificates {
    /// Certificates in attachment order, indices assigned.
    pub certificates: Vec<AttachedCertificate>,
    /// Staged stake key set changes, committed at finalize.
    pub delta: StakeKeyDelta,
    /// Total deposits required by registrations (lovelace outflow).
    pub deposit: u64,
    /// Total refunds from deregistrations (implicit lovelace inflow).
    pub refund: u64,
}

/// Order and validate a certificate batch.
///
/// Registrations move to the front (stable within each group), then
/// `cert_index` is assigned by position starting at 0. Each certificate
/// is checked against the effective registered set:
///
/// - registering an already-registered credential fails
///   [`BuildError::AlreadyRegistered`];
/// - delegating or deregistering a credential absent from the effective
///   set fails [`BuildError::NotRegistered`].
///
/// # Arguments
/// * `batch` - Certificates in caller order.
/// * `registered` - The on-chain registered stake key set.
/// * `params` - Protocol parameters supplying the key deposit.
///
/// # Returns
/// The ordered certificates, the staged delta, and deposit/refund totals.
pub fn sequence(
    batch: &[Certificate],
    registered: &RegisteredStakeKeys,
    params: &ProtocolParams,
) -> Result<SequencedCertificates, BuildError> {
    if batch.is_empty() {
        return Ok(SequencedCertificates::default());
    }

    // Fixed attachment order: registrations first.
    let mut ordered: Vec<&Certificate> = batch.iter().filter(|c| c.is_registration()).collect();
    ordered.extend(batch.iter().filter(|c| !c.is_registration()));

    let mut effective_added: BTreeSet<Credential> = BTreeSet::new();
    let mut effective_removed: BTreeSet<Credential> = BTreeSet::new();
    let mut sequenced = SequencedCertificates::default();

    for (position, certificate) in ordered.into_iter().enumerate() {
        let staking = *certificate.staking_credential();
        let currently_registered = (registered.is_registered(&staking)
            || effective_added.contains(&staking))
            && !effective_removed.contains(&staking);

        match certificate {
            Certificate::StakeRegistration { .. } => {
                if currently_registered {
                    return Err(BuildError::AlreadyRegistered(staking));
                }
                effective_added.insert(staking);
                effective_removed.remove(&staking);
                sequenced.delta.add(staking);
                sequenced.deposit += params.key_deposit;
            }
            Certificate::StakeDelegation { .. } => {
                if !currently_registered {
                    return Err(BuildError::NotRegistered(staking));
                }
            }
            Certificate::StakeDeregistration { .. } => {
                if !currently_registered {
                    return Err(BuildError::NotRegistered(staking));
                }
                effective_removed.insert(staking);
                sequenced.delta.remove(staking);
                sequenced.refund += params.key_deposit;
            }
        }

        sequenced.certificates.push(AttachedCertificate {
            certificate: certificate.clone(),
            cert_index: position as u32,
        });
    }

    Ok(sequenced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ada_keys::Network;

    fn params() -> ProtocolParams {
        ProtocolParams {
            fee_coefficient: 44,
            fee_constant: 155381,
            min_utxo_value: 1_000_000,
            key_deposit: 2_000_000,
            pool_deposit: 500_000_000,
            ttl_offset: 7200,
            network: Network::Testnet,
        }
    }

    fn credential(fill: u8) -> Credential {
        Credential::new([fill; 28])
    }

    fn pool(fill: u8) -> PoolKeyHash {
        PoolKeyHash([fill; POOL_KEY_HASH_SIZE])
    }

    #[test]
    fn test_registration_moves_first_and_indices_are_positional() {
        let staking = credential(1);
        let batch = vec![
            Certificate::StakeDelegation {
                staking,
                pool: pool(9),
            },
            Certificate::StakeRegistration { staking },
        ];

        let sequenced = sequence(&batch, &RegisteredStakeKeys::new(), &params()).unwrap();
        assert_eq!(sequenced.certificates.len(), 2);
        assert!(matches!(
            sequenced.certificates[0].certificate,
            Certificate::StakeRegistration { .. }
        ));
        for (i, attached) in sequenced.certificates.iter().enumerate() {
            assert_eq!(attached.cert_index, i as u32);
        }
        assert_eq!(sequenced.deposit, 2_000_000);
        assert_eq!(sequenced.refund, 0);
    }

    #[test]
    fn test_delegation_requires_registration() {
        let staking = credential(1);
        let batch = vec![Certificate::StakeDelegation {
            staking,
            pool: pool(9),
        }];

        let err = sequence(&batch, &RegisteredStakeKeys::new(), &params()).unwrap_err();
        assert!(matches!(err, BuildError::NotRegistered(c) if c == staking));

        // With the credential already on chain it passes.
        let registered = RegisteredStakeKeys::from_snapshot([staking]);
        assert!(sequence(&batch, &registered, &params()).is_ok());
    }

    #[test]
    fn test_double_registration_rejected() {
        let staking = credential(1);
        let registered = RegisteredStakeKeys::from_snapshot([staking]);
        let batch = vec![Certificate::StakeRegistration { staking }];

        let err = sequence(&batch, &registered, &params()).unwrap_err();
        assert!(matches!(err, BuildError::AlreadyRegistered(c) if c == staking));

        // Two registrations in one batch collide on the effective set.
        let batch = vec![
            Certificate::StakeRegistration { staking },
            Certificate::StakeRegistration { staking },
        ];
        let err = sequence(&batch, &RegisteredStakeKeys::new(), &params()).unwrap_err();
        assert!(matches!(err, BuildError::AlreadyRegistered(_)));
    }

    #[test]
    fn test_deregistration_refunds_deposit() {
        let staking = credential(1);
        let registered = RegisteredStakeKeys::from_snapshot([staking]);
        let batch = vec![Certificate::StakeDeregistration { staking }];

        let sequenced = sequence(&batch, &registered, &params()).unwrap();
        assert_eq!(sequenced.deposit, 0);
        assert_eq!(sequenced.refund, 2_000_000);
        assert_eq!(sequenced.delta.removals(), &[staking]);
    }

    #[test]
    fn test_deregistered_credential_cannot_delegate_later_in_batch() {
        let staking = credential(1);
        let registered = RegisteredStakeKeys::from_snapshot([staking]);
        let batch = vec![
            Certificate::StakeDeregistration { staking },
            Certificate::StakeDelegation {
                staking,
                pool: pool(2),
            },
        ];

        let err = sequence(&batch, &registered, &params()).unwrap_err();
        assert!(matches!(err, BuildError::NotRegistered(_)));
    }

    #[test]
    fn test_empty_batch() {
        let sequenced = sequence(&[], &RegisteredStakeKeys::new(), &params()).unwrap();
        assert!(sequenced.certificates.is_empty());
        assert!(sequenced.delta.is_empty());
    }
}

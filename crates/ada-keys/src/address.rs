//! Address kinds and byte encoding.
//!
//! Supports the Shelley-era address kinds (enterprise, base, pointer,
//! reward) and legacy Byron addresses, each encoded as a single header
//! byte (kind nibble + network nibble) followed by the credential
//! payload. Equality is structural over the encoded bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::KeysError;

/// Size of a credential hash in bytes (Blake2b-224).
pub const CREDENTIAL_SIZE: usize = 28;

/// Header nibble for base addresses.
const HEADER_BASE: u8 = 0b0000;
/// Header nibble for pointer addresses.
const HEADER_POINTER: u8 = 0b0100;
/// Header nibble for enterprise addresses.
const HEADER_ENTERPRISE: u8 = 0b0110;
/// Header nibble for legacy Byron addresses.
const HEADER_BYRON: u8 = 0b1000;
/// Header nibble for reward addresses.
const HEADER_REWARD: u8 = 0b1110;

/// A 28-byte key-hash credential controlling payment or staking rights.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Credential([u8; CREDENTIAL_SIZE]);

impl Credential {
    /// Create a credential from a raw 28-byte array.
    pub fn new(bytes: [u8; CREDENTIAL_SIZE]) -> Self {
        Credential(bytes)
    }

    /// Create a credential from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 28 bytes.
    ///
    /// # Returns
    /// `Ok(Credential)` if the slice is 28 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeysError> {
        if bytes.len() != CREDENTIAL_SIZE {
            return Err(KeysError::InvalidCredentialLength(bytes.len()));
        }
        let mut arr = [0u8; CREDENTIAL_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Credential(arr))
    }

    /// Access the internal byte array as a reference.
    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_SIZE] {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        Credential::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Network discriminator carried in the address header nibble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Network {
    /// Mainnet (network tag 1).
    Mainnet,
    /// Testnet (network tag 0).
    Testnet,
}

impl Network {
    /// The network tag carried in the low nibble of the header byte.
    pub fn tag(self) -> u8 {
        match self {
            Network::Mainnet => 1,
            Network::Testnet => 0,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, KeysError> {
        match tag {
            1 => Ok(Network::Mainnet),
            0 => Ok(Network::Testnet),
            other => Err(KeysError::InvalidAddress(format!(
                "unknown network tag {}",
                other
            ))),
        }
    }
}

/// A certificate pointer locating a stake registration on chain.
///
/// Pointer addresses reference their staking rights indirectly through
/// the (slot, transaction index, certificate index) at which the stake
/// key was registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainPointer {
    /// Absolute slot of the registration transaction's block.
    pub slot: u64,
    /// Index of the registration transaction within the block.
    pub tx_index: u64,
    /// Index of the registration certificate within the transaction.
    pub cert_index: u64,
}

/// The kind of address to derive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// Payment credential only; no staking rights.
    Enterprise,
    /// Payment credential paired with the account's staking credential.
    Base,
    /// Payment credential plus an on-chain certificate pointer.
    Pointer(ChainPointer),
    /// Staking credential only; target of withdrawals and certificates.
    Reward,
    /// Legacy Byron-era address, root-key derived.
    Byron,
}

impl AddressKind {
    /// Short name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            AddressKind::Enterprise => "enterprise",
            AddressKind::Base => "base",
            AddressKind::Pointer(_) => "pointer",
            AddressKind::Reward => "reward",
            AddressKind::Byron => "byron",
        }
    }
}

/// A wallet address, tagged by kind.
///
/// Immutable once derived. Round-trips through `to_bytes`/`from_bytes`;
/// two addresses are equal exactly when their encoded bytes are equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Address {
    /// Payment credential only.
    Enterprise {
        /// The payment credential.
        payment: Credential,
        /// The network the address belongs to.
        network: Network,
    },
    /// Payment credential plus staking credential.
    Base {
        /// The payment credential.
        payment: Credential,
        /// The staking credential.
        staking: Credential,
        /// The network the address belongs to.
        network: Network,
    },
    /// Payment credential plus certificate pointer.
    Pointer {
        /// The payment credential.
        payment: Credential,
        /// The certificate pointer to the stake registration.
        pointer: ChainPointer,
        /// The network the address belongs to.
        network: Network,
    },
    /// Staking credential only.
    Reward {
        /// The staking credential.
        staking: Credential,
        /// The network the address belongs to.
        network: Network,
    },
    /// Legacy Byron address.
    Byron {
        /// The root-key-derived credential.
        root: Credential,
        /// The network the address belongs to.
        network: Network,
    },
}

/// Append a variable-length natural (7-bit groups, high-bit continuation).
fn write_nat(buf: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    loop {
        groups[n] = (value & 0x7f) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        buf.push(groups[i] | continuation);
    }
}

/// Read a variable-length natural, returning the value and bytes consumed.
fn read_nat(bytes: &[u8]) -> Result<(u64, usize), KeysError> {
    let mut value: u64 = 0;
    for (i, b) in bytes.iter().enumerate() {
        value = value
            .checked_mul(128)
            .ok_or_else(|| KeysError::InvalidAddress("pointer natural overflows".into()))?
            | (b & 0x7f) as u64;
        if b & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(KeysError::InvalidAddress(
        "truncated pointer natural".into(),
    ))
}

impl Address {
    /// The header byte: kind nibble in the high bits, network tag low.
    fn header(&self) -> u8 {
        let (kind, network) = match self {
            Address::Base { network, .. } => (HEADER_BASE, network),
            Address::Pointer { network, .. } => (HEADER_POINTER, network),
            Address::Enterprise { network, .. } => (HEADER_ENTERPRISE, network),
            Address::Byron { network, .. } => (HEADER_BYRON, network),
            Address::Reward { network, .. } => (HEADER_REWARD, network),
        };
        (kind << 4) | network.tag()
    }

    /// Serialize the address to its byte representation.
    ///
    /// # Returns
    /// Header byte followed by the credential payload(s).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + 2 * CREDENTIAL_SIZE);
        buf.push(self.header());
        match self {
            Address::Enterprise { payment, .. } => buf.extend_from_slice(payment.as_bytes()),
            Address::Base {
                payment, staking, ..
            } => {
                buf.extend_from_slice(payment.as_bytes());
                buf.extend_from_slice(staking.as_bytes());
            }
            Address::Pointer {
                payment, pointer, ..
            } => {
                buf.extend_from_slice(payment.as_bytes());
                write_nat(&mut buf, pointer.slot);
                write_nat(&mut buf, pointer.tx_index);
                write_nat(&mut buf, pointer.cert_index);
            }
            Address::Reward { staking, .. } => buf.extend_from_slice(staking.as_bytes()),
            Address::Byron { root, .. } => buf.extend_from_slice(root.as_bytes()),
        }
        buf
    }

    /// Parse an address from its byte representation.
    ///
    /// # Arguments
    /// * `bytes` - Header byte plus payload, as produced by `to_bytes`.
    ///
    /// # Returns
    /// `Ok(Address)` on success, or a `KeysError` for unknown headers,
    /// bad lengths, or trailing data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeysError> {
        if bytes.is_empty() {
            return Err(KeysError::InvalidAddressLength(0));
        }
        let header = bytes[0];
        let network = Network::from_tag(header & 0x0f)?;
        let payload = &bytes[1..];

        let credential_at = |offset: usize| -> Result<Credential, KeysError> {
            payload
                .get(offset..offset + CREDENTIAL_SIZE)
                .ok_or(KeysError::InvalidAddressLength(bytes.len()))
                .and_then(Credential::from_bytes)
        };

        match header >> 4 {
            HEADER_BASE => {
                if payload.len() != 2 * CREDENTIAL_SIZE {
                    return Err(KeysError::InvalidAddressLength(bytes.len()));
                }
                Ok(Address::Base {
                    payment: credential_at(0)?,
                    staking: credential_at(CREDENTIAL_SIZE)?,
                    network,
                })
            }
            HEADER_POINTER => {
                let payment = credential_at(0)?;
                let rest = &payload[CREDENTIAL_SIZE..];
                let (slot, used_a) = read_nat(rest)?;
                let (tx_index, used_b) = read_nat(&rest[used_a..])?;
                let (cert_index, used_c) = read_nat(&rest[used_a + used_b..])?;
                if used_a + used_b + used_c != rest.len() {
                    return Err(KeysError::InvalidAddress(
                        "trailing bytes after pointer".into(),
                    ));
                }
                Ok(Address::Pointer {
                    payment,
                    pointer: ChainPointer {
                        slot,
                        tx_index,
                        cert_index,
                    },
                    network,
                })
            }
            HEADER_ENTERPRISE | HEADER_REWARD | HEADER_BYRON => {
                if payload.len() != CREDENTIAL_SIZE {
                    return Err(KeysError::InvalidAddressLength(bytes.len()));
                }
                let credential = credential_at(0)?;
                Ok(match header >> 4 {
                    HEADER_ENTERPRISE => Address::Enterprise {
                        payment: credential,
                        network,
                    },
                    HEADER_REWARD => Address::Reward {
                        staking: credential,
                        network,
                    },
                    _ => Address::Byron {
                        root: credential,
                        network,
                    },
                })
            }
            other => Err(KeysError::InvalidAddress(format!(
                "unknown address header nibble {:#x}",
                other
            ))),
        }
    }

    /// Parse an address from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeysError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| KeysError::InvalidAddress(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the address to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The network the address belongs to.
    pub fn network(&self) -> Network {
        match self {
            Address::Enterprise { network, .. }
            | Address::Base { network, .. }
            | Address::Pointer { network, .. }
            | Address::Reward { network, .. }
            | Address::Byron { network, .. } => *network,
        }
    }

    /// The payment credential, if the kind carries one.
    ///
    /// Byron addresses spend through their root credential.
    pub fn payment_credential(&self) -> Option<&Credential> {
        match self {
            Address::Enterprise { payment, .. }
            | Address::Base { payment, .. }
            | Address::Pointer { payment, .. } => Some(payment),
            Address::Byron { root, .. } => Some(root),
            Address::Reward { .. } => None,
        }
    }

    /// The staking credential, if the kind carries one directly.
    pub fn staking_credential(&self) -> Option<&Credential> {
        match self {
            Address::Base { staking, .. } | Address::Reward { staking, .. } => Some(staking),
            _ => None,
        }
    }

    /// Whether this is a reward (staking-only) address.
    pub fn is_reward(&self) -> bool {
        matches!(self, Address::Reward { .. })
    }

    /// Short kind name for summaries and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Address::Enterprise { .. } => "enterprise",
            Address::Base { .. } => "base",
            Address::Pointer { .. } => "pointer",
            Address::Reward { .. } => "reward",
            Address::Byron { .. } => "byron",
        }
    }
}

/// Display the address as its hex-encoded bytes.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = KeysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

//! Hierarchical-deterministic path model.
//!
//! A path identifies a key as `m/purpose'/coin_type'/account'/chain/index`.
//! Two layouts are supported: the legacy BIP-44 layout (purpose 44') used
//! by Byron-era wallets, and the CIP-1852 layout (purpose 1852') used by
//! Shelley-era wallets. The purpose segment selects the scheme; the chain
//! segment selects external, internal (change), or the chimeric account
//! chain that staking keys live on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::KeysError;

/// Purpose segment value for the legacy BIP-44 layout.
pub const PURPOSE_BIP44: u32 = 44;
/// Purpose segment value for the Shelley CIP-1852 layout.
pub const PURPOSE_CIP1852: u32 = 1852;
/// Registered coin type for ada.
pub const COIN_TYPE_ADA: u32 = 1815;

/// A single path segment: an index plus a hardened flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// The child index within the parent key's space.
    pub index: u32,
    /// Whether the segment is hardened.
    pub hardened: bool,
}

impl Segment {
    /// Create a hardened segment.
    pub fn hardened(index: u32) -> Self {
        Segment {
            index,
            hardened: true,
        }
    }

    /// Create a non-hardened segment.
    pub fn soft(index: u32) -> Self {
        Segment {
            index,
            hardened: false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// The chain level of a derivation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    /// Receiving addresses, visible to counterparties.
    External,
    /// Change addresses, internal to the wallet.
    Internal,
    /// The chimeric account chain carrying staking keys.
    ChimericAccount,
}

impl Chain {
    /// The numeric value of the chain segment.
    pub fn index(self) -> u32 {
        match self {
            Chain::External => 0,
            Chain::Internal => 1,
            Chain::ChimericAccount => 2,
        }
    }
}

/// The derivation scheme selected by a path's purpose segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivationScheme {
    /// Legacy Byron-era layout, purpose 44'.
    Bip44,
    /// Shelley-era layout, purpose 1852'.
    Cip1852,
}

/// A full five-level derivation path.
///
/// Pure input to derivation; never mutated after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HdPath {
    /// Purpose segment (44' or 1852').
    pub purpose: Segment,
    /// Coin type segment (1815' for ada).
    pub coin_type: Segment,
    /// Account segment, hardened.
    pub account: Segment,
    /// Chain level.
    pub chain: Chain,
    /// Address index within the chain.
    pub index: Segment,
}

impl HdPath {
    /// Build a legacy BIP-44 path: `m/44'/1815'/account'/chain/index`.
    ///
    /// # Arguments
    /// * `account` - The account number (hardened).
    /// * `chain` - The chain level.
    /// * `index` - The address index (non-hardened).
    pub fn bip44(account: u32, chain: Chain, index: u32) -> Self {
        HdPath {
            purpose: Segment::hardened(PURPOSE_BIP44),
            coin_type: Segment::hardened(COIN_TYPE_ADA),
            account: Segment::hardened(account),
            chain,
            index: Segment::soft(index),
        }
    }

    /// Build a Shelley CIP-1852 path: `m/1852'/1815'/account'/chain/index`.
    ///
    /// # Arguments
    /// * `account` - The account number (hardened).
    /// * `chain` - The chain level.
    /// * `index` - The address index (non-hardened).
    pub fn cip1852(account: u32, chain: Chain, index: u32) -> Self {
        HdPath {
            purpose: Segment::hardened(PURPOSE_CIP1852),
            coin_type: Segment::hardened(COIN_TYPE_ADA),
            account: Segment::hardened(account),
            chain,
            index: Segment::soft(index),
        }
    }

    /// The derivation scheme selected by the purpose segment.
    ///
    /// # Returns
    /// `Ok(DerivationScheme)` for purposes 44' and 1852', or
    /// `KeysError::UnknownPurpose` otherwise.
    pub fn scheme(&self) -> Result<DerivationScheme, KeysError> {
        match self.purpose.index {
            PURPOSE_BIP44 => Ok(DerivationScheme::Bip44),
            PURPOSE_CIP1852 => Ok(DerivationScheme::Cip1852),
            other => Err(KeysError::UnknownPurpose(other)),
        }
    }

    /// The path's segments in derivation order.
    ///
    /// The chain level is a non-hardened segment by construction.
    pub fn segments(&self) -> [Segment; 5] {
        [
            self.purpose,
            self.coin_type,
            self.account,
            Segment::soft(self.chain.index()),
            self.index,
        ]
    }
}

impl fmt::Display for HdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}/{}/{}/{}/{}",
            self.purpose,
            self.coin_type,
            self.account,
            self.chain.index(),
            self.index
        )
    }
}

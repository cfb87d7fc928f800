//! Multi-asset value model.
//!
//! A `Value` is a lovelace amount plus a bundle of native assets keyed
//! by `AssetId`. Asset ids order lexicographically over their
//! concatenated bytes, which is also the canonical encoding order, so a
//! `BTreeMap` keeps bundles permanently in canonical form.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Size of a policy id in bytes (Blake2b-224 script hash).
pub const POLICY_ID_SIZE: usize = 28;
/// Maximum length of an asset name in bytes.
pub const MAX_ASSET_NAME_LEN: usize = 32;

/// A 28-byte minting policy id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PolicyId(pub [u8; POLICY_ID_SIZE]);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// An asset name of at most 32 bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    /// Create an asset name, validating the length limit.
    ///
    /// # Arguments
    /// * `bytes` - The raw name bytes, at most 32.
    ///
    /// # Returns
    /// `Ok(AssetName)` or `LedgerError::AssetNameTooLong`.
    pub fn new(bytes: Vec<u8>) -> Result<Self, LedgerError> {
        if bytes.len() > MAX_ASSET_NAME_LEN {
            return Err(LedgerError::AssetNameTooLong(bytes.len()));
        }
        Ok(AssetName(bytes))
    }

    /// The raw name bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Identifies a native asset: minting policy plus name.
///
/// Ordering is lexicographic over the concatenated bytes (the policy id
/// is fixed-width, so the derived tuple order is exactly that).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct AssetId {
    /// The minting policy id.
    pub policy_id: PolicyId,
    /// The asset name under that policy.
    pub asset_name: AssetName,
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.policy_id, hex::encode(self.asset_name.as_bytes()))
    }
}

/// A lovelace amount plus native asset bundle.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Value {
    /// The ada amount in lovelace.
    pub lovelace: u64,
    /// Native asset quantities, canonically ordered, no zero entries.
    pub assets: BTreeMap<AssetId, u64>,
}

impl Value {
    /// Create a pure-lovelace value.
    pub fn new(lovelace: u64) -> Self {
        Value {
            lovelace,
            assets: BTreeMap::new(),
        }
    }

    /// Builder-style helper adding an asset quantity.
    ///
    /// Quantities for the same asset id accumulate; zero quantities are
    /// dropped.
    pub fn with_asset(mut self, id: AssetId, quantity: u64) -> Self {
        if quantity > 0 {
            *self.assets.entry(id).or_insert(0) += quantity;
        }
        self
    }

    /// Whether the value is exactly zero (no lovelace, no assets).
    pub fn is_zero(&self) -> bool {
        self.lovelace == 0 && self.assets.is_empty()
    }

    /// Whether the value carries any native assets.
    pub fn has_assets(&self) -> bool {
        !self.assets.is_empty()
    }

    /// Checked addition of two values.
    ///
    /// # Returns
    /// The sum, or `LedgerError::ValueOverflow` if any amount overflows.
    pub fn checked_add(&self, other: &Value) -> Result<Value, LedgerError> {
        let lovelace = self
            .lovelace
            .checked_add(other.lovelace)
            .ok_or(LedgerError::ValueOverflow)?;
        let mut assets = self.assets.clone();
        for (id, quantity) in &other.assets {
            let entry = assets.entry(id.clone()).or_insert(0);
            *entry = entry
                .checked_add(*quantity)
                .ok_or(LedgerError::ValueOverflow)?;
        }
        Ok(Value { lovelace, assets })
    }

    /// Checked subtraction of two values.
    ///
    /// # Returns
    /// The difference, or `LedgerError::ValueUnderflow` if `other`
    /// exceeds `self` in lovelace or any asset. Asset entries that reach
    /// zero are removed.
    pub fn checked_sub(&self, other: &Value) -> Result<Value, LedgerError> {
        let lovelace = self.lovelace.checked_sub(other.lovelace).ok_or_else(|| {
            LedgerError::ValueUnderflow(format!(
                "{} lovelace from {}",
                other.lovelace, self.lovelace
            ))
        })?;
        let mut assets = self.assets.clone();
        for (id, quantity) in &other.assets {
            let held = assets.get_mut(id).ok_or_else(|| {
                LedgerError::ValueUnderflow(format!("asset {} not present", id))
            })?;
            *held = held.checked_sub(*quantity).ok_or_else(|| {
                LedgerError::ValueUnderflow(format!("asset {} short by {}", id, quantity - *held))
            })?;
            if *held == 0 {
                assets.remove(id);
            }
        }
        Ok(Value { lovelace, assets })
    }

    /// Whether this value covers `required` in lovelace and every asset.
    pub fn covers(&self, required: &Value) -> bool {
        if self.lovelace < required.lovelace {
            return false;
        }
        required
            .assets
            .iter()
            .all(|(id, quantity)| self.assets.get(id).copied().unwrap_or(0) >= *quantity)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assets.is_empty() {
            write!(f, "{} lovelace", self.lovelace)
        } else {
            write!(
                f,
                "{} lovelace + {} asset kind(s)",
                self.lovelace,
                self.assets.len()
            )
        }
    }
}

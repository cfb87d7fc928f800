//! Registered stake key set with transactional updates.
//!
//! The set of staking credentials currently registered on chain is
//! consulted by certificate sequencing and mutated only by committing a
//! `StakeKeyDelta` when a build finalizes. Aborted builds drop their
//! delta, leaving the set untouched.

use std::collections::BTreeSet;

use ada_keys::Credential;
use tracing::debug;

/// Staged changes to the registered stake key set.
///
/// Produced by certificate sequencing, applied atomically at finalize.
#[derive(Clone, Debug, Default)]
pub struct StakeKeyDelta {
    additions: Vec<Credential>,
    removals: Vec<Credential>,
}

impl StakeKeyDelta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a credential registration.
    pub fn add(&mut self, credential: Credential) {
        self.additions.push(credential);
    }

    /// Stage a credential deregistration.
    pub fn remove(&mut self, credential: Credential) {
        self.removals.push(credential);
    }

    /// Whether the delta stages no changes.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Credentials staged for registration.
    pub fn additions(&self) -> &[Credential] {
        &self.additions
    }

    /// Credentials staged for deregistration.
    pub fn removals(&self) -> &[Credential] {
        &self.removals
    }
}

/// The set of staking credentials registered on chain.
#[derive(Clone, Debug, Default)]
pub struct RegisteredStakeKeys {
    registered: BTreeSet<Credential>,
}

impl RegisteredStakeKeys {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the set from an on-chain snapshot.
    pub fn from_snapshot(credentials: impl IntoIterator<Item = Credential>) -> Self {
        RegisteredStakeKeys {
            registered: credentials.into_iter().collect(),
        }
    }

    /// Whether a credential is currently registered.
    pub fn is_registered(&self, credential: &Credential) -> bool {
        self.registered.contains(credential)
    }

    /// The number of registered credentials.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether no credentials are registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Apply a staged delta.
    ///
    /// Validation already happened during certificate sequencing; commit
    /// applies additions then removals in order.
    pub fn commit(&mut self, delta: StakeKeyDelta) {
        for credential in &delta.additions {
            self.registered.insert(*credential);
        }
        for credential in &delta.removals {
            self.registered.remove(credential);
        }
        debug!(
            added = delta.additions.len(),
            removed = delta.removals.len(),
            total = self.registered.len(),
            "stake key delta committed"
        );
    }
}

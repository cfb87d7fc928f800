//! Per-address build locks.
//!
//! A build in progress holds an exclusive lock over the address set it
//! reads UTXOs from, so two concurrent builds can never select the same
//! output. Builds over disjoint address sets proceed in parallel.
//! Holders past the registry's bounded timeout are force-released on the
//! next acquire, so an abandoned draft cannot wedge the wallet forever.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use ada_keys::Address;
use tracing::{debug, warn};

use crate::LedgerError;

/// Default force-release timeout for abandoned locks.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(120);

struct Holder {
    owner: u64,
    acquired_at: Instant,
}

#[derive(Default)]
struct RegistryInner {
    next_owner: u64,
    held: HashMap<Address, Holder>,
}

/// Registry of address locks held by builds in progress.
pub struct LockRegistry {
    inner: Mutex<RegistryInner>,
    timeout: Duration,
}

/// Proof of an acquired address lock.
///
/// Handed from the builder to the caller at finalize; release it once
/// the selected UTXOs have been marked spent or unlocked.
#[derive(Debug)]
pub struct LockHandle {
    owner: u64,
    addresses: BTreeSet<Address>,
}

impl LockHandle {
    /// The addresses covered by this lock.
    pub fn addresses(&self) -> &BTreeSet<Address> {
        &self.addresses
    }
}

impl LockRegistry {
    /// Create a registry with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// Create a registry with an explicit force-release timeout.
    ///
    /// # Arguments
    /// * `timeout` - How long a holder may keep a lock before the next
    ///   acquire may evict it.
    pub fn with_timeout(timeout: Duration) -> Self {
        LockRegistry {
            inner: Mutex::new(RegistryInner::default()),
            timeout,
        }
    }

    /// Acquire an exclusive lock over an address set.
    ///
    /// Fails with `LockContention` if any address is held by a live
    /// build. Holders older than the timeout are evicted first.
    ///
    /// # Arguments
    /// * `addresses` - The address set the build reads from.
    ///
    /// # Returns
    /// A `LockHandle` releasing the whole set.
    pub fn acquire(&self, addresses: BTreeSet<Address>) -> Result<LockHandle, LedgerError> {
        let mut inner = self.inner.lock().expect("lock registry poisoned");

        // Evict holders past the timeout so a stuck build cannot wedge
        // the wallet.
        let timeout = self.timeout;
        let before = inner.held.len();
        inner
            .held
            .retain(|_, holder| holder.acquired_at.elapsed() < timeout);
        if inner.held.len() < before {
            warn!(
                evicted = before - inner.held.len(),
                "force-released expired address locks"
            );
        }

        for address in &addresses {
            if inner.held.contains_key(address) {
                return Err(LedgerError::LockContention(address.clone()));
            }
        }

        inner.next_owner += 1;
        let owner = inner.next_owner;
        let acquired_at = Instant::now();
        for address in &addresses {
            inner.held.insert(
                address.clone(),
                Holder {
                    owner,
                    acquired_at,
                },
            );
        }
        debug!(owner, count = addresses.len(), "address lock acquired");
        Ok(LockHandle { owner, addresses })
    }

    /// Release a previously acquired lock.
    ///
    /// Only entries still held by the handle's owner are removed, so a
    /// stale handle cannot release a lock that was force-released and
    /// re-acquired by another build.
    pub fn release(&self, handle: LockHandle) {
        let mut inner = self.inner.lock().expect("lock registry poisoned");
        for address in &handle.addresses {
            if inner
                .held
                .get(address)
                .map(|h| h.owner == handle.owner)
                .unwrap_or(false)
            {
                inner.held.remove(address);
            }
        }
        debug!(owner = handle.owner, "address lock released");
    }

    /// Whether an address is currently locked.
    pub fn is_locked(&self, address: &Address) -> bool {
        let inner = self.inner.lock().expect("lock registry poisoned");
        inner.held.contains_key(address)
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ada_keys::{AddressKind, Chain, HdPath, KeyDeriver, Network};

    fn address(index: u32) -> Address {
        KeyDeriver::new(b"guard test seed")
            .derive(
                &HdPath::cip1852(0, Chain::External, index),
                AddressKind::Enterprise,
                Network::Testnet,
            )
            .unwrap()
    }

    fn set(indices: &[u32]) -> BTreeSet<Address> {
        indices.iter().map(|i| address(*i)).collect()
    }

    #[test]
    fn test_overlapping_sets_conflict() {
        let registry = LockRegistry::new();
        let handle = registry.acquire(set(&[0, 1])).unwrap();

        let err = registry.acquire(set(&[1, 2])).unwrap_err();
        assert!(matches!(err, LedgerError::LockContention(_)));

        registry.release(handle);
        assert!(registry.acquire(set(&[1, 2])).is_ok());
    }

    #[test]
    fn test_disjoint_sets_proceed_in_parallel() {
        let registry = LockRegistry::new();
        let a = registry.acquire(set(&[0, 1])).unwrap();
        let b = registry.acquire(set(&[2, 3])).unwrap();
        registry.release(a);
        registry.release(b);
    }

    #[test]
    fn test_expired_locks_are_force_released() {
        let registry = LockRegistry::with_timeout(Duration::from_millis(10));
        let _abandoned = registry.acquire(set(&[0])).unwrap();

        std::thread::sleep(Duration::from_millis(20));

        // The expired holder is evicted; the new build proceeds.
        let handle = registry.acquire(set(&[0])).unwrap();
        registry.release(handle);
    }

    #[test]
    fn test_stale_handle_cannot_release_new_owner() {
        let registry = LockRegistry::with_timeout(Duration::from_millis(10));
        let stale = registry.acquire(set(&[0])).unwrap();

        std::thread::sleep(Duration::from_millis(20));
        let _live = registry.acquire(set(&[0])).unwrap();

        // Releasing the stale handle must not free the live owner's lock.
        registry.release(stale);
        assert!(registry.is_locked(&address(0)));
    }
}

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of detail addresses already claimed in this run
///
/// Clones share the same underlying set. There is no removal and no expiry:
/// once claimed, an address stays claimed until the run ends.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims an address for processing
    ///
    /// Returns `true` only for the first caller to claim `address`; every
    /// later or concurrent caller gets `false`.
    pub fn claim(&self, address: &str) -> bool {
        self.lock().insert(address.to_string())
    }

    /// Returns whether the address has already been claimed
    pub fn contains(&self, address: &str) -> bool {
        self.lock().contains(address)
    }

    /// Number of claimed addresses
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a half-inserted entry.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide source of `home_id` values for one run
///
/// Every call to [`HomeIdCounter::next_id`] returns a value no other call has
/// seen. Values are handed out in call order, which under concurrency is
/// completion order rather than discovery order.
#[derive(Debug, Clone)]
pub struct HomeIdCounter {
    start: u64,
    next: Arc<AtomicU64>,
}

impl HomeIdCounter {
    /// Creates a counter whose first issued id is `start`
    pub fn new(start: u64) -> Self {
        Self {
            start,
            next: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Atomically takes the next id
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - self.start
    }
}

impl Default for HomeIdCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// Process-wide counter shared by every store constructor. Never reset.
static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a store.
///
/// Assigned from a shared monotonically increasing counter at construction
/// time, so two stores never share an id within one process. Registries key
/// their entries by `StoreId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl StoreId {
    pub(crate) fn next() -> Self {
        StoreId(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value behind this id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

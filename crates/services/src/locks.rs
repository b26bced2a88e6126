//! Per-key mutation serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per entity key, created on first use and released when the
/// last holder or waiter for that key is gone.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    inner: DashMap<String, Arc<Mutex<()>>>,
}

/// Holds the lock for one key. Dropping it releases the key and, when nobody
/// else is waiting, removes its table entry.
#[derive(Debug)]
pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder of `key` remains.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let cell = self.inner.entry(key.to_string()).or_default().clone();
        // Built before waiting so a cancelled wait still cleans up the entry.
        let mut held = KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: None,
        };
        held.guard = Some(cell.lock_owned().await);
        held
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // The guard owns a clone of the mutex; release it before counting.
        drop(self.guard.take());
        // Callers clone under the shard lock, so a count of one means only the
        // table still refers to this mutex.
        self.locks
            .inner
            .remove_if(&self.key, |_, cell| Arc::strong_count(cell) == 1);
    }
}

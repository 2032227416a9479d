use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serializes reconciliation runs per order within this process. Runs on different orders never wait on each other.
///
/// Locks are created on first use and released from the map once nobody holds or awaits them.
#[derive(Debug, Default, Clone)]
pub struct OrderLocks {
    locks: Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

/// Holds the lock on one order until dropped.
pub struct OrderGuard {
    order_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, order_id: i64) -> OrderGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(locks.entry(order_id).or_default())
        };
        let guard = lock.lock_owned().await;
        OrderGuard { order_id, guard: Some(guard), locks: Arc::clone(&self.locks) }
    }

    /// The number of orders that currently have a lock entry.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for OrderGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // With our guard released, a count of one means only the map refers to the lock and nobody is waiting on it.
        if locks.get(&self.order_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&self.order_id);
        }
    }
}

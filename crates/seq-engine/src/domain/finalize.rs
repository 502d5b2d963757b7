//! # Finalization Registry
//!
//! Callbacks fired once per finalized block, on the finalizing thread, in
//! finalization order. Registration returns a [`SubscriptionHandle`];
//! cancelling or dropping it removes the callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use seq_types::{Block, SubscriptionHandle};

/// Callback run for every finalized block.
pub type FinalizeCallback = Box<dyn Fn(&Block) + Send + Sync>;

type Entries = Vec<(u64, Arc<FinalizeCallback>)>;

#[derive(Default)]
pub struct FinalizeRegistry {
    next_id: AtomicU64,
    callbacks: Arc<RwLock<Entries>>,
}

impl FinalizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, callback: FinalizeCallback) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.write().push((id, Arc::new(callback)));

        let entries = Arc::downgrade(&self.callbacks);
        SubscriptionHandle::new(id, move || {
            if let Some(entries) = entries.upgrade() {
                entries.write().retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Run every registered callback.
    ///
    /// Callbacks run on a snapshot so one may cancel a subscription
    /// without deadlocking the registry.
    pub fn notify(&self, block: &Block) {
        let snapshot: Vec<Arc<FinalizeCallback>> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(block);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use seq_types::ZERO_HASH;

    #[test]
    fn test_callbacks_see_blocks_in_order() {
        let registry = FinalizeRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _handle = registry.register(Box::new(move |block| sink.lock().push(block.height)));

        for height in 0..5 {
            registry.notify(&Block::new(height, ZERO_HASH, 0, vec![]));
        }

        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cancel_stops_delivery() {
        let registry = FinalizeRegistry::new();
        let seen = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&seen);
        let mut handle = registry.register(Box::new(move |_| *sink.lock() += 1));

        registry.notify(&Block::new(0, ZERO_HASH, 0, vec![]));
        handle.cancel();
        registry.notify(&Block::new(1, ZERO_HASH, 0, vec![]));

        assert_eq!(*seen.lock(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handle_outliving_registry_is_harmless() {
        let registry = FinalizeRegistry::new();
        let handle = registry.register(Box::new(|_| {}));
        drop(registry);
        drop(handle);
    }
}

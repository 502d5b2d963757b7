//! # Subscription Handle
//!
//! A registration that can be cancelled deterministically. The party that
//! hands out the handle supplies the cancellation closure; the holder either
//! calls [`SubscriptionHandle::cancel`] or drops the handle.

use std::fmt;

type CancelFn = Box<dyn FnOnce() + Send + Sync>;

/// Cancellable subscription.
///
/// Cancellation runs at most once. Dropping an active handle cancels it.
pub struct SubscriptionHandle {
    id: u64,
    cancel: Option<CancelFn>,
}

impl SubscriptionHandle {
    pub fn new(id: u64, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Cancel the subscription. Later calls are no-ops.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handle(counter: &Arc<AtomicUsize>) -> SubscriptionHandle {
        let counter = Arc::clone(counter);
        SubscriptionHandle::new(1, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_cancel_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handle = counting_handle(&counter);

        assert!(handle.is_active());
        handle.cancel();
        handle.cancel();
        assert!(!handle.is_active());
        drop(handle);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let counter = Arc::new(AtomicUsize::new(0));
        drop(counting_handle(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

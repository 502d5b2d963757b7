//! Pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PipelineMetrics {
    // Primary
    broadcasts_sent: AtomicU64,
    broadcasts_failed: AtomicU64,

    // Replica
    blocks_received: AtomicU64,
    blocks_applied: AtomicU64,
    blocks_rejected: AtomicU64,
    blocks_dropped: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_broadcast(&self, success: bool) {
        if success {
            self.broadcasts_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.broadcasts_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_received(&self) {
        self.blocks_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_apply(&self, success: bool) {
        if success {
            self.blocks_applied.fetch_add(1, Ordering::Relaxed);
        } else {
            self.blocks_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A received block that never reached the queue.
    pub fn record_dropped(&self) {
        self.blocks_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            broadcasts_sent: self.broadcasts_sent.load(Ordering::Relaxed),
            broadcasts_failed: self.broadcasts_failed.load(Ordering::Relaxed),
            blocks_received: self.blocks_received.load(Ordering::Relaxed),
            blocks_applied: self.blocks_applied.load(Ordering::Relaxed),
            blocks_rejected: self.blocks_rejected.load(Ordering::Relaxed),
            blocks_dropped: self.blocks_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub broadcasts_sent: u64,
    pub broadcasts_failed: u64,
    pub blocks_received: u64,
    pub blocks_applied: u64,
    pub blocks_rejected: u64,
    /// Received but abandoned at shutdown before being enqueued.
    pub blocks_dropped: u64,
}

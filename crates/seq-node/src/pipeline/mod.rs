//! # Block Pipelines
//!
//! ```text
//! Primary:  Engine ──on_finalize──→ [publisher] ──broadcast──→ Transport
//!
//! Replica:  Transport ──subscribe──→ [receiver] ──mpsc(cap)──→ [applier] ──apply──→ Engine
//! ```
//!
//! Exactly one pipeline is attached per node. An [`Attachment`] owns what the
//! pipeline holds open and releases it in [`Attachment::detach`].

pub mod ingestion;
pub mod metrics;
pub mod publisher;

use std::sync::Arc;

use seq_types::SubscriptionHandle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

pub use metrics::{PipelineMetrics, PipelineStats};

use crate::ports::{Engine, Transport};

/// Everything a role strategy needs to attach its pipeline.
#[derive(Clone)]
pub struct PipelineContext {
    pub engine: Arc<dyn Engine>,
    pub transport: Arc<dyn Transport>,
    pub metrics: Arc<PipelineMetrics>,
    /// Flips to `true` once on close.
    pub shutdown: watch::Receiver<bool>,
    pub queue_capacity: usize,
}

/// Resources held by an attached pipeline.
#[derive(Debug, Default)]
pub struct Attachment {
    subscription: Option<SubscriptionHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl Attachment {
    pub fn publication(subscription: SubscriptionHandle) -> Self {
        Self {
            subscription: Some(subscription),
            tasks: Vec::new(),
        }
    }

    pub fn ingestion(tasks: Vec<JoinHandle<()>>) -> Self {
        Self {
            subscription: None,
            tasks,
        }
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.as_ref().is_some_and(SubscriptionHandle::is_active)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel the finalize subscription and join the pipeline tasks.
    ///
    /// Tasks stop on the shutdown signal, so that must have been sent first.
    pub async fn detach(mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "[node] Pipeline task ended abnormally");
            }
        }
    }
}

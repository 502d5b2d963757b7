//! # Sequencer Node
//!
//! Lifecycle of one node process.
//!
//! ## Start
//!
//! 1. Attach the role pipeline (publisher or receiver/applier).
//! 2. Spawn `Transport::start` and `RequestServer::start` as two tasks.
//! 3. Wait for both to finish, then return the first error either produced.
//!
//! ## Close
//!
//! 1. Send the shutdown signal. The request server, receiver and applier
//!    all watch it.
//! 2. Cancel the finalize subscription, or join the receiver and applier.
//! 3. Close the transport, which lets `start` return.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::container::{NodeComponents, NodeConfig, DEFAULT_QUEUE_CAPACITY};
use crate::errors::{ConstructionError, NodeError};
use crate::pipeline::{Attachment, PipelineContext, PipelineMetrics, PipelineStats};
use crate::ports::{Engine, RequestServer, Transport};
use crate::role::Role;

pub struct SequencerNode {
    role: Role,
    engine: Arc<dyn Engine>,
    transport: Arc<dyn Transport>,
    server: Arc<dyn RequestServer>,
    metrics: Arc<PipelineMetrics>,
    queue_capacity: usize,
    shutdown_tx: watch::Sender<bool>,
    attachment: Mutex<Option<Attachment>>,
    started: AtomicBool,
}

impl SequencerNode {
    /// Build a node from configuration. All-or-nothing: on error everything
    /// already opened is dropped again, including the storage lock.
    pub fn new(config: &NodeConfig) -> Result<Self, ConstructionError> {
        let components = NodeComponents::build(config)?;
        Ok(Self::from_parts(
            config.role,
            components.engine,
            components.transport,
            components.server,
        )
        .with_queue_capacity(config.pipeline.queue_capacity))
    }

    /// Build a node from arbitrary port implementations.
    pub fn from_parts(
        role: Role,
        engine: Arc<dyn Engine>,
        transport: Arc<dyn Transport>,
        server: Arc<dyn RequestServer>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            role,
            engine,
            transport,
            server,
            metrics: Arc::new(PipelineMetrics::new()),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_tx,
            attachment: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    /// Replica ingestion queue capacity. Values below 1 are raised to 1.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn stats(&self) -> PipelineStats {
        self.metrics.snapshot()
    }

    /// Attach the pipeline and run both services until they have both
    /// returned. Only one call per node succeeds.
    pub async fn start(&self) -> Result<(), NodeError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(NodeError::AlreadyStarted);
        }
        info!(role = %self.role, "[node] Starting");

        let ctx = PipelineContext {
            engine: Arc::clone(&self.engine),
            transport: Arc::clone(&self.transport),
            metrics: Arc::clone(&self.metrics),
            shutdown: self.shutdown_tx.subscribe(),
            queue_capacity: self.queue_capacity,
        };
        let attachment = self.role.strategy().attach(&ctx);
        // `close` signals before it takes the slot, so checking the signal
        // under the same lock cannot miss a concurrent close.
        let orphaned = {
            let mut slot = self.attachment.lock();
            if *self.shutdown_tx.borrow() {
                Some(attachment)
            } else {
                *slot = Some(attachment);
                None
            }
        };
        if let Some(attachment) = orphaned {
            info!(role = %self.role, "[node] Closed while starting, detaching pipeline");
            attachment.detach().await;
        }

        let mut services = JoinSet::new();
        let transport = Arc::clone(&self.transport);
        services.spawn(async move {
            let result = transport.start().await.map_err(NodeError::Transport);
            if let Err(e) = &result {
                error!(error = %e, "[node] Transport stopped with error");
            }
            result
        });
        let server = Arc::clone(&self.server);
        let shutdown = self.shutdown_tx.subscribe();
        services.spawn(async move {
            let result = server.start(shutdown).await.map_err(NodeError::Server);
            if let Err(e) = &result {
                error!(error = %e, "[node] Request server stopped with error");
            }
            result
        });

        let mut first_error = None;
        while let Some(joined) = services.join_next().await {
            let result = joined
                .map_err(|e| NodeError::Task(e.to_string()))
                .and_then(|result| result);
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        info!(role = %self.role, "[node] Services stopped");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Signal shutdown, detach the pipeline, then release the transport.
    pub async fn close(&self) -> Result<(), NodeError> {
        info!(role = %self.role, "[node] Closing");
        self.shutdown_tx.send_replace(true);

        let attachment = self.attachment.lock().take();
        if let Some(attachment) = attachment {
            attachment.detach().await;
        }

        self.transport.close().await.map_err(NodeError::Shutdown)?;
        info!(stats = ?self.stats(), "[node] Closed");
        Ok(())
    }
}

//! # Replica Ingestion
//!
//! Two tasks joined by one bounded FIFO queue:
//!
//! - **receiver** reads the transport's block stream and enqueues. It is the
//!   only producer.
//! - **applier** dequeues and calls `Engine::apply`, one block at a time. It
//!   is the only consumer, so the engine never sees concurrent applies and
//!   apply order is receipt order.
//!
//! A failed apply is logged and counted and the block is dropped. There is no
//! retry and no re-request.
//!
//! On shutdown the receiver stops reading. The applier closes the queue,
//! applies whatever was already enqueued, then exits. A block the receiver
//! was still waiting to enqueue is counted as dropped, so every received
//! block ends up applied, rejected or dropped.

use std::sync::Arc;

use seq_types::Block;
use tokio::sync::{mpsc, watch};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::pipeline::{Attachment, PipelineContext, PipelineMetrics};
use crate::ports::{BlockStream, Engine};

pub fn attach(ctx: &PipelineContext) -> Attachment {
    let (queue_tx, queue_rx) = mpsc::channel(ctx.queue_capacity);
    let stream = ctx.transport.subscribe();

    let receiver = tokio::spawn(run_receiver(
        stream,
        queue_tx,
        Arc::clone(&ctx.metrics),
        ctx.shutdown.clone(),
    ));
    let applier = tokio::spawn(run_applier(
        queue_rx,
        Arc::clone(&ctx.engine),
        Arc::clone(&ctx.metrics),
        ctx.shutdown.clone(),
    ));

    info!(capacity = ctx.queue_capacity, "[ingest] Receiver and applier started");
    Attachment::ingestion(vec![receiver, applier])
}

/// Resolves once shutdown is signalled or the sender is gone.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

pub(crate) async fn run_receiver(
    mut blocks: BlockStream,
    queue: mpsc::Sender<Block>,
    metrics: Arc<PipelineMetrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = stopped(&mut shutdown) => break,
            next = blocks.next() => {
                let Some(block) = next else {
                    info!("[ingest] Inbound block stream ended");
                    break;
                };
                metrics.record_received();
                debug!(height = block.height, "[ingest] Received block");

                let height = block.height;
                let enqueued = tokio::select! {
                    biased;
                    _ = stopped(&mut shutdown) => false,
                    sent = queue.send(block) => sent.is_ok(),
                };
                if !enqueued {
                    metrics.record_dropped();
                    warn!(height, "[ingest] Shutting down, block not enqueued");
                    break;
                }
            }
        }
    }
    debug!("[ingest] Receiver stopped");
}

pub(crate) async fn run_applier(
    mut queue: mpsc::Receiver<Block>,
    engine: Arc<dyn Engine>,
    metrics: Arc<PipelineMetrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            block = queue.recv() => match block {
                Some(block) => apply_one(engine.as_ref(), &metrics, block),
                None => break,
            },
            _ = stopped(&mut shutdown) => {
                queue.close();
                let mut drained = 0usize;
                while let Some(block) = queue.recv().await {
                    apply_one(engine.as_ref(), &metrics, block);
                    drained += 1;
                }
                if drained > 0 {
                    info!(drained, "[ingest] Applied queued blocks before stopping");
                }
                break;
            }
        }
    }
    debug!("[ingest] Applier stopped");
}

fn apply_one(engine: &dyn Engine, metrics: &PipelineMetrics, block: Block) {
    let id = block.id();
    match engine.apply(block) {
        Ok(()) => {
            metrics.record_apply(true);
            debug!(height = id.height, hash = %id.short_hash(), "[ingest] Applied block");
        }
        Err(e) => {
            metrics.record_apply(false);
            warn!(
                height = id.height,
                hash = %id.short_hash(),
                error = %e,
                "[ingest] Apply failed, dropping block"
            );
        }
    }
}

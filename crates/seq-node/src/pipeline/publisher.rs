//! # Primary Publication
//!
//! Broadcasts each finalized block from inside the engine's finalize
//! callback. There is no queue in between, so broadcast order is
//! finalization order. `Transport::broadcast` never blocks, so a slow or
//! failing transport cannot stall the engine; failures are logged and
//! counted.

use std::sync::Arc;

use seq_types::Block;
use tracing::{debug, info, warn};

use crate::pipeline::{Attachment, PipelineContext};

pub fn attach(ctx: &PipelineContext) -> Attachment {
    let transport = Arc::clone(&ctx.transport);
    let metrics = Arc::clone(&ctx.metrics);

    let subscription = ctx.engine.on_finalize(Box::new(move |block: &Block| {
        let id = block.id();
        match transport.broadcast(block) {
            Ok(()) => {
                metrics.record_broadcast(true);
                debug!(height = id.height, hash = %id.short_hash(), "[publisher] Broadcast block");
            }
            Err(e) => {
                metrics.record_broadcast(false);
                warn!(
                    height = id.height,
                    hash = %id.short_hash(),
                    error = %e,
                    "[publisher] Broadcast failed"
                );
            }
        }
    }));

    info!("[publisher] Subscribed to finalized blocks");
    Attachment::publication(subscription)
}

//! Mock ports for node lifecycle tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use seq_node::ports::{
    BlockStream, Engine, EngineError, FinalizeCallback, RequestServer, ServerError, Transport,
    TransportError,
};
use seq_types::{Block, SubscriptionHandle, ZERO_HASH};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

pub fn block(height: u64) -> Block {
    Block::new(height, ZERO_HASH, 1_000 + height, vec![height as u8])
}

/// Poll `condition` until it holds or five seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}

// =============================================================================
// Engine
// =============================================================================

type Callbacks = Arc<Mutex<Vec<(u64, Arc<FinalizeCallback>)>>>;

#[derive(Default)]
pub struct MockEngine {
    callbacks: Callbacks,
    next_id: AtomicU64,
    applied: Mutex<Vec<u64>>,
    reject: Mutex<HashSet<u64>>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reject `apply` for blocks at `height`.
    pub fn reject_height(&self, height: u64) {
        self.reject.lock().insert(height);
    }

    /// Simulate finalization of `block`.
    pub fn finalize(&self, block: &Block) {
        let callbacks: Vec<_> = self.callbacks.lock().iter().map(|(_, cb)| Arc::clone(cb)).collect();
        for callback in callbacks {
            callback(block);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Heights passed to `apply`, including rejected ones.
    pub fn applied(&self) -> Vec<u64> {
        self.applied.lock().clone()
    }
}

impl Engine for MockEngine {
    fn on_finalize(&self, callback: FinalizeCallback) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.callbacks.lock().push((id, Arc::new(callback)));
        let callbacks = Arc::clone(&self.callbacks);
        SubscriptionHandle::new(id, move || callbacks.lock().retain(|(cb_id, _)| *cb_id != id))
    }

    fn apply(&self, block: Block) -> Result<(), EngineError> {
        self.applied.lock().push(block.height);
        if self.reject.lock().contains(&block.height) {
            return Err(EngineError::Rejected(format!("height {} refused", block.height)));
        }
        Ok(())
    }
}

// =============================================================================
// Transport
// =============================================================================

pub struct MockTransport {
    broadcasts: Mutex<Vec<Block>>,
    fail_broadcast: AtomicBool,
    inbound_tx: mpsc::UnboundedSender<Block>,
    inbound_rx: Mutex<Option<mpsc::UnboundedReceiver<Block>>>,
    subscribe_calls: AtomicUsize,
    fail_start: Option<TransportError>,
    fail_close: AtomicBool,
    closed: watch::Sender<bool>,
    close_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// `start` fails immediately with `error`.
    pub fn failing_start(error: TransportError) -> Arc<Self> {
        Arc::new(Self::build(Some(error)))
    }

    fn build(fail_start: Option<TransportError>) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        Self {
            broadcasts: Mutex::new(Vec::new()),
            fail_broadcast: AtomicBool::new(false),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            subscribe_calls: AtomicUsize::new(0),
            fail_start,
            fail_close: AtomicBool::new(false),
            closed,
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Deliver `block` as if it arrived from a peer. Fails once the node's
    /// receiver has stopped.
    pub fn push(&self, block: Block) -> Result<(), Block> {
        self.inbound_tx.send(block).map_err(|e| e.0)
    }

    pub fn set_fail_broadcast(&self, fail: bool) {
        self.fail_broadcast.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Heights of successfully broadcast blocks, in order.
    pub fn broadcast_heights(&self) -> Vec<u64> {
        self.broadcasts.lock().iter().map(|b| b.height).collect()
    }

    pub fn broadcasts(&self) -> Vec<Block> {
        self.broadcasts.lock().clone()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn broadcast(&self, block: &Block) -> Result<(), TransportError> {
        if self.fail_broadcast.load(Ordering::SeqCst) {
            return Err(TransportError::Broadcast("all peer queues full".into()));
        }
        self.broadcasts.lock().push(block.clone());
        Ok(())
    }

    fn subscribe(&self) -> BlockStream {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        match self.inbound_rx.lock().take() {
            Some(rx) => Box::pin(UnboundedReceiverStream::new(rx)),
            None => Box::pin(tokio_stream::empty()),
        }
    }

    async fn start(&self) -> Result<(), TransportError> {
        if let Some(e) = &self.fail_start {
            return Err(e.clone());
        }
        let mut closed = self.closed.subscribe();
        let _ = closed.wait_for(|c| *c).await;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(TransportError::Failed("socket stuck".into()));
        }
        if self.closed.send_replace(true) {
            return Err(TransportError::AlreadyClosed);
        }
        Ok(())
    }
}

// =============================================================================
// Request server
// =============================================================================

#[derive(Default)]
pub struct MockServer {
    fail_start: Option<ServerError>,
    running: AtomicBool,
    stopped: AtomicBool,
}

impl MockServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_start(error: ServerError) -> Arc<Self> {
        Arc::new(Self {
            fail_start: Some(error),
            ..Self::default()
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn has_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestServer for MockServer {
    async fn start(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ServerError> {
        if let Some(e) = &self.fail_start {
            return Err(e.clone());
        }
        self.running.store(true, Ordering::SeqCst);
        let _ = shutdown.wait_for(|stop| *stop).await;
        self.running.store(false, Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

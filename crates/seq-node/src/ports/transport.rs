//! Peer-to-peer gossip transport port.

use std::pin::Pin;

use async_trait::async_trait;
use seq_types::Block;
use thiserror::Error;
use tokio_stream::Stream;

/// Blocks received from the network, in receipt order.
pub type BlockStream = Pin<Box<dyn Stream<Item = Block> + Send>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport is closed")]
    Closed,

    #[error("Transport already closed")]
    AlreadyClosed,

    #[error("Broadcast not delivered: {0}")]
    Broadcast(String),

    #[error("Transport failure: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Queue `block` for every connected peer. Never blocks.
    fn broadcast(&self, block: &Block) -> Result<(), TransportError>;

    /// Stream of inbound blocks. Blocks that arrive before the call are not
    /// replayed.
    fn subscribe(&self) -> BlockStream;

    /// Run the transport until [`Transport::close`].
    async fn start(&self) -> Result<(), TransportError>;

    /// Stop the transport and release its resources.
    async fn close(&self) -> Result<(), TransportError>;
}

use async_trait::async_trait;
use seq_gossip::{GossipError, GossipService};
use seq_types::Block;
use tokio_stream::wrappers::ReceiverStream;

use crate::ports::{BlockStream, Transport, TransportError};

pub struct GossipTransport {
    service: GossipService,
}

impl GossipTransport {
    pub fn new(service: GossipService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &GossipService {
        &self.service
    }
}

impl From<GossipError> for TransportError {
    fn from(e: GossipError) -> Self {
        match e {
            GossipError::Closed => TransportError::Closed,
            GossipError::AlreadyClosed => TransportError::AlreadyClosed,
            GossipError::QueueFull { .. } => TransportError::Broadcast(e.to_string()),
            other => TransportError::Failed(other.to_string()),
        }
    }
}

#[async_trait]
impl Transport for GossipTransport {
    fn broadcast(&self, block: &Block) -> Result<(), TransportError> {
        self.service.broadcast(block).map(|_| ()).map_err(Into::into)
    }

    /// Bounded stream: while it is not polled the gossip reader waits, so
    /// no block is skipped.
    fn subscribe(&self) -> BlockStream {
        Box::pin(ReceiverStream::new(self.service.subscribe()))
    }

    async fn start(&self) -> Result<(), TransportError> {
        self.service.start().await.map_err(Into::into)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.service.close().map_err(Into::into)
    }
}

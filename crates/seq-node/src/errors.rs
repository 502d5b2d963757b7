//! Node error types.

use seq_engine::EngineError as StorageError;
use seq_gossip::AddressError;
use thiserror::Error;

use crate::container::ConfigError;
use crate::ports::{ServerError, TransportError};

/// Why a node could not be constructed. Never accompanied by a partial node.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot open storage: {0}")]
    Storage(#[source] StorageError),

    #[error("Invalid bootstrap peer list: {0}")]
    BootstrapPeers(#[from] AddressError),

    #[error("Transport initialization failed: {0}")]
    TransportInit(String),
}

/// Lifecycle errors surfaced by `start` and `close`.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("Node already started")]
    AlreadyStarted,

    #[error("Transport service failed: {0}")]
    Transport(#[source] TransportError),

    #[error("Request server failed: {0}")]
    Server(#[source] ServerError),

    #[error("Service task failed: {0}")]
    Task(String),

    #[error("Transport failed to shut down: {0}")]
    Shutdown(#[source] TransportError),
}

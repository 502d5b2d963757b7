//! Client-facing request server port.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerError {
    #[error("Request server failed to bind: {0}")]
    Bind(String),

    #[error("Request server failure: {0}")]
    Failed(String),
}

#[async_trait]
pub trait RequestServer: Send + Sync {
    /// Serve until `shutdown` becomes `true`.
    async fn start(&self, shutdown: watch::Receiver<bool>) -> Result<(), ServerError>;
}

use async_trait::async_trait;
use seq_rpc::{RpcError, RpcServer};
use tokio::sync::watch;

use crate::ports::{RequestServer, ServerError};

pub struct RpcRequestServer {
    server: RpcServer,
}

impl RpcRequestServer {
    pub fn new(server: RpcServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl RequestServer for RpcRequestServer {
    async fn start(&self, shutdown: watch::Receiver<bool>) -> Result<(), ServerError> {
        self.server.start(shutdown).await.map_err(|e| match e {
            RpcError::Bind { .. } => ServerError::Bind(e.to_string()),
            RpcError::Serve(_) => ServerError::Failed(e.to_string()),
        })
    }
}

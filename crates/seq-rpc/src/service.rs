//! HTTP request server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::RpcConfig;
use crate::errors::{GatewayError, RpcError};
use crate::gateway::SequencerGateway;
use crate::types::{BlockSummary, SubmitRequest};

type SharedGateway = Arc<dyn SequencerGateway>;

pub struct RpcServer {
    config: RpcConfig,
    gateway: SharedGateway,
    local_addr: watch::Sender<Option<SocketAddr>>,
}

impl RpcServer {
    /// Allocate the server. Nothing is bound until [`RpcServer::start`].
    pub fn new(config: RpcConfig, gateway: SharedGateway) -> Self {
        let (local_addr, _) = watch::channel(None);
        Self {
            config,
            gateway,
            local_addr,
        }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Wait until the listener is bound and return its address.
    pub async fn listening_addr(&self) -> Option<SocketAddr> {
        let mut rx = self.local_addr.subscribe();
        rx.wait_for(Option::is_some).await.ok().and_then(|addr| *addr)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/status", get(status))
            .route("/blocks/:height", get(block_by_height))
            .route("/submit", post(submit))
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .with_state(Arc::clone(&self.gateway))
    }

    /// Bind and serve until `shutdown` turns `true` (or its sender is
    /// dropped). In-flight requests are allowed to finish.
    pub async fn start(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), RpcError> {
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RpcError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;
        self.local_addr.send_replace(Some(local_addr));
        info!("[rpc] Listening on http://{}", local_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
                debug!("[rpc] Shutdown signal received");
            })
            .await?;

        info!("[rpc] Stopped");
        Ok(())
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sequencer-rpc",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn status(State(gateway): State<SharedGateway>) -> impl IntoResponse {
    Json(gateway.status())
}

async fn block_by_height(
    State(gateway): State<SharedGateway>,
    Path(height): Path<u64>,
) -> Result<Json<BlockSummary>, GatewayError> {
    gateway
        .block(height)
        .map(Json)
        .ok_or_else(|| GatewayError::NotFound(format!("block #{}", height)))
}

async fn submit(
    State(gateway): State<SharedGateway>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<BlockSummary>), GatewayError> {
    let payload = request
        .decode_payload()
        .map_err(|e| GatewayError::InvalidRequest(format!("payload is not hex: {}", e)))?;

    match gateway.submit(payload) {
        Ok(summary) => {
            debug!("[rpc] Sequenced block #{}", summary.height);
            Ok((StatusCode::CREATED, Json(summary)))
        }
        Err(e) => {
            if matches!(e, GatewayError::Internal(_)) {
                warn!("[rpc] Submit failed: {}", e);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeStatus;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use seq_types::{Block, ZERO_HASH};
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    struct MockGateway {
        primary: bool,
        blocks: Mutex<Vec<Block>>,
    }

    impl MockGateway {
        fn new(primary: bool) -> Arc<Self> {
            Arc::new(Self {
                primary,
                blocks: Mutex::new(Vec::new()),
            })
        }
    }

    impl SequencerGateway for MockGateway {
        fn submit(&self, payload: Vec<u8>) -> Result<BlockSummary, GatewayError> {
            if !self.primary {
                return Err(GatewayError::NotPrimary);
            }
            let mut blocks = self.blocks.lock().unwrap();
            let parent = blocks.last().map_or(ZERO_HASH, Block::hash);
            let block = Block::new(blocks.len() as u64, parent, 1, payload);
            let summary = BlockSummary::from(&block);
            blocks.push(block);
            Ok(summary)
        }

        fn status(&self) -> NodeStatus {
            let blocks = self.blocks.lock().unwrap();
            NodeStatus {
                role: if self.primary { "primary" } else { "replica" }.into(),
                head_height: blocks.last().map(|b| b.height),
                head_hash: blocks.last().map(|b| hex::encode(b.hash())),
            }
        }

        fn block(&self, height: u64) -> Option<BlockSummary> {
            self.blocks
                .lock()
                .unwrap()
                .get(height as usize)
                .map(BlockSummary::from)
        }
    }

    fn server(gateway: Arc<MockGateway>) -> RpcServer {
        RpcServer::new(RpcConfig::new(SocketAddr::from(([127, 0, 0, 1], 0))), gateway)
    }

    fn submit_request(payload: &str) -> Request<Body> {
        Request::post("/submit")
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"payload":"{}"}}"#, payload)))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let router = server(MockGateway::new(true)).router();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_submit_on_primary_then_lookup() {
        let gateway = MockGateway::new(true);
        let rpc = server(Arc::clone(&gateway));

        let response = rpc.router().oneshot(submit_request("0xdeadbeef")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["height"], 0);
        assert_eq!(body["payload"], "deadbeef");

        let response = rpc
            .router()
            .oneshot(Request::get("/blocks/0").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["payload"], "deadbeef");

        let response = rpc
            .router()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = json_body(response).await;
        assert_eq!(status["role"], "primary");
        assert_eq!(status["head_height"], 0);
    }

    #[tokio::test]
    async fn test_submit_on_replica_conflicts() {
        let router = server(MockGateway::new(false)).router();
        let response = router.oneshot(submit_request("00")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_hex() {
        let router = server(MockGateway::new(true)).router();
        let response = router.oneshot(submit_request("xyz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_block_is_404() {
        let router = server(MockGateway::new(true)).router();
        let response = router
            .oneshot(Request::get("/blocks/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_stops_on_shutdown_signal() {
        let rpc = Arc::new(server(MockGateway::new(true)));
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn({
            let rpc = Arc::clone(&rpc);
            async move { rpc.start(rx).await }
        });
        assert!(rpc.listening_addr().await.is_some());

        tx.send_replace(true);
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_start_reports_bind_failure() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let rpc = RpcServer::new(RpcConfig::new(addr), MockGateway::new(true));
        let (_tx, rx) = watch::channel(false);
        assert!(matches!(rpc.start(rx).await, Err(RpcError::Bind { .. })));
    }
}

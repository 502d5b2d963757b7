//! Request server configuration.

use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub bind_addr: SocketAddr,
    /// Request body limit. Hex doubles the payload size, so this should be
    /// at least twice the engine's payload limit.
    pub max_body_bytes: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8545)),
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

impl RpcConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }
}

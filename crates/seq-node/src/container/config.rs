//! # Node Configuration
//!
//! Defaults suit a single local node. The binary overrides fields from
//! `SEQ_*` environment variables; [`NodeConfig::validate`] runs during
//! construction.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::role::Role;

/// Default bounded capacity of the replica ingestion queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Fixed for the lifetime of the process.
    pub role: Role,
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub pipeline: PipelineConfig,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let net = &self.network;
        if net.rpc_port == 0 {
            return Err(ConfigError::ZeroPort("rpc_port"));
        }
        if net.p2p_port == 0 {
            return Err(ConfigError::ZeroPort("p2p_port"));
        }
        if net.rpc_port == net.p2p_port {
            return Err(ConfigError::PortConflict(net.rpc_port));
        }
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if self.pipeline.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be 0")]
    ZeroPort(&'static str),

    #[error("rpc_port and p2p_port are both {0}")]
    PortConflict(u16),

    #[error("data_dir must not be empty")]
    EmptyDataDir,

    #[error("queue_capacity must be at least 1")]
    ZeroQueueCapacity,
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Request server port.
    pub rpc_port: u16,
    /// Gossip listening port.
    pub p2p_port: u16,
    /// Interface both services bind to.
    pub listen_host: IpAddr,
    /// Comma-separated `/ip4|ip6/<host>/tcp/<port>[/p2p/<id>]` list.
    /// Empty means no bootstrap peers.
    pub bootstrap_peers: String,
}

impl NetworkConfig {
    pub fn rpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.rpc_port)
    }

    pub fn p2p_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.p2p_port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_port: 8545,
            p2p_port: 30303,
            listen_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            bootstrap_peers: String::new(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Holds the lock file and the block log.
    pub data_dir: PathBuf,
    /// fsync after every block.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            sync_writes: true,
        }
    }
}

/// Security configuration.
#[derive(Clone, Default)]
pub struct SecurityConfig {
    /// Hex ed25519 seed (32 bytes) for the gossip identity.
    pub identity_secret: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("identity_secret", &"<redacted>")
            .finish()
    }
}

/// Replica pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

//! # Concrete Collaborators
//!
//! Builds the engine, gossip transport and request server from a
//! [`NodeConfig`], in dependency order:
//!
//! 1. Validate configuration
//! 2. Open storage (data-dir lock + block log)
//! 3. Parse bootstrap peers
//! 4. Load identity and allocate the gossip service
//! 5. Allocate the request server
//!
//! Nothing binds or listens here.

use std::sync::Arc;

use seq_engine::{EngineConfig, SequencerEngine};
use seq_gossip::{parse_bootstrap_list, GossipConfig, GossipService, NodeIdentity};
use seq_rpc::{RpcConfig, RpcServer};
use tracing::info;

use crate::adapters::{EngineAdapter, EngineGateway, GossipTransport, RpcRequestServer};
use crate::container::NodeConfig;
use crate::errors::ConstructionError;

/// The three collaborators, already wrapped in their port adapters.
pub struct NodeComponents {
    pub engine: Arc<EngineAdapter>,
    pub transport: Arc<GossipTransport>,
    pub server: Arc<RpcRequestServer>,
}

impl NodeComponents {
    pub fn build(config: &NodeConfig) -> Result<Self, ConstructionError> {
        config.validate()?;

        let mut engine_config = EngineConfig::new(&config.storage.data_dir);
        engine_config.sync_writes = config.storage.sync_writes;
        let engine = Arc::new(SequencerEngine::open(engine_config).map_err(ConstructionError::Storage)?);

        let bootstrap = parse_bootstrap_list(&config.network.bootstrap_peers)?;

        let identity = NodeIdentity::from_secret_hex(&config.security.identity_secret)
            .map_err(|e| ConstructionError::TransportInit(e.to_string()))?;
        let peer_id = identity.peer_id();
        let gossip_config = GossipConfig::new(config.network.p2p_addr(), bootstrap);
        let peer_count = gossip_config.bootstrap.len();
        let gossip = GossipService::new(gossip_config, identity)
            .map_err(|e| ConstructionError::TransportInit(e.to_string()))?;

        let gateway = Arc::new(EngineGateway::new(Arc::clone(&engine), config.role));
        let rpc = RpcServer::new(RpcConfig::new(config.network.rpc_addr()), gateway);

        info!(
            role = %config.role,
            peer = %peer_id,
            bootstrap = peer_count,
            "[node] Components ready (rpc {}, p2p {})",
            config.network.rpc_addr(),
            config.network.p2p_addr()
        );

        Ok(Self {
            engine: Arc::new(EngineAdapter::new(engine)),
            transport: Arc::new(GossipTransport::new(gossip)),
            server: Arc::new(RpcRequestServer::new(rpc)),
        })
    }
}

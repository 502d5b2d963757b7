//! # Port Adapters
//!
//! Bind the workspace collaborators to the node's ports.
//!
//! | Adapter | Port | Wraps |
//! |---------|------|-------|
//! | [`EngineAdapter`] | `Engine` | `seq_engine::SequencerEngine` |
//! | [`GossipTransport`] | `Transport` | `seq_gossip::GossipService` |
//! | [`RpcRequestServer`] | `RequestServer` | `seq_rpc::RpcServer` |
//! | [`EngineGateway`] | `seq_rpc::SequencerGateway` | `SequencerEngine` + role |

pub mod engine;
pub mod gateway;
pub mod gossip;
pub mod rpc;

pub use engine::EngineAdapter;
pub use gateway::EngineGateway;
pub use gossip::GossipTransport;
pub use rpc::RpcRequestServer;

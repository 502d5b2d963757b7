//! # Sequencer RPC
//!
//! Minimal HTTP surface of a sequencer node.
//!
//! | Route | Method | Description |
//! |-------|--------|-------------|
//! | `/health` | GET | Liveness probe |
//! | `/status` | GET | Role and chain head |
//! | `/blocks/:height` | GET | Block at a height |
//! | `/submit` | POST | Sequence a hex payload (Primary only) |
//!
//! The server knows nothing about engines or roles. Everything goes through
//! [`SequencerGateway`], which the node implements.

pub mod config;
pub mod errors;
pub mod gateway;
pub mod service;
pub mod types;

pub use config::RpcConfig;
pub use errors::{GatewayError, RpcError};
pub use gateway::SequencerGateway;
pub use service::RpcServer;
pub use types::{BlockSummary, NodeStatus, SubmitRequest};

//! # Sequencer Node
//!
//! Role-based orchestrator of a block-sequencing node.
//!
//! A node is constructed once per process with a fixed [`Role`]:
//!
//! - **Primary**: every block the engine finalizes is broadcast to peers.
//! - **Replica**: every block received from peers is applied to the engine,
//!   in receipt order, by a single applier.
//!
//! ## Modules
//!
//! - `ports/` - Engine, Transport and RequestServer contracts
//! - `adapters/` - Port implementations over the workspace crates
//! - `container/` - Configuration and construction of collaborators
//! - `pipeline/` - Publication and ingestion pipelines
//! - `role` - Role and its pipeline strategy
//! - `node` - Start/close lifecycle
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use seq_node::{NodeConfig, SequencerNode};
//!
//! let node = Arc::new(SequencerNode::new(&NodeConfig::default())?);
//! let runner = tokio::spawn({
//!     let node = Arc::clone(&node);
//!     async move { node.start().await }
//! });
//! // ...
//! node.close().await?;
//! runner.await??;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod container;
pub mod errors;
pub mod node;
pub mod pipeline;
pub mod ports;
pub mod role;

pub use container::{ConfigError, NodeConfig};
pub use errors::{ConstructionError, NodeError};
pub use node::SequencerNode;
pub use pipeline::PipelineStats;
pub use role::{Publisher, Role, RoleStrategy, Subscriber};

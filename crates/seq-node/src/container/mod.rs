//! # Node Container
//!
//! Configuration and construction of the concrete collaborators.
//!
//! Construction is all-or-nothing: any failure drops what was already
//! opened, which releases the storage lock.

pub mod components;
pub mod config;

pub use components::NodeComponents;
pub use config::{
    ConfigError, NetworkConfig, NodeConfig, PipelineConfig, SecurityConfig, StorageConfig,
    DEFAULT_QUEUE_CAPACITY,
};

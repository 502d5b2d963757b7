//! # Sequencer Engine
//!
//! Holds the ordered block chain of a node.
//!
//! ## Responsibilities
//!
//! - **Sequencing** (Primary): [`SequencerEngine::sequence`] wraps a payload
//!   into the next block, persists it, and fires finalization callbacks in
//!   finalization order.
//! - **Verification** (Replica): [`SequencerEngine::apply`] accepts only the
//!   exact successor of the current head.
//! - **Persistence**: an append-only, checksummed block log inside a data
//!   directory guarded by an exclusive lock file.
//!
//! ## Crate Structure
//!
//! - `domain/` - chain head rules and the finalization registry
//! - `adapters/` - data directory lock and block log
//! - `service.rs` - the engine itself

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod service;

pub use config::EngineConfig;
pub use domain::{ChainHead, FinalizeCallback, FinalizeRegistry};
pub use errors::EngineError;
pub use service::SequencerEngine;

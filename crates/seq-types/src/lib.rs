//! # Sequencer Types
//!
//! Entities shared across the sequencer workspace.
//!
//! - [`Block`]: the unit the engine finalizes and the transport carries. The
//!   node orchestrator routes blocks without looking inside them.
//! - [`BlockId`]: the (height, hash) pair used in log lines.
//! - [`SubscriptionHandle`]: a cancellable registration returned by
//!   callback-style subscriptions.

pub mod entities;
pub mod subscription;

pub use entities::*;
pub use subscription::SubscriptionHandle;

//! Sequencing/validation engine port.

use seq_types::{Block, SubscriptionHandle};
use thiserror::Error;

/// Invoked synchronously on the engine's context, once per finalized block,
/// in finalization order. Must not block.
pub type FinalizeCallback = Box<dyn Fn(&Block) + Send + Sync>;

/// Per-block failure from [`Engine::apply`]. Recoverable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The block is not acceptable (wrong height, wrong parent, too large).
    #[error("Block rejected: {0}")]
    Rejected(String),

    #[error("Engine storage failure: {0}")]
    Storage(String),
}

pub trait Engine: Send + Sync {
    /// Register for finalized blocks. Dropping or cancelling the handle
    /// stops further invocations.
    fn on_finalize(&self, callback: FinalizeCallback) -> SubscriptionHandle;

    /// Verify and persist a block received from the network.
    fn apply(&self, block: Block) -> Result<(), EngineError>;
}

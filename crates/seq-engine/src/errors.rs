//! Engine error types.

use thiserror::Error;

use crate::adapters::LockError;

/// Errors from opening, sequencing or applying.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Data directory unavailable: {0}")]
    Lock(#[from] LockError),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Block log corrupted at offset {offset}: {reason}")]
    Corrupted { offset: u64, reason: String },

    #[error("Block log breaks the chain at record {index}: {reason}")]
    ChainBroken { index: u64, reason: String },

    #[error("Block encoding error: {0}")]
    Encoding(String),

    #[error("Out-of-order block: expected height {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },

    #[error("Parent hash mismatch for block at height {height}")]
    ParentMismatch { height: u64 },

    #[error("Payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

impl EngineError {
    /// True when the block itself was rejected, as opposed to a storage
    /// failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::OutOfOrder { .. }
                | EngineError::ParentMismatch { .. }
                | EngineError::PayloadTooLarge { .. }
        )
    }
}

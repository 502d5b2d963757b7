//! # Chain Head
//!
//! The engine accepts a block only if it extends the current head:
//! `height == head.height + 1` and `parent_hash == head.hash`. An empty
//! chain accepts only genesis (height 0, zero parent).

use seq_types::{Block, BlockId, Hash, ZERO_HASH};

use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainHead {
    tip: Option<BlockId>,
}

impl ChainHead {
    pub fn tip(&self) -> Option<BlockId> {
        self.tip
    }

    pub fn next_height(&self) -> u64 {
        self.tip.map_or(0, |tip| tip.height + 1)
    }

    pub fn tip_hash(&self) -> Hash {
        self.tip.map_or(ZERO_HASH, |tip| tip.hash)
    }

    pub fn check_successor(&self, block: &Block) -> Result<(), EngineError> {
        let expected = self.next_height();
        if block.height != expected {
            return Err(EngineError::OutOfOrder {
                expected,
                got: block.height,
            });
        }
        if block.parent_hash != self.tip_hash() {
            return Err(EngineError::ParentMismatch {
                height: block.height,
            });
        }
        Ok(())
    }

    /// Move the head. Callers check succession first.
    pub fn advance(&mut self, id: BlockId) {
        self.tip = Some(id);
    }
}

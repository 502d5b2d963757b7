//! # Sequencer Engine Service
//!
//! Owns the data directory for the life of the process.
//!
//! ## Ordering
//!
//! `sequence` and `apply` serialize on one state mutex. `sequence` fires the
//! finalization callbacks while still holding it, so callbacks observe
//! blocks in exactly the order they were finalized. Callbacks must
//! therefore not call back into the engine.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use seq_types::{Block, BlockId, SubscriptionHandle};
use tracing::{debug, info};

use crate::adapters::{BlockLog, DataDirLock};
use crate::config::EngineConfig;
use crate::domain::{ChainHead, FinalizeCallback, FinalizeRegistry};
use crate::errors::EngineError;

const LOG_FILE: &str = "blocks.log";

struct EngineState {
    log: BlockLog,
    head: ChainHead,
    blocks: Vec<Block>,
}

pub struct SequencerEngine {
    config: EngineConfig,
    state: Mutex<EngineState>,
    finalized: FinalizeRegistry,
    _lock: DataDirLock,
}

impl SequencerEngine {
    /// Lock the data directory and replay the block log.
    pub fn open(config: EngineConfig) -> Result<Self, EngineError> {
        std::fs::create_dir_all(&config.data_dir)?;
        let lock = DataDirLock::acquire(&config.data_dir)?;

        let (log, blocks) = BlockLog::open(&config.data_dir.join(LOG_FILE), config.sync_writes)?;

        let mut head = ChainHead::default();
        for (index, block) in blocks.iter().enumerate() {
            head.check_successor(block)
                .map_err(|e| EngineError::ChainBroken {
                    index: index as u64,
                    reason: e.to_string(),
                })?;
            head.advance(block.id());
        }

        info!(
            "[engine] Opened {} ({} blocks, head: {})",
            config.data_dir.display(),
            blocks.len(),
            head.tip().map_or_else(|| "empty".to_string(), |tip| tip.to_string())
        );

        Ok(Self {
            config,
            state: Mutex::new(EngineState { log, head, blocks }),
            finalized: FinalizeRegistry::new(),
            _lock: lock,
        })
    }

    /// Wrap `payload` into the next block, persist it and finalize it.
    pub fn sequence(&self, payload: Vec<u8>) -> Result<Block, EngineError> {
        if payload.len() > self.config.max_payload_bytes {
            return Err(EngineError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_bytes,
            });
        }

        let mut state = self.state.lock();
        let parent_timestamp = state.blocks.last().map_or(0, |b| b.timestamp);
        let block = Block::new(
            state.head.next_height(),
            state.head.tip_hash(),
            now_ms().max(parent_timestamp),
            payload,
        );

        Self::commit(&mut state, block.clone())?;
        debug!("[engine] Finalized block {}", block.id());
        self.finalized.notify(&block);

        Ok(block)
    }

    /// Verify that `block` extends the head, then persist it.
    ///
    /// Applied blocks do not fire finalization callbacks.
    pub fn apply(&self, block: Block) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.head.check_successor(&block)?;
        let id = block.id();
        Self::commit(&mut state, block)?;
        debug!("[engine] Applied block {}", id);
        Ok(())
    }

    /// Register a callback for every block finalized by `sequence`.
    pub fn on_finalize(&self, callback: FinalizeCallback) -> SubscriptionHandle {
        self.finalized.register(callback)
    }

    pub fn head(&self) -> Option<BlockId> {
        self.state.lock().head.tip()
    }

    pub fn block(&self, height: u64) -> Option<Block> {
        let state = self.state.lock();
        usize::try_from(height)
            .ok()
            .and_then(|index| state.blocks.get(index).cloned())
    }

    pub fn len(&self) -> usize {
        self.state.lock().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn commit(state: &mut EngineState, block: Block) -> Result<(), EngineError> {
        state.log.append(&block)?;
        state.head.advance(block.id());
        state.blocks.push(block);
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

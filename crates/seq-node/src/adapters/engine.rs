use std::sync::Arc;

use seq_engine::SequencerEngine;
use seq_types::{Block, SubscriptionHandle};

use crate::ports::{Engine, EngineError, FinalizeCallback};

pub struct EngineAdapter {
    engine: Arc<SequencerEngine>,
}

impl EngineAdapter {
    pub fn new(engine: Arc<SequencerEngine>) -> Self {
        Self { engine }
    }

    pub fn inner(&self) -> &Arc<SequencerEngine> {
        &self.engine
    }
}

impl Engine for EngineAdapter {
    fn on_finalize(&self, callback: FinalizeCallback) -> SubscriptionHandle {
        self.engine.on_finalize(callback)
    }

    fn apply(&self, block: Block) -> Result<(), EngineError> {
        self.engine.apply(block).map_err(|e| {
            if e.is_rejection() {
                EngineError::Rejected(e.to_string())
            } else {
                EngineError::Storage(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seq_engine::EngineConfig;
    use seq_types::ZERO_HASH;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_apply_maps_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(SequencerEngine::open(EngineConfig::for_testing(dir.path())).unwrap());
        let adapter = EngineAdapter::new(Arc::clone(&engine));

        let genesis = Block::new(0, ZERO_HASH, 1, vec![1]);
        adapter.apply(genesis.clone()).unwrap();

        let gap = Block::new(5, genesis.hash(), 2, vec![2]);
        assert!(matches!(adapter.apply(gap), Err(EngineError::Rejected(_))));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_finalize_callbacks_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(SequencerEngine::open(EngineConfig::for_testing(dir.path())).unwrap());
        let adapter = EngineAdapter::new(Arc::clone(&engine));

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let mut handle = adapter.on_finalize(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        engine.sequence(vec![1]).unwrap();
        handle.cancel();
        engine.sequence(vec![2]).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}

//! Request-server gateway backed by the engine.
//!
//! A Primary sequences submitted payloads; the resulting finalization is what
//! feeds the publication pipeline. A Replica refuses submissions.

use std::sync::Arc;

use seq_engine::SequencerEngine;
use seq_rpc::{BlockSummary, GatewayError, NodeStatus, SequencerGateway};

use crate::role::Role;

pub struct EngineGateway {
    engine: Arc<SequencerEngine>,
    role: Role,
}

impl EngineGateway {
    pub fn new(engine: Arc<SequencerEngine>, role: Role) -> Self {
        Self { engine, role }
    }
}

impl SequencerGateway for EngineGateway {
    fn submit(&self, payload: Vec<u8>) -> Result<BlockSummary, GatewayError> {
        if self.role != Role::Primary {
            return Err(GatewayError::NotPrimary);
        }
        self.engine
            .sequence(payload)
            .map(|block| BlockSummary::from(&block))
            .map_err(|e| {
                if e.is_rejection() {
                    GatewayError::Rejected(e.to_string())
                } else {
                    GatewayError::Internal(e.to_string())
                }
            })
    }

    fn status(&self) -> NodeStatus {
        let head = self.engine.head();
        NodeStatus {
            role: self.role.to_string(),
            head_height: head.map(|id| id.height),
            head_hash: head.map(|id| hex::encode(id.hash)),
        }
    }

    fn block(&self, height: u64) -> Option<BlockSummary> {
        self.engine.block(height).as_ref().map(BlockSummary::from)
    }
}

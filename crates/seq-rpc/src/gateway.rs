//! Port between the HTTP handlers and the node.

use crate::errors::GatewayError;
use crate::types::{BlockSummary, NodeStatus};

/// What the request server needs from a node.
///
/// Implementations must be cheap to call from request handlers; they run on
/// the async runtime without `spawn_blocking`.
pub trait SequencerGateway: Send + Sync {
    /// Sequence `payload` into a new block. Only the primary accepts this.
    fn submit(&self, payload: Vec<u8>) -> Result<BlockSummary, GatewayError>;

    fn status(&self) -> NodeStatus;

    fn block(&self, height: u64) -> Option<BlockSummary>;
}

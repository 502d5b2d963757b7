//! Request and response bodies.

use serde::{Deserialize, Serialize};
use seq_types::Block;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    /// Hex payload, `0x` prefix optional.
    pub payload: String,
}

impl SubmitRequest {
    pub fn decode_payload(&self) -> Result<Vec<u8>, hex::FromHexError> {
        let digits = self.payload.strip_prefix("0x").unwrap_or(&self.payload);
        hex::decode(digits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub height: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: u64,
    pub payload: String,
}

impl From<&Block> for BlockSummary {
    fn from(block: &Block) -> Self {
        Self {
            height: block.height,
            hash: hex::encode(block.hash()),
            parent_hash: hex::encode(block.parent_hash),
            timestamp: block.timestamp,
            payload: hex::encode(&block.payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub role: String,
    /// `None` until the first block.
    pub head_height: Option<u64>,
    pub head_hash: Option<String>,
}

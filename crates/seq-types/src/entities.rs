//! # Core Entities
//!
//! The block is the only entity that crosses every crate boundary. The
//! engine gives it meaning; everything else carries it as-is.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// Parent hash of the genesis block.
pub const ZERO_HASH: Hash = [0u8; 32];

/// An ordered unit of sequencer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, starting at 0.
    pub height: u64,
    /// Hash of the previous block (`ZERO_HASH` for genesis).
    pub parent_hash: Hash,
    /// Unix timestamp in milliseconds when the block was sequenced.
    pub timestamp: u64,
    /// Opaque sequenced data.
    pub payload: Vec<u8>,
}

impl Block {
    pub fn new(height: u64, parent_hash: Hash, timestamp: u64, payload: Vec<u8>) -> Self {
        Self {
            height,
            parent_hash,
            timestamp,
            payload,
        }
    }

    /// SHA-256 over height, parent hash, timestamp and payload.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.height.to_be_bytes());
        hasher.update(self.parent_hash);
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update((self.payload.len() as u64).to_be_bytes());
        hasher.update(&self.payload);
        hasher.finalize().into()
    }

    #[must_use]
    pub fn id(&self) -> BlockId {
        BlockId {
            height: self.height,
            hash: self.hash(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.parent_hash == ZERO_HASH
    }
}

/// Identifies a block in logs and status responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub height: u64,
    pub hash: Hash,
}

impl BlockId {
    /// First 8 bytes of the hash, hex encoded.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.hash[..8])
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.height, self.short_hash())
    }
}

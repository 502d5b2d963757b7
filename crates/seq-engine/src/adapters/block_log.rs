//! # Block Log
//!
//! Append-only file of blocks. Each record is:
//!
//! ```text
//! [len: u32 BE][crc32: u32 BE][bincode(Block): len bytes]
//! ```
//!
//! On open the whole log is replayed. A torn record at the tail (crash in
//! the middle of an append) is truncated away; a bad record anywhere else is
//! corruption and refuses to open. A header whose length exceeds
//! [`MAX_RECORD_BYTES`] is never a torn tail, since no append can write one.
//!
//! A failed append truncates the file back to the last intact record before
//! returning, so later appends never land behind garbage.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use seq_types::Block;
use tracing::warn;

use crate::errors::EngineError;

const HEADER_LEN: usize = 8;

/// Largest encoded block a record may hold (16 MiB).
pub const MAX_RECORD_BYTES: usize = 16 * 1024 * 1024;

pub struct BlockLog {
    file: File,
    path: PathBuf,
    len: u64,
    sync_writes: bool,
    /// A rollback failed; truncate before the next write.
    needs_truncate: bool,
}

impl BlockLog {
    /// Open or create the log and return every intact block in order.
    pub fn open(path: &Path, sync_writes: bool) -> Result<(Self, Vec<Block>), EngineError> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let (blocks, intact_len) = Self::replay(&bytes)?;
        if intact_len < bytes.len() as u64 {
            warn!(
                "[engine] Truncating torn tail of {}: {} -> {} bytes",
                path.display(),
                bytes.len(),
                intact_len
            );
            file.set_len(intact_len)?;
            file.sync_all()?;
        }

        let log = Self {
            file,
            path: path.to_path_buf(),
            len: intact_len,
            sync_writes,
            needs_truncate: false,
        };
        Ok((log, blocks))
    }

    pub fn append(&mut self, block: &Block) -> Result<(), EngineError> {
        let body = bincode::serialize(block).map_err(|e| EngineError::Encoding(e.to_string()))?;
        if body.len() > MAX_RECORD_BYTES {
            return Err(EngineError::Encoding(format!(
                "record of {} bytes exceeds {}",
                body.len(),
                MAX_RECORD_BYTES
            )));
        }
        let body_len =
            u32::try_from(body.len()).map_err(|_| EngineError::Encoding("record too large".into()))?;

        let mut record = Vec::with_capacity(HEADER_LEN + body.len());
        record.extend_from_slice(&body_len.to_be_bytes());
        record.extend_from_slice(&crc32fast::hash(&body).to_be_bytes());
        record.extend_from_slice(&body);

        if let Err(e) = self.write_record(&record) {
            self.rollback();
            return Err(e);
        }
        self.len += record.len() as u64;
        Ok(())
    }

    fn write_record(&mut self, record: &[u8]) -> Result<(), EngineError> {
        if self.needs_truncate {
            self.file.set_len(self.len)?;
            self.needs_truncate = false;
        }
        self.file.write_all(record)?;
        if self.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Drop whatever a failed append left past the last intact record.
    fn rollback(&mut self) {
        match self.file.set_len(self.len) {
            Ok(()) => self.needs_truncate = false,
            Err(e) => {
                warn!(
                    "[engine] Cannot truncate {} after failed append: {}",
                    self.path.display(),
                    e
                );
                self.needs_truncate = true;
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes of intact records.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode records; returns the blocks and the length of the intact prefix.
    fn replay(bytes: &[u8]) -> Result<(Vec<Block>, u64), EngineError> {
        let mut blocks = Vec::new();
        let mut offset = 0usize;

        while offset < bytes.len() {
            let Some(header) = bytes.get(offset..offset + HEADER_LEN) else {
                break;
            };
            let body_len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let crc = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

            if body_len > MAX_RECORD_BYTES {
                return Err(EngineError::Corrupted {
                    offset: offset as u64,
                    reason: format!("record length {} exceeds {}", body_len, MAX_RECORD_BYTES),
                });
            }

            let body_start = offset + HEADER_LEN;
            let body_end = body_start + body_len;
            let Some(body) = bytes.get(body_start..body_end) else {
                // Claimed body runs past the end: interrupted append.
                break;
            };

            let is_last = body_end == bytes.len();
            if crc32fast::hash(body) != crc {
                if is_last {
                    break;
                }
                return Err(EngineError::Corrupted {
                    offset: offset as u64,
                    reason: "checksum mismatch".into(),
                });
            }

            let block: Block = bincode::deserialize(body).map_err(|e| EngineError::Corrupted {
                offset: offset as u64,
                reason: e.to_string(),
            })?;
            blocks.push(block);
            offset = body_end;
        }

        Ok((blocks, offset as u64))
    }
}

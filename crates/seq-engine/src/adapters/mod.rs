//! Storage adapters: data directory lock and block log.

pub mod block_log;
pub mod lock;

pub use block_log::BlockLog;
pub use lock::{DataDirLock, LockError};

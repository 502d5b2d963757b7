//! Gossip service configuration.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::PeerAddr;
use crate::errors::GossipError;

/// Largest frame accepted from a peer (10 MiB).
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GossipConfig {
    /// Address the listener binds on `start`.
    pub bind_addr: SocketAddr,
    /// Peers dialed on `start` and redialed after a disconnect.
    pub bootstrap: Vec<PeerAddr>,
    pub max_frame_bytes: usize,
    /// Hashes remembered for deduplication.
    pub seen_cache_size: usize,
    /// Frames buffered per peer before `broadcast` reports a full queue.
    pub outbound_queue: usize,
    /// Blocks buffered for slow subscribers.
    pub inbound_buffer: usize,
    pub connect_timeout: Duration,
    pub handshake_timeout: Duration,
    pub redial_interval: Duration,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 30303)),
            bootstrap: Vec::new(),
            max_frame_bytes: MAX_FRAME_BYTES,
            seen_cache_size: 10_000,
            outbound_queue: 256,
            inbound_buffer: 1024,
            connect_timeout: Duration::from_secs(5),
            handshake_timeout: Duration::from_secs(5),
            redial_interval: Duration::from_secs(3),
        }
    }
}

impl GossipConfig {
    pub fn new(bind_addr: SocketAddr, bootstrap: Vec<PeerAddr>) -> Self {
        Self {
            bind_addr,
            bootstrap,
            ..Self::default()
        }
    }

    /// Loopback listener on an ephemeral port with short timers.
    pub fn for_testing() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            connect_timeout: Duration::from_millis(500),
            handshake_timeout: Duration::from_millis(500),
            redial_interval: Duration::from_millis(100),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GossipError> {
        let checks = [
            (self.max_frame_bytes, "max_frame_bytes"),
            (self.seen_cache_size, "seen_cache_size"),
            (self.outbound_queue, "outbound_queue"),
            (self.inbound_buffer, "inbound_buffer"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(GossipError::InvalidConfig(format!("{} must be > 0", name)));
            }
        }
        Ok(())
    }
}

//! Gossip error types.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors from the gossip service.
#[derive(Debug, Error)]
pub enum GossipError {
    #[error("Invalid gossip configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("Gossip service already started")]
    AlreadyStarted,

    #[error("Gossip service is closed")]
    Closed,

    #[error("Gossip service already closed")]
    AlreadyClosed,

    #[error("Outbound queues full for all {peers} peers")]
    QueueFull { peers: usize },

    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Network error: {0}")]
    Io(#[from] io::Error),
}

/// Errors from parsing a peer address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Empty peer address")]
    Empty,

    #[error("Malformed peer address '{0}': expected /ip4|ip6/<host>/tcp/<port>[/p2p/<id>]")]
    Malformed(String),

    #[error("Unsupported protocol '{protocol}' in '{addr}'")]
    UnsupportedProtocol { protocol: String, addr: String },

    #[error("Invalid IP '{ip}' in '{addr}'")]
    InvalidIp { ip: String, addr: String },

    #[error("Invalid port '{port}' in '{addr}'")]
    InvalidPort { port: String, addr: String },

    #[error("Invalid peer id in '{addr}': {reason}")]
    InvalidPeerId { addr: String, reason: String },
}

/// Errors from loading a node identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Identity secret is not valid hex: {0}")]
    InvalidHex(String),

    #[error("Identity secret must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

//! # Block Gossip
//!
//! Distributes blocks between sequencer nodes.
//!
//! ```text
//! [Primary] ──broadcast──→ [Peer A] ──relay──→ [Peer C]
//!     │                        ↑
//!     └──────broadcast──→ [Peer B] (duplicate from A dropped)
//! ```
//!
//! ## Security
//!
//! - Every block frame carries the originator's peer id and an ed25519
//!   signature over the block hash; bad signatures are dropped silently.
//! - Frames are capped at 10 MiB.
//! - A bounded seen-block cache stops relay loops.
//!
//! ## Lifecycle
//!
//! [`GossipService::new`] only allocates. [`GossipService::start`] binds,
//! dials the bootstrap peers and runs until [`GossipService::close`].

pub mod config;
pub mod domain;
pub mod errors;
pub mod service;
pub mod wire;

pub use config::GossipConfig;
pub use domain::{parse_bootstrap_list, NodeIdentity, PeerAddr, PeerId, SeenBlockCache};
pub use errors::{AddressError, GossipError, IdentityError};
pub use service::GossipService;

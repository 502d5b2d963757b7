//! Gossip domain: addresses, identities, deduplication.

pub mod address;
pub mod identity;
pub mod seen;

pub use address::{parse_bootstrap_list, PeerAddr};
pub use identity::{NodeIdentity, PeerId};
pub use seen::SeenBlockCache;

//! Pure engine domain logic.

pub mod chain;
pub mod finalize;

pub use chain::ChainHead;
pub use finalize::{FinalizeCallback, FinalizeRegistry};

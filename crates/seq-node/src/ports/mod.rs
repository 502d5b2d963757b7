//! # Ports
//!
//! The three collaborators the orchestrator drives. Adapters in
//! [`crate::adapters`] implement them for the workspace crates; tests
//! implement them with mocks.
//!
//! ```text
//!                 ┌──────────────────┐
//!   on_finalize ──│                  │── broadcast / subscribe
//!   apply ────────│  SequencerNode   │── start / close
//!                 │                  │── start(shutdown)
//!    Engine       └──────────────────┘   Transport, RequestServer
//! ```

pub mod engine;
pub mod server;
pub mod transport;

pub use engine::{Engine, EngineError, FinalizeCallback};
pub use server::{RequestServer, ServerError};
pub use transport::{BlockStream, Transport, TransportError};

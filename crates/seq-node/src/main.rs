//! # Sequencer Node Binary
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`RUST_LOG`, default `info`)
//! 2. Load configuration from defaults plus `SEQ_*` environment overrides
//! 3. Construct the node (storage, transport, request server)
//! 4. Run until Ctrl+C or until both services stop on their own
//! 5. Close the node; a failed close exits non-zero
//!
//! ## Environment
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SEQ_ROLE` | `primary` or `replica` |
//! | `SEQ_DATA_DIR` | storage directory |
//! | `SEQ_RPC_PORT` / `SEQ_P2P_PORT` | service ports |
//! | `SEQ_LISTEN_HOST` | bind interface |
//! | `SEQ_IDENTITY_SECRET` | 64 hex chars ed25519 seed |
//! | `SEQ_BOOTSTRAP_PEERS` | comma-separated peer addresses |
//! | `SEQ_QUEUE_CAPACITY` | replica ingestion queue |

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use seq_node::{NodeConfig, SequencerNode};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Parse `name` into `target` if set. Unparseable values are reported and
/// ignored.
fn env_override<T>(name: &str, target: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(name) else {
        return;
    };
    match raw.parse::<T>() {
        Ok(value) => *target = value,
        Err(e) => warn!("Ignoring {}={:?}: {}", name, raw, e),
    }
}

fn load_config() -> NodeConfig {
    let mut config = NodeConfig::default();

    env_override("SEQ_ROLE", &mut config.role);
    env_override("SEQ_RPC_PORT", &mut config.network.rpc_port);
    env_override("SEQ_P2P_PORT", &mut config.network.p2p_port);
    env_override("SEQ_LISTEN_HOST", &mut config.network.listen_host);
    env_override("SEQ_QUEUE_CAPACITY", &mut config.pipeline.queue_capacity);

    if let Ok(dir) = std::env::var("SEQ_DATA_DIR") {
        config.storage.data_dir = PathBuf::from(dir);
    }
    if let Ok(peers) = std::env::var("SEQ_BOOTSTRAP_PEERS") {
        config.network.bootstrap_peers = peers;
    }
    if let Ok(secret) = std::env::var("SEQ_IDENTITY_SECRET") {
        config.security.identity_secret = secret;
        info!("Loaded identity secret from environment");
    } else {
        warn!("SEQ_IDENTITY_SECRET is not set; the transport cannot start without an identity");
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config();
    info!("===========================================");
    info!("  Sequencer Node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Role: {}", config.role);
    info!("===========================================");

    let node = Arc::new(SequencerNode::new(&config).context("Failed to construct node")?);

    let mut runner = tokio::spawn({
        let node = Arc::clone(&node);
        async move { node.start().await }
    });

    info!("Node is running. Press Ctrl+C to stop.");
    let finished_early = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Received Ctrl+C");
            None
        }
        joined = &mut runner => Some(joined),
    };

    node.close().await.context("Node failed to shut down cleanly")?;

    let joined = match finished_early {
        Some(joined) => joined,
        None => runner.await,
    };
    match joined.context("Node task panicked")? {
        Ok(()) => {
            info!("Shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Node stopped with error");
            Err(e).context("Node services failed")
        }
    }
}

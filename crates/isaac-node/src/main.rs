//! The node binary's entry point: loads configuration, installs the global
//! tracing subscriber, bootstraps genesis, and drives rounds until the
//! process receives Ctrl+C.
//!
//! Validator identity is a fresh Ed25519 keypair generated on each start —
//! key persistence and the wallet CLI that would normally manage it are out
//! of scope here. A deployment that needs a stable validator address across
//! restarts supplies its own `KeyPair` loading in front of [`isaac_node::Node`].

use std::env;
use std::sync::Arc;

use anyhow::Result;
use isaac_crypto::KeyPair;
use isaac_eventbus::InMemoryEventBus;
use isaac_node::{Node, NodeConfig, NullTransport};
use isaac_telemetry::TelemetryConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    isaac_telemetry::init(&TelemetryConfig::from_env())?;

    let config = match env::var("ISAAC_NODE_CONFIG") {
        Ok(path) => NodeConfig::from_file(std::path::Path::new(&path))?,
        Err(_) => NodeConfig::default(),
    };

    let keypair = KeyPair::generate();
    info!(address = %keypair.address(), "starting validator");

    let events = Arc::new(InMemoryEventBus::new());
    let mut node = Node::new(config, keypair, Arc::new(NullTransport)).with_events(events);

    let genesis = node.bootstrap()?;
    info!(height = genesis.height(), hash = ?genesis.hash, "genesis ready");

    tokio::select! {
        result = node.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

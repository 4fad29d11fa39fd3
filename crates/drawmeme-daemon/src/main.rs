//! drawmeme-daemon: request and bot layer in front of the registry.
//!
//! Single OS process running a Tokio async runtime. Web and bot front ends
//! talk to it with JSON-RPC over a Unix socket.

mod bot;
mod commands;
mod config;
mod events;
mod launch;
mod rpc;
mod uploads;

use std::sync::Arc;

use drawmeme_db::Registry;
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::events::EventBus;
use crate::rpc::RpcServer;
use crate::uploads::ImageStore;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// The one process-wide registry.
    pub registry: Arc<Registry>,
    /// Configuration.
    pub config: DaemonConfig,
    /// Uploaded image storage.
    pub images: ImageStore,
    /// Event bus for launch/vote notifications.
    pub event_bus: EventBus,
}

impl DaemonState {
    pub fn new(config: DaemonConfig, registry: Arc<Registry>) -> Self {
        let images = ImageStore::new(config.uploads_dir(), config.storage.max_upload_bytes);
        Self {
            registry,
            config,
            images,
            event_bus: EventBus::new(1000),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "drawmeme_daemon={level},drawmeme_db={level}",
                    level = config.advanced.log_level
                ))
            }),
        )
        .init();

    info!("DrawYourMeme daemon starting");

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // 2. Build the registry
    let registry = Arc::new(Registry::new()?);

    // 3. Build daemon state
    let socket_path = config.socket_path();
    let state = Arc::new(DaemonState::new(config, registry));
    std::fs::create_dir_all(state.images.dir())?;
    let _notifier = events::spawn_launch_notifier(&state.event_bus);

    // 4. Start RPC server
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    state.event_bus.emit(events::Event::now(
        events::DAEMON_STARTED,
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        }),
    ));

    // 5. Run until the server fails or Ctrl-C
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped after {} events", state.event_bus.sequence());
    Ok(())
}

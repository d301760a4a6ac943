//! gigline-daemon: hosts the trust, deputy and gig core.
//!
//! Single OS process running a Tokio async runtime. The UI communicates
//! with the daemon via JSON-RPC over a Unix socket.

mod commands;
mod config;
mod events;
mod rpc;

use std::sync::Arc;

use gigline_db::SqliteStore;
use gigline_trust::{CachedEngine, ProfileDirectory};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::events::EventBus;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// Profiles, deputy relationships and gigs.
    pub store: Arc<SqliteStore>,
    /// Memoising trust engine shared by every request.
    pub engine: CachedEngine,
    pub config: DaemonConfig,
    /// Event bus for pushing events to subscribers.
    pub event_bus: EventBus,
    /// Shutdown signal sender.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl DaemonState {
    pub fn new(store: SqliteStore, config: DaemonConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            store: Arc::new(store),
            engine: CachedEngine::new(config.trust.cache_capacity),
            event_bus: EventBus::new(config.rpc.event_buffer),
            config,
            shutdown_tx,
        }
    }

    /// Trust lookups backed by stored profiles.
    pub fn trust(&self) -> ProfileDirectory<'_, SqliteStore> {
        ProfileDirectory::new(self.store.as_ref(), &self.engine)
    }

    #[cfg(test)]
    pub fn for_tests() -> Arc<Self> {
        let store = SqliteStore::open_memory().expect("open in-memory store");
        Arc::new(Self::new(store, DaemonConfig::default()))
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn init_tracing(config: &DaemonConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("gigline={}", config.advanced.log_level).parse()?);

    if config.advanced.log_file.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.advanced.log_file)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;
    init_tracing(&config)?;

    info!("Gigline daemon starting");

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // 2. Open database
    let store = SqliteStore::open(&data_dir.join("gigline.db"))?;

    // 3. Build daemon state
    let socket_path = config.socket_path();
    let state = Arc::new(DaemonState::new(store, config));

    // 4. Start IPC server
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    state.event_bus.emit(events::Event::new(
        events::DAEMON_STARTED,
        unix_now(),
        serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
    ));

    // 5. Run the RPC server until shutdown
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}

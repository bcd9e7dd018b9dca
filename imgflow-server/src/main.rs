//! imgflow server
//!
//! Runs control-image processing workflows against an external execution
//! service and exposes the UI state over HTTP.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use imgflow_core::config::ConfigStore;
use imgflow_core::events::EventBus;
use imgflow_core::processors::{
    ControlImageProcessor, ExecutionService, MetadataResolver, SessionExecutor,
    http_execution_service,
};
use imgflow_core::store::Store;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// imgflow - control-image processing workflows over an execution service
#[derive(Parser, Debug)]
#[command(name = "imgflow-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./imgflow-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting imgflow-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let listen_addr = loaded_config.listen;
    let workflow_config = ConfigStore::new(loaded_config.workflow.clone());

    // Execution service client
    let service: Arc<dyn ExecutionService> =
        Arc::new(http_execution_service(&loaded_config.execution).map_err(|e| {
            tracing::error!("Failed to build execution service client: {}", e);
            e
        })?);
    tracing::info!(
        base_url = %loaded_config.execution.base_url,
        "Execution service configured"
    );

    // Event bus and UI state
    let store = Store::new(EventBus::new(loaded_config.workflow.channel_buffer));

    // Spawn processors
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let processors = vec![
        tokio::spawn(
            ControlImageProcessor::new(store.clone(), workflow_config.clone())
                .run(shutdown_rx.clone()),
        ),
        tokio::spawn(SessionExecutor::new(store.clone(), service.clone()).run(shutdown_rx.clone())),
        tokio::spawn(MetadataResolver::new(store.clone(), service).run(shutdown_rx.clone())),
    ];

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify =
        spawn_config_reload_handler(config_loader, loaded_config, workflow_config);

    // Build the router
    let state = AppState::new(store, shutdown_rx);
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr, shutdown_tx.clone()).await;

    // Signal the config reload handler to stop
    reload_notify.notify_one();

    // Stop processors; in-flight runs are cancelled
    let _ = shutdown_tx.send(true);
    for handle in processors {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Processor task failed");
        }
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,imgflow_core=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

mod api;
mod bootstrap;
mod clock;
mod config;
mod display;
mod error;
mod fetcher;
mod format;
mod propagation;
mod scheduler;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::api::HealthState;
use crate::config::Config;
use crate::display::{DisplaySink, SlotStore};
use crate::error::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let store = SlotStore::new();
    let health = Arc::new(HealthState::new());
    let client = fetcher::build_client(cfg.http_timeout)?;

    // Bind before starting the feeds so a taken port fails fast.
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    let sink: Arc<dyn DisplaySink> = store.clone();
    let scheduler = bootstrap::start(&cfg, client, sink, Arc::clone(&health));

    let app = router(ApiState { store, health });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C, running until killed: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

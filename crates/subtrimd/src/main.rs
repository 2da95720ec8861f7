//! subtrimd entry point.

use anyhow::Result;
use subtrimd::config::Config;
use subtrimd::server::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("subtrimd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let state = AppState::new(config);

    server::run(state).await
}

//! Bootcamp Directory API server
//!
//! Reads configuration from TOML (`BOOTCAMP_CONFIG`, default
//! `~/.config/bootcamp-service/config.toml`).

use bootcamp_api::server::{init_tracing, ServerHandle, ServerOptions};
use bootcamp_api::{default_config_path, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("BOOTCAMP_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());

    let (config, load_error) = match AppConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        ..ServerOptions::default()
    })
    .await?;
    handle.install_signal_handler();
    handle.wait().await;
    Ok(())
}

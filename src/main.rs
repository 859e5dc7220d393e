use std::path::Path;

use roundup_engine::api::{AppState, create_router};
use roundup_engine::config::{ConfigLoader, EngineConfig};

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "roundup_engine=info".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_dir =
        std::env::var("ROUNDUP_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = load_config(&config_dir)?;

    let bind = std::env::var("ROUNDUP_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, config_dir = %config_dir, "Serving round-up savings engine");

    axum::serve(listener, create_router(AppState::new(config))).await?;
    Ok(())
}

/// Loads the configuration directory, falling back to the built-in
/// defaults only when the default directory is absent.
fn load_config(dir: &str) -> Result<EngineConfig, Box<dyn std::error::Error + Send + Sync>> {
    if dir == DEFAULT_CONFIG_DIR && !Path::new(dir).exists() {
        tracing::warn!(config_dir = %dir, "Configuration directory not found; using built-in defaults");
        return Ok(EngineConfig::default());
    }
    Ok(ConfigLoader::load(dir)?)
}

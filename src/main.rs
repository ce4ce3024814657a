//! StandHub Server: real-time stand status hub
//!
//! Main entry point: loads configuration, initializes logging, and runs the
//! HTTP + WebSocket server until Ctrl+C or SIGTERM.

use tracing_subscriber::{EnvFilter, fmt};

use standhub_core::config::AppConfig;
use standhub_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!("Starting StandHub v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = standhub_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("STANDHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let explicit = std::env::var("STANDHUB_CONFIG").ok();

    AppConfig::load(&env, explicit.as_deref())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

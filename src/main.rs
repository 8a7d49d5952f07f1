// src/main.rs

//! The main entry point for the assignment-core Master process.

use anyhow::Result;
use region_assign::config::MasterConfig;
use region_assign::master;
use std::env;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    const VERSION: &str = env!("CARGO_PKG_VERSION");
    if args.contains(&"--version".to_string()) {
        println!("assignment-core master version {VERSION}");
        return Ok(());
    }

    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("master.toml");

    let config = match std::path::Path::new(config_path).exists() {
        true => match MasterConfig::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration from \"{config_path}\": {e}");
                std::process::exit(1);
            }
        },
        false => MasterConfig::default(),
    };

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .compact()
        .with_ansi(true)
        .init();

    if let Err(e) = master::run(config).await {
        error!("master runtime error: {}", e);
        return Err(e);
    }

    Ok(())
}

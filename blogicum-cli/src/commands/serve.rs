//! HTTP server command
//!
//! Runs migrations, then serves the blog until Ctrl+C/SIGTERM.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use blogicum_server::{create_pool, migrate, run_server};

use crate::config::load_config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Skip creating missing tables on startup
    #[arg(long)]
    pub skip_migrate: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_file: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_file)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    config.cors_permissive |= args.cors_permissive;
    config.validate().context("Invalid configuration")?;

    tracing::info!("Starting blogicum server on {}", config.bind_addr);

    let pool = create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to create database pool")?;

    if !args.skip_migrate {
        migrate(&pool).await.context("Failed to run migrations")?;
    }

    // Blocks until shutdown
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}

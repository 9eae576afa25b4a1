//! Command implementations for the blogicum CLI

pub mod category;
pub mod location;
pub mod migrate;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use blogicum_server::db::{create_pool, PgPool};

use crate::config::load_config;

// Re-export main dispatcher functions for flat access from main.rs
pub use category::run_category;
pub use location::run_location;
pub use migrate::run_migrate;
pub use serve::run_serve;

/// Database connection flags shared by the admin commands
#[derive(Args, Debug, Clone, Default)]
pub struct DbArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, global = true)]
    pub database_url: Option<String>,
}

impl DbArgs {
    /// Open a small pool for a one-shot admin command.
    pub async fn connect(&self, config_file: Option<&Path>) -> Result<PgPool> {
        let mut config = load_config(config_file)?;
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }

        create_pool(&config.database_url, 2)
            .await
            .context("Failed to connect to database")
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (for piping to jq)
    Json,
}

/// Print `items` as JSON, or one line per item through `line`.
pub fn print_list<T, F>(items: &[T], format: OutputFormat, line: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Human => {
            if items.is_empty() {
                println!("(none)");
            }
            for item in items {
                println!("{}", line(item));
            }
        }
    }
    Ok(())
}

/// Marker shown next to hidden entries
pub fn hidden_marker(is_published: bool) -> &'static str {
    if is_published {
        ""
    } else {
        " [hidden]"
    }
}

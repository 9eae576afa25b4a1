//! blogicum CLI - run and administer the blog
//!
//! - `serve` runs the HTTP server
//! - `migrate` creates the database schema
//! - `category` / `location` manage the reference data authors file posts under
//! - `config` inspects the effective configuration

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(
    name = "blogicum",
    author,
    version,
    about = "Personal blog server: posts, categories, locations and comments"
)]
struct Cli {
    /// Config file (default: ~/.blogicum/config.toml if it exists)
    #[arg(long, short = 'c', env = "BLOGICUM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Create missing tables and indexes
    Migrate(commands::migrate::MigrateArgs),
    /// Manage categories (add, list, publish, hide)
    Category(commands::category::CategoryArgs),
    /// Manage locations (add, list)
    Location(commands::location::LocationArgs),
    /// Inspect configuration (show, path, validate)
    Config(config::ConfigArgs),
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    let cli = Cli::parse();
    init_tracing(cli.debug).ok();

    let config_file = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config_file).await?,
        Commands::Migrate(args) => commands::run_migrate(args, config_file).await?,
        Commands::Category(args) => commands::run_category(args, config_file).await?,
        Commands::Location(args) => commands::run_location(args, config_file).await?,
        Commands::Config(args) => config::run_config(args, config_file)?,
    }
    Ok(())
}

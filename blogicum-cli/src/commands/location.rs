//! Location administration: add, list

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blogicum_server::db::{Location, LocationRepo};

use super::{hidden_marker, print_list, DbArgs, OutputFormat};

#[derive(Parser, Debug)]
pub struct LocationArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(subcommand)]
    pub command: LocationCommands,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// Create a location
    Add(AddArgs),
    /// List all locations
    List(ListArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Place name
    pub name: String,

    /// Create the location unpublished (posts then show no location)
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

fn describe(location: &Location) -> String {
    format!(
        "{:>6}  {}{}",
        location.id,
        location.name,
        hidden_marker(location.is_published)
    )
}

pub async fn run_location(args: LocationArgs, config_file: Option<&Path>) -> Result<()> {
    let pool = args.db.connect(config_file).await?;
    let repo = LocationRepo::new(&pool);

    match args.command {
        LocationCommands::Add(add) => {
            let location = repo
                .create(&add.name, !add.hidden)
                .await
                .context("Failed to create location")?;
            println!("Created {}", describe(&location));
        }
        LocationCommands::List(list) => {
            let locations = repo.list().await?;
            print_list(&locations, list.format, describe)?;
        }
    }
    Ok(())
}

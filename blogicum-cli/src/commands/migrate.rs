//! Create the blog schema without starting the server

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use blogicum_server::migrate;

use super::DbArgs;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

pub async fn run_migrate(args: MigrateArgs, config_file: Option<&Path>) -> Result<()> {
    let pool = args.db.connect(config_file).await?;
    migrate(&pool).await.context("Failed to run migrations")?;
    println!("Schema is up to date");
    Ok(())
}

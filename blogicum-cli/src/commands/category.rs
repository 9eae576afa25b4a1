//! Category administration: add, list, publish, hide
//!
//! ```bash
//! blogicum category add --title Travel --slug travel
//! blogicum category hide travel      # hides every post in it
//! blogicum category list --format json | jq '.[].slug'
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blogicum_server::db::{Category, CategoryRepo, NewCategory};

use super::{hidden_marker, print_list, DbArgs, OutputFormat};

#[derive(Parser, Debug)]
pub struct CategoryArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(subcommand)]
    pub command: CategoryCommands,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    Add(AddArgs),
    /// List all categories, hidden ones included
    List(ListArgs),
    /// Make a category and its posts visible
    Publish(SlugArg),
    /// Hide a category and its posts
    Hide(SlugArg),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Display title
    #[arg(long)]
    pub title: String,

    /// URL identifier: latin letters, digits, hyphen and underscore
    #[arg(long)]
    pub slug: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Create the category unpublished
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct SlugArg {
    /// Category slug
    pub slug: String,
}

fn describe(category: &Category) -> String {
    format!(
        "{:<24} {}{}",
        category.slug,
        category.title,
        hidden_marker(category.is_published)
    )
}

pub async fn run_category(args: CategoryArgs, config_file: Option<&Path>) -> Result<()> {
    let pool = args.db.connect(config_file).await?;
    let repo = CategoryRepo::new(&pool);

    match args.command {
        CategoryCommands::Add(add) => {
            let new = NewCategory::new(&add.title, &add.description, &add.slug, !add.hidden)?;
            let category = repo.create(new).await.context("Failed to create category")?;
            println!("Created {}", describe(&category));
        }
        CategoryCommands::List(list) => {
            let categories = repo.list().await?;
            print_list(&categories, list.format, describe)?;
        }
        CategoryCommands::Publish(arg) => {
            let category = repo.set_published(&arg.slug, true).await?;
            println!("Published {}", describe(&category));
        }
        CategoryCommands::Hide(arg) => {
            let category = repo.set_published(&arg.slug, false).await?;
            println!("Hid {}", describe(&category));
        }
    }
    Ok(())
}

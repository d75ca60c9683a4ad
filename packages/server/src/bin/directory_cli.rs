//! CLI over the location tree and the resource filter
//!
//! Connects to the configured database, applies migrations and prints one
//! JSON document per command.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use directory_core::config::Config;
use directory_core::domains::resources::{CriterionValue, FilterCriteria, Resource};
use directory_core::kernel::{DirectoryDeps, NominatimGeocoder};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "directory_cli")]
#[command(about = "Resource directory location and search CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the starter location hierarchy (only on an empty tree)
    Seed,

    /// Resolve a place name and its ancestors through the geocoder
    Resolve { name: String },

    /// Add a location under an explicit parent
    AddLocation { name: String, parent: String },

    /// Print the ancestor chain of a location
    Ancestors { name: String },

    /// Print a location and everything nested beneath it
    Descendants { name: String },

    /// Filter resources, e.g. `filter types=Scholarship,Funding location=California`
    Filter { criteria: Vec<String> },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<Vec<Resource>>,
}

impl Response {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            locations: None,
            resources: None,
        }
    }

    fn locations(locations: Vec<String>) -> Self {
        Self {
            success: true,
            message: None,
            locations: Some(locations),
            resources: None,
        }
    }
}

fn output(resp: Response) -> Result<()> {
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,directory_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let deps = connect().await?;
    let tree = deps.location_tree();

    match cli.command {
        Commands::Seed => {
            if !tree.is_empty().await? {
                return output(Response::message("Location tree already seeded"));
            }
            tree.insert_seed().await?;
            output(Response::message("Location tree seeded"))
        }
        Commands::Resolve { name } => {
            tree.resolve(&name).await?;
            output(Response::locations(tree.ancestor_chain(Some(&name)).await?))
        }
        Commands::AddLocation { name, parent } => {
            tree.add_location(&name, &parent).await?;
            output(Response::locations(tree.ancestor_chain(Some(&name)).await?))
        }
        Commands::Ancestors { name } => {
            output(Response::locations(tree.ancestor_chain(Some(&name)).await?))
        }
        Commands::Descendants { name } => output(Response::locations(
            tree.descendants(&name).await?.into_iter().collect(),
        )),
        Commands::Filter { criteria } => {
            let criteria = parse_criteria(&criteria)?;
            let resources = deps.resource_filter().filter(&criteria).await?;
            output(Response {
                success: true,
                message: None,
                locations: None,
                resources: Some(resources),
            })
        }
    }
}

async fn connect() -> Result<DirectoryDeps> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let geocoder = Arc::new(NominatimGeocoder::from_config(&config));
    Ok(DirectoryDeps::postgres(pool, geocoder))
}

/// `key=value` pairs; numeric values are passed as numbers
fn parse_criteria(pairs: &[String]) -> Result<FilterCriteria> {
    pairs
        .iter()
        .map(|pair| -> Result<(String, CriterionValue)> {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("Expected key=value, got '{}'", pair))?;
            let value: CriterionValue = match value.parse::<i64>() {
                Ok(n) => n.into(),
                Err(_) => value.into(),
            };
            Ok((key.to_string(), value))
        })
        .collect()
}

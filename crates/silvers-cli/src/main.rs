use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use silvers_core::SortKey;
use tracing_subscriber::EnvFilter;

mod catalog;
mod doctor;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "silvers")]
#[command(about = "Storefront catalog and checkout command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List visible products
    Products {
        /// Only featured products
        #[arg(long)]
        featured: bool,
        /// Free-text search over name, description, brand and category
        #[arg(long)]
        search: Option<String>,
        /// Exact category name
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
        /// Only products with stock on hand
        #[arg(long)]
        in_stock: bool,
        /// newest, price_asc, price_desc, rating or popular
        #[arg(long, default_value = "newest")]
        sort: SortKey,
    },
    /// Show one product
    Product { id: String },
    /// List collections
    Collections,
    /// List the products in a collection
    Collection { name: String },
    /// List categories
    Categories {
        /// Nest subcategories under their parents
        #[arg(long)]
        tree: bool,
    },
    /// Check the pipeline connection and order tables
    Doctor,
    /// Show one order by its reference code
    Order { reference: String },
    /// List recent orders
    Orders {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Place an order from a cart file and a customer file
    Checkout {
        /// JSON list of `{product_id, quantity, options}`
        #[arg(long)]
        cart: PathBuf,
        /// JSON customer details
        #[arg(long)]
        customer: PathBuf,
        /// Reuse the reference code of an earlier attempt
        #[arg(long)]
        reference: Option<String>,
        /// Print the totals the cart would be charged without placing it
        #[arg(long)]
        quote: bool,
    },
    /// Manage a favorites file
    Favorites {
        #[arg(long)]
        file: PathBuf,
        #[command(subcommand)]
        command: FavoritesCommands,
    },
}

#[derive(Debug, Subcommand)]
enum FavoritesCommands {
    List,
    /// Fetch a product and add it
    Add { id: String },
    Remove { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("silvers: run with --help to list commands");
        return Ok(());
    };

    let config = silvers_core::load_app_config_from_env().context("failed to load config")?;
    init_tracing(&config.log_level);
    tracing::debug!(env = %config.env, "configuration loaded");

    let client = silvers_pipeline::PipelineClient::from_config(&config)
        .context("failed to build pipeline client")?;

    let result = match command {
        Commands::Products {
            featured,
            search,
            category,
            min_price,
            max_price,
            in_stock,
            sort,
        } => {
            let query = silvers_core::ProductQuery {
                search,
                category,
                min_price,
                max_price,
                in_stock: in_stock.then_some(true),
                sort,
                ..silvers_core::ProductQuery::default()
            };
            catalog::run_products(&client, &config, featured, &query).await
        }
        Commands::Product { id } => catalog::run_product(&client, &config, &id).await,
        Commands::Collections => catalog::run_collections(&client, &config).await,
        Commands::Collection { name } => catalog::run_collection(&client, &config, &name).await,
        Commands::Categories { tree } => catalog::run_categories(&client, &config, tree).await,
        Commands::Doctor => doctor::run_doctor(&client).await,
        Commands::Order { reference } => orders::run_order(&client, &reference).await,
        Commands::Orders { limit } => orders::run_orders(&client, limit).await,
        Commands::Checkout {
            cart,
            customer,
            reference,
            quote,
        } => {
            if quote {
                orders::run_quote(&client, &config, &cart).await
            } else {
                orders::run_checkout(&client, &config, &cart, &customer, reference).await
            }
        }
        Commands::Favorites { file, command } => match command {
            FavoritesCommands::List => catalog::run_favorites_list(&file),
            FavoritesCommands::Add { id } => {
                catalog::run_favorites_add(&client, &config, &file, &id).await
            }
            FavoritesCommands::Remove { id } => catalog::run_favorites_remove(&file, &id),
        },
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    result
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests;

//! Catalog and favorites command handlers for the CLI.

use std::path::Path;

use silvers_checkout::Favorites;
use silvers_core::{build_category_tree, AppConfig, ProductQuery};
use silvers_pipeline::{Catalog, PipelineClient};

use crate::print_json;

/// Prints visible (or featured) products after applying `query`.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub(crate) async fn run_products(
    client: &PipelineClient,
    config: &AppConfig,
    featured: bool,
    query: &ProductQuery,
) -> anyhow::Result<()> {
    let catalog = Catalog::from_config(client, config);
    let products = if featured {
        catalog.featured_products().await?
    } else {
        catalog.products().await?
    };
    let listed = query.apply(&products);
    tracing::info!(fetched = products.len(), listed = listed.len(), "products listed");
    print_json(&listed)
}

/// # Errors
///
/// Returns an error if the query fails or no product has this id.
pub(crate) async fn run_product(
    client: &PipelineClient,
    config: &AppConfig,
    id: &str,
) -> anyhow::Result<()> {
    let product = Catalog::from_config(client, config)
        .product_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product '{id}' not found"))?;
    print_json(&product)
}

/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_collections(
    client: &PipelineClient,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let collections = Catalog::from_config(client, config).collections().await?;
    print_json(&collections)
}

/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_collection(
    client: &PipelineClient,
    config: &AppConfig,
    name: &str,
) -> anyhow::Result<()> {
    let products = Catalog::from_config(client, config)
        .products_by_collection(name)
        .await?;
    if products.is_empty() {
        tracing::warn!(collection = name, "collection has no visible products");
    }
    print_json(&products)
}

/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_categories(
    client: &PipelineClient,
    config: &AppConfig,
    tree: bool,
) -> anyhow::Result<()> {
    let categories = Catalog::from_config(client, config).categories().await?;
    if tree {
        print_json(&build_category_tree(categories))
    } else {
        print_json(&categories)
    }
}

/// # Errors
///
/// Returns an error if the favorites file cannot be read.
pub(crate) fn run_favorites_list(file: &Path) -> anyhow::Result<()> {
    let favorites = Favorites::load(file)?;
    print_json(&favorites)
}

/// Fetches the product so the stored snapshot is current, then adds it.
///
/// # Errors
///
/// Returns an error if the product does not exist or the file cannot be
/// read or written.
pub(crate) async fn run_favorites_add(
    client: &PipelineClient,
    config: &AppConfig,
    file: &Path,
    id: &str,
) -> anyhow::Result<()> {
    let product = Catalog::from_config(client, config)
        .product_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product '{id}' not found"))?;

    let mut favorites = Favorites::load(file)?;
    if favorites.add(product) {
        favorites.save(file)?;
    } else {
        tracing::info!(product_id = id, "already a favorite");
    }
    print_json(&favorites)
}

/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub(crate) fn run_favorites_remove(file: &Path, id: &str) -> anyhow::Result<()> {
    let mut favorites = Favorites::load(file)?;
    if favorites.remove(id).is_some() {
        favorites.save(file)?;
    } else {
        tracing::info!(product_id = id, "not a favorite");
    }
    print_json(&favorites)
}

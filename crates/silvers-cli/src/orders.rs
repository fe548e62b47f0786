//! Order history and checkout command handlers.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use silvers_checkout::{
    find_order, recent_orders, Cart, CheckoutIntent, CheckoutSettings, CustomerDetails,
    OrderAssembler,
};
use silvers_core::{AppConfig, LineKeying, OptionSelection, Product};
use silvers_pipeline::{Catalog, PipelineClient};

use crate::print_json;

/// One line of a cart file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct CartFileLine {
    pub(crate) product_id: String,
    #[serde(default = "default_quantity")]
    pub(crate) quantity: u32,
    /// Option ids, resolved against the product's own options.
    #[serde(default)]
    pub(crate) options: Vec<String>,
}

fn default_quantity() -> u32 {
    1
}

pub(crate) fn parse_cart_file(raw: &str) -> anyhow::Result<Vec<CartFileLine>> {
    let lines: Vec<CartFileLine> =
        serde_json::from_str(raw).context("cart file must be a JSON list of lines")?;
    if lines.is_empty() {
        anyhow::bail!("cart file has no lines");
    }
    Ok(lines)
}

/// Resolves option ids against `product`. Unknown ids are an error rather
/// than silently dropped.
pub(crate) fn selection_for(
    product: &Product,
    option_ids: &[String],
) -> anyhow::Result<OptionSelection> {
    option_ids
        .iter()
        .map(|id| {
            product.option(id).cloned().ok_or_else(|| {
                anyhow::anyhow!("product '{}' has no option '{id}'", product.id)
            })
        })
        .collect()
}

/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_orders(client: &PipelineClient, limit: u32) -> anyhow::Result<()> {
    let orders = recent_orders(client, limit).await?;
    print_json(&orders)
}

/// # Errors
///
/// Returns an error if the query fails or no order has this reference.
pub(crate) async fn run_order(client: &PipelineClient, reference: &str) -> anyhow::Result<()> {
    let order = find_order(client, reference)
        .await?
        .ok_or_else(|| anyhow::anyhow!("order '{reference}' not found"))?;
    print_json(&order)
}

/// Prints the totals the cart in `cart_path` would be charged. Nothing is
/// written.
///
/// # Errors
///
/// Returns an error if the cart file is unreadable or a product or option
/// does not exist.
pub(crate) async fn run_quote(
    client: &PipelineClient,
    config: &AppConfig,
    cart_path: &Path,
) -> anyhow::Result<()> {
    let raw_cart = std::fs::read_to_string(cart_path)
        .with_context(|| format!("failed to read cart file {}", cart_path.display()))?;
    let lines = parse_cart_file(&raw_cart)?;
    let cart = build_cart(client, config, config.cart_keying, &lines).await?;

    let assembler = OrderAssembler::new(client, CheckoutSettings::from_config(config));
    print_json(&assembler.quote(&cart))
}

/// Builds a cart from `cart_path`, validates the customer in `customer_path`
/// and places the order.
///
/// # Errors
///
/// Returns an error if either file is unreadable, a product or option does
/// not exist, or the order cannot be placed.
pub(crate) async fn run_checkout(
    client: &PipelineClient,
    config: &AppConfig,
    cart_path: &Path,
    customer_path: &Path,
    reference: Option<String>,
) -> anyhow::Result<()> {
    let raw_cart = std::fs::read_to_string(cart_path)
        .with_context(|| format!("failed to read cart file {}", cart_path.display()))?;
    let raw_customer = std::fs::read_to_string(customer_path)
        .with_context(|| format!("failed to read customer file {}", customer_path.display()))?;

    let lines = parse_cart_file(&raw_cart)?;
    let customer: CustomerDetails =
        serde_json::from_str(&raw_customer).context("customer file is not valid JSON")?;

    let mut cart = build_cart(client, config, config.cart_keying, &lines).await?;

    let intent = match reference {
        Some(reference) => CheckoutIntent::with_reference(reference),
        None => CheckoutIntent::new(),
    };
    tracing::info!(
        reference = intent.reference(),
        lines = cart.len(),
        "placing order"
    );

    let assembler = OrderAssembler::new(client, CheckoutSettings::from_config(config));
    let placed = assembler
        .place_order(&mut cart, &customer, &intent)
        .await
        .with_context(|| format!("order {} was not placed", intent.reference()))?;
    print_json(&placed)
}

async fn build_cart(
    client: &PipelineClient,
    config: &AppConfig,
    keying: LineKeying,
    lines: &[CartFileLine],
) -> anyhow::Result<Cart> {
    let catalog = Catalog::from_config(client, config);
    let mut cart = Cart::new(keying);
    for line in lines {
        let product = catalog
            .product_by_id(&line.product_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("product '{}' not found", line.product_id))?;
        let selection = selection_for(&product, &line.options)?;
        cart.add_item(product, line.quantity, selection);
    }
    Ok(cart)
}

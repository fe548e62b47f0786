//! Catalog fetches: products, collections and categories.

use silvers_core::{AppConfig, Category, Collection, Product};

use crate::client::PipelineClient;
use crate::decode::Record;
use crate::error::PipelineError;
use crate::normalize::{normalize_category, normalize_collection, ProductMapper};
use crate::types::{Statement, Value};

/// Publish states visible in the storefront.
const VISIBLE_STATES: [&str; 2] = ["published", "draft"];

const FEATURED_LIMIT: i64 = 10;

/// Read-only catalog queries over a borrowed [`PipelineClient`].
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    client: &'a PipelineClient,
    mapper: ProductMapper,
}

impl<'a> Catalog<'a> {
    #[must_use]
    pub fn new(client: &'a PipelineClient, mapper: ProductMapper) -> Self {
        Self { client, mapper }
    }

    /// A catalog using the placeholder image from `config`.
    #[must_use]
    pub fn from_config(client: &'a PipelineClient, config: &AppConfig) -> Self {
        Self::new(client, ProductMapper::new(config.placeholder_image.clone()))
    }

    /// All visible products.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn products(&self) -> Result<Vec<Product>, PipelineError> {
        let stmt = Statement::with_args(
            "SELECT * FROM products WHERE publish IN (?, ?)",
            visible_args(),
        );
        self.fetch_products(stmt).await
    }

    /// Up to ten visible products flagged as featured.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn featured_products(&self) -> Result<Vec<Product>, PipelineError> {
        let mut args = vec![Value::from(true)];
        args.extend(visible_args());
        args.push(Value::from(FEATURED_LIMIT));
        let stmt = Statement::with_args(
            "SELECT * FROM products WHERE featured = ? AND publish IN (?, ?) LIMIT ?",
            args,
        );
        self.fetch_products(stmt).await
    }

    /// One product by id, or `None` when no row matches.
    ///
    /// Numeric ids bind as integers so they compare against the integer
    /// primary key; anything else binds as text and simply matches nothing.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn product_by_id(&self, id: &str) -> Result<Option<Product>, PipelineError> {
        let stmt = Statement::with_args(
            "SELECT * FROM products WHERE id = ? LIMIT 1",
            vec![id_arg(id)],
        );
        Ok(self.fetch_products(stmt).await?.into_iter().next())
    }

    /// Visible products in the named collection, ordered by title.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn products_by_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<Product>, PipelineError> {
        let mut args = vec![Value::from(collection)];
        args.extend(visible_args());
        let stmt = Statement::with_args(
            "SELECT * FROM products WHERE collection = ? AND publish IN (?, ?) ORDER BY title ASC",
            args,
        );
        self.fetch_products(stmt).await
    }

    /// All collections, ordered by name.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn collections(&self) -> Result<Vec<Collection>, PipelineError> {
        let rows = self
            .client
            .query(Statement::new("SELECT * FROM collections ORDER BY name ASC"))
            .await?;
        Ok(rows.iter().map(normalize_collection).collect())
    }

    /// One collection by id, or `None` when no row matches.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn collection_by_id(&self, id: &str) -> Result<Option<Collection>, PipelineError> {
        let rows = self
            .client
            .query(Statement::with_args(
                "SELECT * FROM collections WHERE id = ? LIMIT 1",
                vec![id_arg(id)],
            ))
            .await?;
        Ok(rows.first().map(normalize_collection))
    }

    /// All categories, ordered by name. Use
    /// [`silvers_core::build_category_tree`] to nest them.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn categories(&self) -> Result<Vec<Category>, PipelineError> {
        let rows = self
            .client
            .query(Statement::new("SELECT * FROM categories ORDER BY name ASC"))
            .await?;
        Ok(rows.iter().map(normalize_category).collect())
    }

    async fn fetch_products(&self, stmt: Statement) -> Result<Vec<Product>, PipelineError> {
        let rows: Vec<Record> = self.client.query(stmt).await?;
        Ok(rows.iter().map(|r| self.mapper.map_product(r)).collect())
    }
}

fn visible_args() -> Vec<Value> {
    VISIBLE_STATES.iter().map(|s| Value::from(*s)).collect()
}

fn id_arg(id: &str) -> Value {
    let trimmed = id.trim();
    trimmed
        .parse::<i64>()
        .map_or_else(|_| Value::from(trimmed), Value::from)
}

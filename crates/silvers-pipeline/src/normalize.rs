//! Mapping from decoded [`Record`]s to catalog entities.
//!
//! ## Observed `products` columns
//!
//! | column        | wire type | notes                                                    |
//! |---------------|-----------|----------------------------------------------------------|
//! | `id`          | integer   | becomes the string product id                            |
//! | `title`       | text      | product name                                             |
//! | `excerpt`     | text      | preferred description; falls back to `notes`             |
//! | `price`       | float     | list price                                               |
//! | `saleprice`   | float     | `0` when no sale is running                              |
//! | `image`       | text      | primary image, may be empty                              |
//! | `medias`      | text      | JSON array of gallery image URLs                         |
//! | `options`     | text      | JSON array of `{id,title,value,identifierType,identifierValue}` |
//! | `metafields`  | text      | JSON object of specification name → value                |
//! | `tags`        | text      | comma-separated                                          |
//! | `stock`       | integer   | units on hand                                            |
//!
//! The three JSON columns are parsed defensively: malformed JSON yields the
//! field's empty value instead of an error, so one bad row never hides the
//! rest of the catalog.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use silvers_core::{Category, Collection, Product, ProductOption};

use crate::decode::{Cell, Record};

/// Maps product rows, filling in the configured placeholder image.
#[derive(Debug, Clone)]
pub struct ProductMapper {
    placeholder_image: String,
}

impl ProductMapper {
    #[must_use]
    pub fn new(placeholder_image: impl Into<String>) -> Self {
        Self {
            placeholder_image: placeholder_image.into(),
        }
    }

    /// Maps one `products` row into a [`Product`].
    #[must_use]
    pub fn map_product(&self, record: &Record) -> Product {
        let id = record.text("id");

        let mut images: Vec<String> = record.non_blank("image").into_iter().collect();
        images.extend(parse_gallery(&record.text("medias"), &id));
        if images.is_empty() {
            images.push(self.placeholder_image.clone());
        }

        let (price, original_price) =
            resolve_price(record.decimal("price"), record.decimal("saleprice"));

        let category = record.text("category");
        let category_id = slugify(&category);
        let stock_quantity = record.int("stock");

        Product {
            name: record.text("title"),
            description: record
                .non_blank("excerpt")
                .or_else(|| record.non_blank("notes"))
                .unwrap_or_default(),
            price,
            original_price,
            images,
            category,
            category_id,
            collection: record.non_blank("collection"),
            brand: record
                .non_blank("brand")
                .unwrap_or_else(|| "Unknown".to_string()),
            vendor: record.non_blank("vendor"),
            rating: record.get("rating").and_then(rating_from),
            review_count: record
                .get("reviewcount")
                .and_then(|c| u32::try_from(c.as_i64()).ok()),
            in_stock: stock_quantity > 0,
            stock_quantity,
            tags: split_tags(&record.text("tags")),
            options: parse_options(&record.text("options"), &id),
            specifications: parse_specifications(&record.text("metafields"), &id),
            created_at: record.text("createdat"),
            updated_at: record.text("updatedat"),
            id,
        }
    }
}

/// Maps one `collections` row.
#[must_use]
pub fn normalize_collection(record: &Record) -> Collection {
    Collection {
        id: record.text("id"),
        name: record.text("name"),
        image: record.non_blank("image"),
        notes: record.non_blank("notes"),
    }
}

/// Maps one `categories` row. A parent id of `0` or blank means top-level.
#[must_use]
pub fn normalize_category(record: &Record) -> Category {
    let parent_id = ["parent_id", "parentid"]
        .iter()
        .find_map(|col| record.get(col))
        .filter(|cell| !cell.is_blank() && !matches!(cell, Cell::Integer(0)))
        .map(|cell| cell.as_text().trim().to_string());

    Category {
        id: record.text("id"),
        name: record.text("name"),
        image: record.non_blank("image"),
        description: record
            .non_blank("description")
            .or_else(|| record.non_blank("notes")),
        parent_id,
    }
}

/// Effective price and the retained list price.
///
/// A sale applies only when it is strictly between zero and the list price.
/// Negative list prices clamp to zero.
#[must_use]
pub fn resolve_price(list: Decimal, sale: Decimal) -> (Decimal, Option<Decimal>) {
    let list = list.max(Decimal::ZERO);
    if sale > Decimal::ZERO && sale < list {
        (sale, Some(list))
    } else {
        (list, None)
    }
}

/// Lowercases and hyphenates a category name: `"Silver  Rings"` → `"silver-rings"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Splits a comma-separated tag string, trimming and dropping empties.
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

fn rating_from(cell: &Cell) -> Option<f64> {
    let rating = cell.as_f64();
    (rating > 0.0).then(|| (rating.min(5.0) * 10.0).round() / 10.0)
}

fn parse_json<T: serde::de::DeserializeOwned>(raw: &str, field: &str, product_id: &str) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(product_id, field, error = %e, "ignoring malformed JSON column");
            None
        }
    }
}

/// Gallery URLs from the `medias` column. Entries may be plain strings or
/// objects carrying a `url`/`src` key; blank entries are dropped.
fn parse_gallery(raw: &str, product_id: &str) -> Vec<String> {
    let Some(serde_json::Value::Array(items)) = parse_json(raw, "medias", product_id) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(obj) => obj
                .get("url")
                .or_else(|| obj.get("src"))
                .and_then(serde_json::Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Options from the `options` column.
///
/// Options without an id get a positional one (`"{product_id}-opt-{n}"`) so
/// selections stay stable across fetches.
fn parse_options(raw: &str, product_id: &str) -> Vec<ProductOption> {
    let Some(serde_json::Value::Array(items)) = parse_json(raw, "options", product_id) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let obj = item.as_object()?;
            let field = |key: &str| -> Option<String> {
                match obj.get(key)? {
                    serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                }
            };
            let value = field("value").unwrap_or_default();
            Some(ProductOption {
                id: field("id").unwrap_or_else(|| format!("{product_id}-opt-{idx}")),
                title: field("title").or_else(|| field("group")).unwrap_or_default(),
                identifier_value: field("identifierValue").unwrap_or_else(|| value.clone()),
                identifier_type: field("identifierType").unwrap_or_else(|| "text".to_string()),
                value,
            })
        })
        .collect()
}

/// Specifications from the `metafields` JSON object. Non-string values keep
/// their JSON text; nulls are dropped.
fn parse_specifications(raw: &str, product_id: &str) -> BTreeMap<String, String> {
    let Some(serde_json::Value::Object(map)) = parse_json(raw, "metafields", product_id) else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

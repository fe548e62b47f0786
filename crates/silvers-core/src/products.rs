use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A storefront product, mapped from one row of the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Remote row id, stored as a string.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Effective selling price: the sale price when one applies, else the list price.
    pub price: Decimal,
    /// List price, present only while a sale price undercuts it.
    pub original_price: Option<Decimal>,
    /// Primary image first, then gallery images. Never empty.
    pub images: Vec<String>,
    pub category: String,
    /// Slug form of `category`, e.g. `"Silver Rings"` → `"silver-rings"`.
    pub category_id: String,
    pub collection: Option<String>,
    pub brand: String,
    pub vendor: Option<String>,
    /// `None` when no authoritative review data exists.
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub in_stock: bool,
    pub stock_quantity: i64,
    pub tags: Vec<String>,
    pub options: Vec<ProductOption>,
    pub specifications: BTreeMap<String, String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// Returns `true` when a sale price is active.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.original_price.is_some()
    }

    /// Returns the option with the given id, if the product has one.
    #[must_use]
    pub fn option(&self, option_id: &str) -> Option<&ProductOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// A selectable variant option, e.g. `Size = 7`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: String,
    /// Group label the option belongs to, e.g. `"Size"`.
    pub title: String,
    pub value: String,
    /// Human-readable form of `value`; equals `value` when the row gave none.
    pub identifier_value: String,
    pub identifier_type: String,
}

impl ProductOption {
    /// The string shown to shoppers for this option.
    #[must_use]
    pub fn display_value(&self) -> &str {
        if self.identifier_value.is_empty() {
            &self.value
        } else {
            &self.identifier_value
        }
    }
}

/// Options sharing one group title, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup<'a> {
    pub title: &'a str,
    pub options: Vec<&'a ProductOption>,
}

/// Groups options by their title, preserving the order in which each group
/// first appears.
#[must_use]
pub fn group_options(options: &[ProductOption]) -> Vec<OptionGroup<'_>> {
    let mut groups: Vec<OptionGroup<'_>> = Vec::new();
    for option in options {
        match groups.iter_mut().find(|g| g.title == option.title) {
            Some(group) => group.options.push(option),
            None => groups.push(OptionGroup {
                title: &option.title,
                options: vec![option],
            }),
        }
    }
    groups
}

/// A shopper's choice of at most one option per group, keyed by group title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSelection(BTreeMap<String, ProductOption>);

impl OptionSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `option`, replacing any earlier choice in the same group.
    pub fn select(&mut self, option: ProductOption) {
        self.0.insert(option.title.clone(), option);
    }

    #[must_use]
    pub fn get(&self, group: &str) -> Option<&ProductOption> {
        self.0.get(group)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductOption> {
        self.0.values()
    }

    /// Joined display values, e.g. `"7, Oxidised"`. Empty when nothing is selected.
    #[must_use]
    pub fn variant_title(&self) -> String {
        self.0
            .values()
            .map(ProductOption::display_value)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Stable identity of the selection: sorted option ids joined with `+`.
    #[must_use]
    pub fn normalized_key(&self) -> String {
        let mut ids: Vec<&str> = self.0.values().map(|o| o.id.as_str()).collect();
        ids.sort_unstable();
        ids.join("+")
    }
}

impl FromIterator<ProductOption> for OptionSelection {
    fn from_iter<I: IntoIterator<Item = ProductOption>>(iter: I) -> Self {
        let mut selection = Self::new();
        for option in iter {
            selection.select(option);
        }
        selection
    }
}

//! The in-memory cart.
//!
//! Lines are identified by a string key. With [`LineKeying::Product`] the key
//! is the product id, so adding the same product again merges into one line
//! and the most recent non-empty option selection wins. With
//! [`LineKeying::Variant`] each distinct option selection gets its own line.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use silvers_core::{LineKeying, OptionSelection, Product};

/// Largest quantity a single line can hold. Adds and updates clamp to it.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// One line of the cart: a product snapshot and a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub key: String,
    pub product: Product,
    pub quantity: u32,
    pub selected_options: OptionSelection,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product.price
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Joined display values of the selected options, `""` when none.
    #[must_use]
    pub fn variant_title(&self) -> String {
        self.selected_options.variant_title()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    keying: LineKeying,
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new(keying: LineKeying) -> Self {
        Self {
            keying,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn keying(&self) -> LineKeying {
        self.keying
    }

    /// The key a line for `product_id` with `options` would have.
    #[must_use]
    pub fn line_key(&self, product_id: &str, options: &OptionSelection) -> String {
        match self.keying {
            LineKeying::Variant if !options.is_empty() => {
                format!("{product_id}#{}", options.normalized_key())
            }
            LineKeying::Product | LineKeying::Variant => product_id.to_string(),
        }
    }

    /// Adds `quantity` units, merging into an existing line with the same key.
    ///
    /// A zero quantity adds one unit and the merged quantity is clamped to
    /// [`MAX_LINE_QUANTITY`]. Returns the key of the affected line.
    pub fn add_item(
        &mut self,
        product: Product,
        quantity: u32,
        options: OptionSelection,
    ) -> String {
        let quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
        let key = self.line_key(&product.id, &options);

        if let Some(line) = self.items.iter_mut().find(|l| l.key == key) {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
            if !options.is_empty() {
                line.selected_options = options;
            }
            tracing::debug!(key = %key, quantity = line.quantity, "merged cart line");
        } else {
            tracing::debug!(key = %key, quantity, "added cart line");
            self.items.push(CartItem {
                key: key.clone(),
                product,
                quantity,
                selected_options: options,
                added_at: Utc::now(),
            });
        }
        key
    }

    /// Sets a line's quantity exactly, clamped to [`MAX_LINE_QUANTITY`]. Zero
    /// or less removes the line.
    ///
    /// Returns `false` when no line has this key.
    pub fn set_quantity(&mut self, key: &str, quantity: i64) -> bool {
        let Some(idx) = self.position(key) else {
            return false;
        };
        if quantity <= 0 {
            let removed = self.items.remove(idx);
            tracing::debug!(key = %removed.key, "removed cart line");
        } else {
            self.items[idx].quantity = u32::try_from(quantity)
                .unwrap_or(u32::MAX)
                .min(MAX_LINE_QUANTITY);
        }
        true
    }

    /// Adds one unit to a line.
    pub fn increment(&mut self, key: &str) -> bool {
        match self.items.iter_mut().find(|l| l.key == key) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Removes one unit from a line, dropping the line at zero.
    pub fn decrement(&mut self, key: &str) -> bool {
        let Some(idx) = self.position(key) else {
            return false;
        };
        let next = i64::from(self.items[idx].quantity) - 1;
        self.set_quantity(key, next)
    }

    /// Removes a line. Returns the removed line, if any.
    pub fn remove_item(&mut self, key: &str) -> Option<CartItem> {
        self.position(key).map(|idx| self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CartItem> {
        self.items.iter().find(|l| l.key == key)
    }

    /// `true` if any line holds this product, whatever its options.
    #[must_use]
    pub fn contains_product(&self, product_id: &str) -> bool {
        self.items.iter().any(|l| l.product.id == product_id)
    }

    #[must_use]
    pub fn lines(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of unit price × quantity across lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|l| l.key == key)
    }
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;

//! The shopper's favorites list, persisted as a JSON file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use silvers_core::Product;

use crate::error::CheckoutError;

/// Ordered product snapshots, at most one per product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    items: Vec<Product>,
}

impl Favorites {
    /// Reads the list from `path`. A missing file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Favorites`] if the file exists but cannot be
    /// read or does not hold a product list.
    pub fn load(path: &Path) -> Result<Self, CheckoutError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(favorites_error(path, &e)),
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut favorites: Self =
            serde_json::from_str(&raw).map_err(|e| favorites_error(path, &e))?;
        favorites.dedup();
        Ok(favorites)
    }

    /// Writes the list to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Favorites`] on any I/O or encoding failure.
    pub fn save(&self, path: &Path) -> Result<(), CheckoutError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| favorites_error(path, &e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| favorites_error(path, &e))?;
        fs::write(path, json).map_err(|e| favorites_error(path, &e))
    }

    /// Adds `product` at the end. Returns `false` if it was already present.
    pub fn add(&mut self, product: Product) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.items.push(product);
        true
    }

    pub fn remove(&mut self, product_id: &str) -> Option<Product> {
        let idx = self.items.iter().position(|p| p.id == product_id)?;
        Some(self.items.remove(idx))
    }

    /// Adds or removes `product`. Returns `true` if it is now a favorite.
    pub fn toggle(&mut self, product: Product) -> bool {
        if self.remove(&product.id).is_some() {
            false
        } else {
            self.add(product)
        }
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|p| p.id == product_id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn dedup(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.items.retain(|p| seen.insert(p.id.clone()));
    }
}

fn favorites_error(path: &Path, err: &dyn std::fmt::Display) -> CheckoutError {
    CheckoutError::Favorites {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

//! In-memory catalog filtering and sorting for the shop listing.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::products::Product;

/// Sort order for a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recently created first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Highest rating first; unrated products last.
    Rating,
    /// Most reviews first; products without review counts last.
    Popular,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "rating" => Ok(Self::Rating),
            "popular" => Ok(Self::Popular),
            other => Err(format!("unknown sort key \"{other}\"")),
        }
    }
}

/// Filters applied to a product listing. Every unset field matches everything.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub brands: Vec<String>,
    pub min_rating: Option<f64>,
    pub in_stock: Option<bool>,
    pub sort: SortKey,
}

impl ProductQuery {
    /// Returns `true` when `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [
                &product.name,
                &product.description,
                &product.brand,
                &product.category,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if product.category.trim().to_lowercase() != category.trim().to_lowercase() {
                return false;
            }
        }

        if self.min_price.is_some_and(|min| product.price < min)
            || self.max_price.is_some_and(|max| product.price > max)
        {
            return false;
        }

        if !self.brands.is_empty() && !self.brands.contains(&product.brand) {
            return false;
        }

        if let Some(min) = self.min_rating {
            if !product.rating.is_some_and(|r| r >= min) {
                return false;
            }
        }

        self.in_stock.is_none_or(|wanted| product.in_stock == wanted)
    }

    /// Filters and sorts `products` into a new listing.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut result: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        result.sort_by(|a, b| self.compare(a, b));
        result
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self.sort {
            SortKey::PriceAsc => a.price.cmp(&b.price),
            SortKey::PriceDesc => b.price.cmp(&a.price),
            SortKey::Rating => descending_some_first(a.rating, b.rating, |x, y| {
                y.partial_cmp(&x).unwrap_or(Ordering::Equal)
            }),
            SortKey::Popular => descending_some_first(a.review_count, b.review_count, |x, y| y.cmp(&x)),
            // Timestamps are ISO-like strings, so lexical order is chronological.
            SortKey::Newest => b.created_at.cmp(&a.created_at),
        }
    }
}

fn descending_some_first<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn product(id: &str, price: i64, created_at: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Ring {id}"),
            description: "Sterling silver band".to_string(),
            price: Decimal::new(price, 0),
            original_price: None,
            images: vec!["https://img.example/1.jpg".to_string()],
            category: "Silver Rings".to_string(),
            category_id: "silver-rings".to_string(),
            collection: None,
            brand: "Unknown".to_string(),
            vendor: None,
            rating: None,
            review_count: None,
            in_stock: true,
            stock_quantity: 3,
            tags: Vec::new(),
            options: Vec::new(),
            specifications: BTreeMap::new(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn default_query_sorts_newest_first() {
        let products = vec![
            product("1", 10, "2025-01-01 10:00:00"),
            product("2", 20, "2025-03-01 10:00:00"),
        ];
        let listing = ProductQuery::default().apply(&products);
        assert_eq!(listing[0].id, "2");
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let products = vec![product("1", 10, "2025-01-01")];
        let query = ProductQuery {
            search: Some("STERLING".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(query.apply(&products).len(), 1);
    }

    #[test]
    fn category_match_ignores_case_and_whitespace() {
        let query = ProductQuery {
            category: Some("  silver rings ".to_string()),
            ..ProductQuery::default()
        };
        assert!(query.matches(&product("1", 10, "2025-01-01")));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let query = ProductQuery {
            min_price: Some(Decimal::new(10, 0)),
            max_price: Some(Decimal::new(20, 0)),
            sort: SortKey::PriceDesc,
            ..ProductQuery::default()
        };
        let products = vec![
            product("1", 10, "a"),
            product("2", 20, "b"),
            product("3", 21, "c"),
        ];
        let listing = query.apply(&products);
        let ids: Vec<&str> = listing.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn min_rating_excludes_unrated_products() {
        let mut rated = product("1", 10, "a");
        rated.rating = Some(4.5);
        let unrated = product("2", 10, "b");
        let query = ProductQuery {
            min_rating: Some(4.0),
            ..ProductQuery::default()
        };
        let listing = query.apply(&[rated, unrated]);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, "1");
    }

    #[test]
    fn rating_sort_puts_unrated_last() {
        let mut low = product("1", 10, "a");
        low.rating = Some(3.2);
        let mut high = product("2", 10, "b");
        high.rating = Some(4.8);
        let unrated = product("3", 10, "c");
        let query = ProductQuery {
            sort: SortKey::Rating,
            ..ProductQuery::default()
        };
        let listing = query.apply(&[unrated, low, high]);
        let ids: Vec<&str> = listing.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn in_stock_filter() {
        let mut sold_out = product("1", 10, "a");
        sold_out.in_stock = false;
        let query = ProductQuery {
            in_stock: Some(true),
            ..ProductQuery::default()
        };
        assert!(!query.matches(&sold_out));
    }

    #[test]
    fn sort_key_parses_known_values() {
        assert_eq!("price_asc".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert!("cheapest".parse::<SortKey>().is_err());
    }
}

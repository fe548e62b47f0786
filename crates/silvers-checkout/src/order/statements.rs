//! The rows an order writes and the SQL that writes them.

use rust_decimal::Decimal;
use serde::Serialize;
use silvers_pipeline::{Statement, Value};

use crate::cart::Cart;
use crate::totals::{OrderTotals, Pricing};
use crate::validate::CustomerDetails;

const HEADER_COLUMNS: &str = "referid, customerid, name, email, phone, status, fulfill, \
     currency, subtotal, total, tax, taxid, discount, shipping, shipaddrs, billaddrs";

const ITEM_COLUMNS: &str = "orderid, title, varianttitle, sku, qty, price, total, taxrate, taxamt";

/// Status written on new headers, for both `status` and `fulfill`.
const PENDING: &str = "pending";

/// Everything an order writes, frozen from the cart at submission time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraft {
    pub reference: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub currency: String,
    pub totals: OrderTotals,
    pub tax_identifier: Option<String>,
    pub shipping_address: String,
    pub billing_address: String,
    pub lines: Vec<DraftLine>,
}

/// Denormalized snapshot of one cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftLine {
    pub title: String,
    pub variant_title: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
}

impl OrderDraft {
    #[must_use]
    pub fn new(
        reference: &str,
        customer: &CustomerDetails,
        cart: &Cart,
        pricing: &Pricing,
        currency: &str,
    ) -> Self {
        let lines = cart
            .lines()
            .iter()
            .map(|item| {
                let line_total = item.line_total();
                DraftLine {
                    title: item.product.name.clone(),
                    variant_title: item.variant_title(),
                    sku: item.product.id.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price(),
                    line_total,
                    tax_rate: pricing.tax.rate(),
                    tax_amount: pricing.tax.tax_for(line_total),
                }
            })
            .collect();

        Self {
            reference: reference.to_string(),
            name: customer.name.trim().to_string(),
            email: customer.email.trim().to_string(),
            phone: customer.phone.as_deref().unwrap_or_default().trim().to_string(),
            currency: currency.to_string(),
            totals: pricing.totals(cart),
            tax_identifier: customer.normalized_tax_id(),
            shipping_address: customer.shipping_line(),
            billing_address: customer.billing_line(),
            lines,
        }
    }

    /// Header insert that writes nothing if the reference already exists.
    #[must_use]
    pub fn header_insert(&self) -> Statement {
        let placeholders = vec!["?"; 16].join(", ");
        let sql = format!(
            "INSERT INTO orders ({HEADER_COLUMNS}) SELECT {placeholders} \
             WHERE NOT EXISTS (SELECT 1 FROM orders WHERE referid = ?)"
        );
        let t = &self.totals;
        let args = vec![
            Value::from(self.reference.as_str()),
            Value::Null,
            Value::from(self.name.as_str()),
            Value::from(self.email.as_str()),
            Value::from(self.phone.as_str()),
            Value::from(PENDING),
            Value::from(PENDING),
            Value::from(self.currency.as_str()),
            Value::from(t.subtotal),
            Value::from(t.total),
            Value::from(t.tax_amount),
            Value::from(self.tax_identifier.as_deref()),
            Value::from(t.discount),
            Value::from(t.shipping),
            Value::from(self.shipping_address.as_str()),
            Value::from(self.billing_address.as_str()),
            Value::from(self.reference.as_str()),
        ];
        Statement::with_args(sql, args)
    }

    /// Item insert against a known header id.
    #[must_use]
    pub fn item_insert(order_id: i64, line: &DraftLine) -> Statement {
        let mut args = vec![Value::from(order_id)];
        args.extend(line_args(line));
        Statement::with_args(
            format!("INSERT INTO orderitems ({ITEM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            args,
        )
    }

    /// Item insert that finds its header by reference code, for use inside a
    /// batch where the header id is not known yet.
    ///
    /// `changes() = 1` ties each insert to the statement before it: if the
    /// header insert was skipped, so is every item.
    #[must_use]
    pub fn item_insert_by_reference(&self, line: &DraftLine) -> Statement {
        let mut args = line_args(line);
        args.push(Value::from(self.reference.as_str()));
        Statement::with_args(
            format!(
                "INSERT INTO orderitems ({ITEM_COLUMNS}) \
                 SELECT id, ?, ?, ?, ?, ?, ?, ?, ? FROM orders \
                 WHERE referid = ? AND changes() = 1"
            ),
            args,
        )
    }
}

fn line_args(line: &DraftLine) -> Vec<Value> {
    vec![
        Value::from(line.title.as_str()),
        Value::from(line.variant_title.as_str()),
        Value::from(line.sku.as_str()),
        Value::from(line.quantity),
        Value::from(line.unit_price),
        Value::from(line.line_total),
        Value::from(line.tax_rate),
        Value::from(line.tax_amount),
    ]
}

#[must_use]
pub fn find_header(reference: &str) -> Statement {
    Statement::with_args(
        "SELECT id FROM orders WHERE referid = ? LIMIT 1",
        vec![Value::from(reference)],
    )
}

#[must_use]
pub fn count_items(order_id: i64) -> Statement {
    Statement::with_args(
        "SELECT COUNT(*) AS items FROM orderitems WHERE orderid = ?",
        vec![Value::from(order_id)],
    )
}

#[must_use]
pub fn delete_items(order_id: i64) -> Statement {
    Statement::with_args(
        "DELETE FROM orderitems WHERE orderid = ?",
        vec![Value::from(order_id)],
    )
}

#[must_use]
pub fn delete_header(order_id: i64) -> Statement {
    Statement::with_args("DELETE FROM orders WHERE id = ?", vec![Value::from(order_id)])
}

#[must_use]
pub fn delete_items_by_reference(reference: &str) -> Statement {
    Statement::with_args(
        "DELETE FROM orderitems WHERE orderid IN (SELECT id FROM orders WHERE referid = ?)",
        vec![Value::from(reference)],
    )
}

#[must_use]
pub fn delete_header_by_reference(reference: &str) -> Statement {
    Statement::with_args(
        "DELETE FROM orders WHERE referid = ?",
        vec![Value::from(reference)],
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use silvers_core::{OptionSelection, Product, ProductOption};

    use super::*;
    use crate::totals::TaxPolicy;
    use crate::validate::Address;

    fn ring() -> Product {
        Product {
            id: "17".into(),
            name: "Filigree Ring".into(),
            description: String::new(),
            price: Decimal::new(2450, 2),
            original_price: None,
            images: vec!["https://img.example/r.jpg".into()],
            category: "Rings".into(),
            category_id: "rings".into(),
            collection: None,
            brand: "Silvers".into(),
            vendor: None,
            rating: None,
            review_count: None,
            in_stock: true,
            stock_quantity: 4,
            tags: Vec::new(),
            options: Vec::new(),
            specifications: BTreeMap::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: " Asha ".into(),
            email: "asha@example.com".into(),
            phone: None,
            shipping_address: Some(Address {
                street: "9 Lake View".into(),
                city: "Pune".into(),
                ..Address::default()
            }),
            billing_address: None,
            tax_id: Some("27aapfu0939f1zv".into()),
        }
    }

    fn draft(pricing: &Pricing) -> OrderDraft {
        let mut cart = Cart::default();
        let selection: OptionSelection = [ProductOption {
            id: "s7".into(),
            title: "Size".into(),
            value: "7".into(),
            identifier_value: "US 7".into(),
            identifier_type: "text".into(),
        }]
        .into_iter()
        .collect();
        cart.add_item(ring(), 2, selection);
        OrderDraft::new("ORD-1-abcdefghi", &customer(), &cart, pricing, "USD")
    }

    #[test]
    fn draft_snapshots_lines_and_customer() {
        let d = draft(&Pricing::default());
        assert_eq!(d.name, "Asha");
        assert_eq!(d.phone, "");
        assert_eq!(d.shipping_address, "9 Lake View, Pune");
        assert_eq!(d.billing_address, "9 Lake View, Pune");
        assert_eq!(d.tax_identifier.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(d.totals.subtotal, Decimal::new(4900, 2));
        assert_eq!(d.totals.shipping, Decimal::new(999, 2));

        let line = &d.lines[0];
        assert_eq!(line.sku, "17");
        assert_eq!(line.variant_title, "US 7");
        assert_eq!(line.line_total, Decimal::new(4900, 2));
        assert_eq!(line.tax_amount, Decimal::ZERO);
    }

    #[test]
    fn header_insert_binds_every_column_plus_reference_guard() {
        let stmt = draft(&Pricing::default()).header_insert();
        assert!(stmt.sql.starts_with("INSERT INTO orders ("));
        assert!(stmt.sql.contains("WHERE NOT EXISTS"));
        assert_eq!(stmt.sql.matches('?').count(), stmt.args.len());
        assert_eq!(stmt.args[0], Value::text("ORD-1-abcdefghi"));
        assert_eq!(stmt.args[1], Value::Null);
        assert_eq!(stmt.args[11], Value::text("27AAPFU0939F1ZV"));
        assert_eq!(stmt.args[16], Value::text("ORD-1-abcdefghi"));
    }

    #[test]
    fn tax_amount_and_identifier_use_separate_columns() {
        let pricing = Pricing {
            tax: TaxPolicy::Percentage(Decimal::new(10, 2)),
            ..Pricing::default()
        };
        let d = draft(&pricing);
        let stmt = d.header_insert();
        assert_eq!(stmt.args[10], Value::from(Decimal::new(490, 2)));
        assert_eq!(stmt.args[11], Value::text("27AAPFU0939F1ZV"));
        assert_eq!(d.lines[0].tax_rate, Decimal::new(10, 2));
    }

    #[test]
    fn item_inserts_are_fully_parameterized() {
        let d = draft(&Pricing::default());
        let by_id = OrderDraft::item_insert(501, &d.lines[0]);
        assert_eq!(by_id.sql.matches('?').count(), by_id.args.len());
        assert_eq!(by_id.args[0], Value::from(501_i64));
        assert_eq!(by_id.args[4], Value::from(2_u32));

        let by_ref = d.item_insert_by_reference(&d.lines[0]);
        assert_eq!(by_ref.sql.matches('?').count(), by_ref.args.len());
        assert_eq!(by_ref.args.last(), Some(&Value::text("ORD-1-abcdefghi")));
    }

    #[test]
    fn cleanup_by_reference_removes_items_before_header() {
        let items = delete_items_by_reference("ORD-1-abcdefghi");
        assert!(items.sql.starts_with("DELETE FROM orderitems"));
        assert!(items.sql.contains("SELECT id FROM orders WHERE referid = ?"));
        assert_eq!(items.args, vec![Value::text("ORD-1-abcdefghi")]);

        let header = delete_header_by_reference("ORD-1-abcdefghi");
        assert_eq!(header.args, items.args);
    }

    #[test]
    fn written_columns_match_the_schema_check() {
        let split = |cols: &str| cols.split(", ").map(str::to_string).collect::<Vec<_>>();
        let [(orders, header), (orderitems, items)] = silvers_pipeline::ORDER_COLUMNS;
        assert_eq!(orders, "orders");
        assert_eq!(orderitems, "orderitems");
        assert_eq!(split(HEADER_COLUMNS), header.to_vec());
        assert_eq!(split(ITEM_COLUMNS), items.to_vec());
    }
}

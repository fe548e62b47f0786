//! Read-back of placed orders.

use rust_decimal::Decimal;
use serde::Serialize;
use silvers_pipeline::{PipelineClient, PipelineError, Record, Statement, Value};

/// One order header as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: i64,
    pub reference: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub fulfillment: String,
    pub currency: String,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax_amount: Decimal,
    pub tax_identifier: Option<String>,
    pub total: Decimal,
    pub shipping_address: String,
    pub created_at: Option<String>,
}

impl OrderSummary {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.int("id"),
            reference: record.text("referid"),
            name: record.text("name"),
            email: record.text("email"),
            status: record.text("status"),
            fulfillment: record.text("fulfill"),
            currency: record.text("currency"),
            subtotal: record.decimal("subtotal"),
            shipping: record.decimal("shipping"),
            tax_amount: record.decimal("tax"),
            tax_identifier: record.non_blank("taxid"),
            total: record.decimal("total"),
            shipping_address: record.text("shipaddrs"),
            created_at: record
                .non_blank("createdat")
                .or_else(|| record.non_blank("created_at")),
        }
    }
}

/// The latest `limit` orders, newest first.
///
/// # Errors
///
/// Propagates any [`PipelineError`] from the query.
pub async fn recent_orders(
    client: &PipelineClient,
    limit: u32,
) -> Result<Vec<OrderSummary>, PipelineError> {
    let rows = client
        .query(Statement::with_args(
            "SELECT * FROM orders ORDER BY id DESC LIMIT ?",
            vec![Value::from(limit)],
        ))
        .await?;
    Ok(rows.iter().map(OrderSummary::from_record).collect())
}

/// The order with this reference code, if any.
///
/// # Errors
///
/// Propagates any [`PipelineError`] from the query.
pub async fn find_order(
    client: &PipelineClient,
    reference: &str,
) -> Result<Option<OrderSummary>, PipelineError> {
    let rows = client
        .query(Statement::with_args(
            "SELECT * FROM orders WHERE referid = ? LIMIT 1",
            vec![Value::from(reference)],
        ))
        .await?;
    Ok(rows.first().map(OrderSummary::from_record))
}

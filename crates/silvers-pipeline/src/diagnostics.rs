//! Connection and schema checks used by the `doctor` command.

use crate::client::PipelineClient;
use crate::error::PipelineError;
use crate::types::Statement;

/// Tables an order write needs, with the columns it writes into each.
pub const ORDER_COLUMNS: [(&str, &[&str]); 2] = [
    (
        "orders",
        &[
            "referid",
            "customerid",
            "name",
            "email",
            "phone",
            "status",
            "fulfill",
            "currency",
            "subtotal",
            "total",
            "tax",
            "taxid",
            "discount",
            "shipping",
            "shipaddrs",
            "billaddrs",
        ],
    ),
    (
        "orderitems",
        &[
            "orderid",
            "title",
            "varianttitle",
            "sku",
            "qty",
            "price",
            "total",
            "taxrate",
            "taxamt",
        ],
    ),
];

/// Outcome of [`PipelineClient::order_tables_exist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCheck {
    pub tables: Vec<String>,
    /// Order tables that do not exist.
    pub missing: Vec<String>,
    /// Columns of existing order tables that an order write needs but the
    /// table lacks, as `table.column`.
    pub missing_columns: Vec<String>,
}

impl SchemaCheck {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty() && self.missing_columns.is_empty()
    }
}

/// Column names declared by a `CREATE TABLE` statement, lowercased and
/// unquoted. Table constraints (`PRIMARY KEY (...)`, `FOREIGN KEY ...`) are
/// skipped.
#[must_use]
pub fn column_names(create_sql: &str) -> Vec<String> {
    let Some(open) = create_sql.find('(') else {
        return Vec::new();
    };
    let Some(close) = create_sql.rfind(')') else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }

    let mut definitions = Vec::new();
    let mut depth = 0_u32;
    let mut start = open + 1;
    for (idx, ch) in create_sql[open + 1..close].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                definitions.push(&create_sql[start..open + 1 + idx]);
                start = open + 2 + idx;
            }
            _ => {}
        }
    }
    definitions.push(&create_sql[start..close]);

    definitions
        .into_iter()
        .filter_map(|def| def.split_whitespace().next())
        .map(|name| {
            name.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']' | '\''))
                .to_ascii_lowercase()
        })
        .filter(|name| {
            !name.is_empty()
                && !matches!(
                    name.as_str(),
                    "primary" | "foreign" | "unique" | "check" | "constraint"
                )
        })
        .collect()
}

impl PipelineClient {
    /// Round-trips `SELECT 1` and checks the answer.
    ///
    /// # Errors
    ///
    /// Propagates transport failures, and returns [`PipelineError::Protocol`]
    /// if the endpoint answers with something other than `1`.
    pub async fn ping(&self) -> Result<(), PipelineError> {
        let rows = self.query(Statement::new("SELECT 1 AS test")).await?;
        match rows.first().map(|r| r.int("test")) {
            Some(1) => {
                tracing::debug!(url = %self.url(), "pipeline ping ok");
                Ok(())
            }
            other => Err(PipelineError::protocol(
                "SELECT 1 AS test",
                format!("unexpected ping answer: {other:?}"),
            )),
        }
    }

    /// Names of every table in the remote database.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn table_names(&self) -> Result<Vec<String>, PipelineError> {
        let rows = self
            .query(Statement::new(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            ))
            .await?;
        Ok(rows.iter().filter_map(|r| r.non_blank("name")).collect())
    }

    /// `CREATE TABLE` text for one table, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the query.
    pub async fn table_schema(&self, table: &str) -> Result<Option<String>, PipelineError> {
        let rows = self
            .query(Statement::with_args(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?",
                vec![table.into()],
            ))
            .await?;
        Ok(rows.first().and_then(|r| r.non_blank("sql")))
    }

    /// Checks that the order tables exist and carry every column an order
    /// write needs.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the queries.
    pub async fn order_tables_exist(&self) -> Result<SchemaCheck, PipelineError> {
        let tables = self.table_names().await?;
        let mut missing = Vec::new();
        let mut missing_columns = Vec::new();

        for (table, required) in ORDER_COLUMNS {
            let Some(name) = tables.iter().find(|have| have.eq_ignore_ascii_case(table)) else {
                missing.push(table.to_string());
                continue;
            };
            let declared = self
                .table_schema(name)
                .await?
                .map(|sql| column_names(&sql))
                .unwrap_or_default();
            missing_columns.extend(
                required
                    .iter()
                    .filter(|col| !declared.iter().any(|d| d == *col))
                    .map(|col| format!("{table}.{col}")),
            );
        }

        if !missing.is_empty() {
            tracing::warn!(?missing, "order tables missing from pipeline database");
        }
        if !missing_columns.is_empty() {
            tracing::warn!(?missing_columns, "order tables lack columns an order write needs");
        }
        Ok(SchemaCheck {
            tables,
            missing,
            missing_columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_skip_constraints_and_quotes() {
        let sql = r#"CREATE TABLE "orders" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            "referid" TEXT NOT NULL UNIQUE,
            total DECIMAL(10, 2) DEFAULT 0,
            `taxid` TEXT,
            createdat TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (customerid) REFERENCES customers(id)
        )"#;
        assert_eq!(
            column_names(sql),
            vec!["id", "referid", "total", "taxid", "createdat"]
        );
    }

    #[test]
    fn column_names_of_garbage_is_empty() {
        assert!(column_names("").is_empty());
        assert!(column_names("CREATE VIEW v AS SELECT 1").is_empty());
    }
}

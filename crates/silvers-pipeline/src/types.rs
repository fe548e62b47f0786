//! Wire types for the SQL-over-HTTP pipeline endpoint.
//!
//! ## Request shape
//!
//! ```json
//! { "requests": [ { "type": "execute", "stmt": { "sql": "...", "args": [ ... ] } } ] }
//! ```
//!
//! Every argument carries an explicit value kind. Integers travel as decimal
//! *strings* (`{"type":"integer","value":"42"}`) so 64-bit ids survive JSON
//! number precision; floats travel as JSON numbers; booleans become the
//! integers `0`/`1`. `args` is omitted entirely when a statement has none.
//!
//! ## Response shape
//!
//! ```json
//! { "results": [ { "type": "ok", "response": { "type": "execute", "result": {
//!     "cols": [{"name": "id", "decltype": "INTEGER"}],
//!     "rows": [[{"type": "integer", "value": "1"}]],
//!     "affected_row_count": 0, "last_insert_rowid": null } } } ] }
//! ```
//!
//! A failed statement yields `{"type": "error", "error": {"message": ...}}`
//! in place of the `ok` entry. `response.type` and `response.result` are
//! modelled loosely (`Option` / raw JSON) because older deployments omit the
//! inner `type` tag; the client validates them before trusting the payload.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Top-level body POSTed to the pipeline endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRequest {
    pub requests: Vec<StreamRequest>,
}

impl PipelineRequest {
    /// A pipeline carrying exactly one `execute` request.
    #[must_use]
    pub fn execute(stmt: Statement) -> Self {
        Self {
            requests: vec![StreamRequest::Execute { stmt }],
        }
    }

    /// A pipeline carrying exactly one conditional `batch` request.
    #[must_use]
    pub fn batch(steps: Vec<BatchStep>) -> Self {
        Self {
            requests: vec![StreamRequest::Batch {
                batch: Batch { steps },
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamRequest {
    Execute { stmt: Statement },
    Batch { batch: Batch },
}

/// One SQL statement with positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Statement {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// Whitespace-collapsed, truncated SQL used in logs and error context.
    #[must_use]
    pub fn label(&self) -> String {
        const MAX: usize = 60;
        let collapsed = self.sql.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= MAX {
            collapsed
        } else {
            let mut cut: String = collapsed.chars().take(MAX).collect();
            cut.push('…');
            cut
        }
    }
}

/// A typed statement argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Value {
    Null,
    Integer { value: String },
    Float { value: f64 },
    Text { value: String },
}

impl Value {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Passes decimal amounts as `float` arguments. Values outside `f64`
    /// range fall back to their exact decimal text.
    #[must_use]
    pub fn decimal(value: Decimal) -> Self {
        value.to_f64().map_or_else(
            || Self::Text {
                value: value.to_string(),
            },
            Self::from,
        )
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text { value }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer {
            value: value.to_string(),
        }
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and are sent as `null`.
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::Float { value }
        } else {
            Self::Null
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Integer {
            value: if value { "1" } else { "0" }.to_string(),
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::decimal(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    pub steps: Vec<BatchStep>,
}

/// One statement inside a batch, optionally gated on earlier steps.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<BatchCondition>,
    pub stmt: Statement,
}

impl BatchStep {
    #[must_use]
    pub fn new(stmt: Statement) -> Self {
        Self {
            condition: None,
            stmt,
        }
    }

    #[must_use]
    pub fn when(mut self, condition: BatchCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BatchCondition {
    /// Step at this index completed without error.
    Ok { step: usize },
    /// Step at this index failed.
    Error { step: usize },
    Not { cond: Box<BatchCondition> },
}

impl BatchCondition {
    #[must_use]
    pub fn not(cond: BatchCondition) -> Self {
        Self::Not {
            cond: Box::new(cond),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PipelineResponse {
    #[serde(default)]
    pub baton: Option<String>,
    #[serde(default)]
    pub results: Vec<StreamResult>,
}

/// One entry of `results`, parallel to the request list.
#[derive(Debug, Deserialize)]
pub struct StreamResult {
    /// `"ok"` or `"error"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub response: Option<StreamResponse>,
    #[serde(default)]
    pub error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
pub struct StreamResponse {
    /// `"execute"` or `"batch"`; absent on some deployments.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// A statement-level error reported by the remote database.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Column descriptor. `name` is `null` for unnamed expressions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decltype: Option<String>,
}

/// A typed cell as it appears on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCell {
    /// `"integer"`, `"float"`, `"text"`, `"null"` or `"blob"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// The result of one executed statement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteResult {
    #[serde(default)]
    pub cols: Vec<Column>,
    /// `None` when the result object carried no `rows` key at all.
    #[serde(default)]
    pub rows: Option<Vec<Vec<WireCell>>>,
    #[serde(default)]
    pub affected_row_count: u64,
    /// Decimal string on the wire; some deployments send a number.
    #[serde(default)]
    pub last_insert_rowid: Option<serde_json::Value>,
}

impl ExecuteResult {
    /// Rows of the result, empty when none were returned.
    #[must_use]
    pub fn rows(&self) -> &[Vec<WireCell>] {
        self.rows.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn last_insert_rowid(&self) -> Option<i64> {
        match self.last_insert_rowid.as_ref()? {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

/// The result of a conditional batch; both lists are parallel to the steps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchResult {
    #[serde(default)]
    pub step_results: Vec<Option<ExecuteResult>>,
    #[serde(default)]
    pub step_errors: Vec<Option<RemoteError>>,
}

impl BatchResult {
    /// Result of `step`, if it ran and succeeded.
    #[must_use]
    pub fn step(&self, step: usize) -> Option<&ExecuteResult> {
        self.step_results.get(step).and_then(Option::as_ref)
    }

    /// The first step that reported an error, with its index.
    #[must_use]
    pub fn first_error(&self) -> Option<(usize, &RemoteError)> {
        self.step_errors
            .iter()
            .enumerate()
            .find_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn value_kinds_serialize_with_type_tags() {
        let args = vec![
            Value::Null,
            Value::from("ring"),
            Value::from(42_i64),
            Value::from(9.99_f64),
            Value::from(true),
        ];
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            json!([
                {"type": "null"},
                {"type": "text", "value": "ring"},
                {"type": "integer", "value": "42"},
                {"type": "float", "value": 9.99},
                {"type": "integer", "value": "1"}
            ])
        );
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn decimal_travels_as_float() {
        assert_eq!(
            Value::from(Decimal::new(2999, 2)),
            Value::Float { value: 29.99 }
        );
    }

    #[test]
    fn none_becomes_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
    }

    #[test]
    fn statement_without_args_omits_args_key() {
        let body = serde_json::to_value(PipelineRequest::execute(Statement::new("SELECT 1"))).unwrap();
        assert_eq!(
            body,
            json!({"requests": [{"type": "execute", "stmt": {"sql": "SELECT 1"}}]})
        );
    }

    #[test]
    fn batch_conditions_serialize_nested() {
        let step = BatchStep::new(Statement::new("ROLLBACK"))
            .when(BatchCondition::not(BatchCondition::Ok { step: 3 }));
        assert_eq!(
            serde_json::to_value(&step).unwrap(),
            json!({
                "condition": {"type": "not", "cond": {"type": "ok", "step": 3}},
                "stmt": {"sql": "ROLLBACK"}
            })
        );
    }

    #[test]
    fn last_insert_rowid_accepts_string_or_number() {
        let from_string: ExecuteResult =
            serde_json::from_value(json!({"last_insert_rowid": "17"})).unwrap();
        let from_number: ExecuteResult =
            serde_json::from_value(json!({"last_insert_rowid": 18})).unwrap();
        assert_eq!(from_string.last_insert_rowid(), Some(17));
        assert_eq!(from_number.last_insert_rowid(), Some(18));
    }

    #[test]
    fn missing_rows_key_is_distinguished_from_empty_rows() {
        let missing: ExecuteResult = serde_json::from_value(json!({"cols": []})).unwrap();
        let empty: ExecuteResult = serde_json::from_value(json!({"cols": [], "rows": []})).unwrap();
        assert!(missing.rows.is_none());
        assert_eq!(empty.rows.as_deref().map(<[_]>::len), Some(0));
    }

    #[test]
    fn statement_label_collapses_whitespace() {
        let stmt = Statement::new("\n  SELECT *\n   FROM products  ");
        assert_eq!(stmt.label(), "SELECT * FROM products");
    }
}

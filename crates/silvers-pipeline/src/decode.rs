//! Row decoding: typed wire cells → native values keyed by column name.
//!
//! Decoding never fails. Cells that are missing or cannot be parsed degrade
//! to `0` (integer and float columns) or the empty string (everything else).

use std::borrow::Cow;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::types::{Column, ExecuteResult, WireCell};

/// A decoded cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Integer view; floats truncate toward zero and unparsable text is `0`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> i64 {
        match self {
            Cell::Integer(i) => *i,
            Cell::Float(f) => *f as i64,
            Cell::Text(s) => parse_integer(s),
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Integer(i) => *i as f64,
            Cell::Float(f) => *f,
            Cell::Text(s) => parse_float(s),
        }
    }

    /// Exact decimal view used for money columns.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        match self {
            Cell::Integer(i) => Decimal::from(*i),
            Cell::Float(f) => Decimal::from_f64(*f).unwrap_or_default(),
            Cell::Text(s) => s.trim().parse::<Decimal>().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Integer(i) => Cow::Owned(i.to_string()),
            Cell::Float(f) => Cow::Owned(f.to_string()),
            Cell::Text(s) => Cow::Borrowed(s),
        }
    }

    /// `true` for empty or whitespace-only text. Numbers are never blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(s) if s.trim().is_empty())
    }
}

/// One decoded row: `(column name, value)` pairs in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    /// First value stored under `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    /// Text of `column`, or `""` when the column is absent.
    #[must_use]
    pub fn text(&self, column: &str) -> String {
        self.get(column)
            .map(|c| c.as_text().into_owned())
            .unwrap_or_default()
    }

    /// Trimmed text of `column`, or `None` when absent or blank.
    #[must_use]
    pub fn non_blank(&self, column: &str) -> Option<String> {
        self.get(column)
            .map(|c| c.as_text().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn int(&self, column: &str) -> i64 {
        self.get(column).map_or(0, Cell::as_i64)
    }

    #[must_use]
    pub fn float(&self, column: &str) -> f64 {
        self.get(column).map_or(0.0, Cell::as_f64)
    }

    #[must_use]
    pub fn decimal(&self, column: &str) -> Decimal {
        self.get(column).map(Cell::as_decimal).unwrap_or_default()
    }
}

impl FromIterator<(String, Cell)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Decodes one wire cell according to its declared type.
#[must_use]
pub fn decode_cell(cell: Option<&WireCell>) -> Cell {
    let Some(cell) = cell else {
        return Cell::Text(String::new());
    };
    let value = cell.value.as_ref();
    match cell.kind.as_str() {
        "integer" => Cell::Integer(value.map_or(0, |v| match v {
            serde_json::Value::Number(n) => n
                .as_i64()
                .unwrap_or_else(|| parse_integer(&n.to_string())),
            serde_json::Value::String(s) => parse_integer(s),
            _ => 0,
        })),
        "float" => Cell::Float(value.map_or(0.0, |v| match v {
            serde_json::Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
            serde_json::Value::String(s) => parse_float(s),
            _ => 0.0,
        })),
        _ => Cell::Text(match value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }),
    }
}

/// Decodes one row against its column list.
///
/// The record has exactly one entry per column, in column order. Cells beyond
/// the last column are ignored; missing cells decode as empty text.
#[must_use]
pub fn decode_row(cols: &[Column], row: &[WireCell]) -> Record {
    cols.iter()
        .enumerate()
        .map(|(idx, col)| (col.name.clone().unwrap_or_default(), decode_cell(row.get(idx))))
        .collect()
}

/// Decodes every row of an execute result.
#[must_use]
pub fn decode_rows(result: &ExecuteResult) -> Vec<Record> {
    result
        .rows()
        .iter()
        .map(|row| decode_row(&result.cols, row))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn parse_integer(raw: &str) -> i64 {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().unwrap_or_else(|_| {
        let f = parse_float(trimmed);
        f.trunc() as i64
    })
}

fn parse_float(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}

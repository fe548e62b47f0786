//! Client for the SQL-over-HTTP pipeline endpoint that backs the storefront.
//!
//! [`PipelineClient`] sends statements, [`decode`] turns typed wire cells into
//! [`Record`]s, [`normalize`] maps records onto catalog entities and
//! [`Catalog`] bundles the storefront's read queries.

pub mod catalog;
pub mod client;
pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod normalize;
pub mod types;

pub use catalog::Catalog;
pub use client::PipelineClient;
pub use decode::{decode_cell, decode_row, decode_rows, Cell, Record};
pub use diagnostics::{column_names, SchemaCheck, ORDER_COLUMNS};
pub use error::PipelineError;
pub use normalize::ProductMapper;
pub use types::{
    BatchCondition, BatchResult, BatchStep, ExecuteResult, PipelineRequest, PipelineResponse,
    RemoteError, Statement, Value,
};

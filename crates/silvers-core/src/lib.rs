//! Domain types and configuration shared by every `silvers` crate.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod products;
pub mod search;

use thiserror::Error;

pub use app_config::{
    AppConfig, Environment, LineKeying, OrderWriteMode, ValidationProfile,
};
pub use catalog::{build_category_tree, Category, CategoryNode, Collection};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{group_options, OptionGroup, OptionSelection, Product, ProductOption};
pub use search::{ProductQuery, SortKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

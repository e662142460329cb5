//! Shared domain types and configuration for the vitrine workspace.

pub mod app_config;
pub mod collections;
pub mod config;
pub mod filters;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use collections::{Collection, CollectionFilters, CollectionInfo, FilterCriterion};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::{FilterDefinition, FilterValue, SelectedFilter};
pub use products::{
    product_key, Product, ProductPage, ProductPageMeta, ProductsQuery, DEFAULT_PAGE_SIZE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

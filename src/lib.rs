//! Seedlist: curatorial target export toolkit
//!
//! This crate loads a relational CSV export of curated web-archiving Targets,
//! reconciles it against taxonomy tables (collections, subjects, licenses),
//! derives legal/access status, and generates downstream artifacts: URL lists,
//! access-control lists, crawl-feed JSON, search annotations, and static-site
//! source pages.

pub mod acl;
pub mod config;
pub mod data;
pub mod feeds;
pub mod site;

use thiserror::Error;

/// Main error type for Seedlist operations
#[derive(Debug, Error)]
pub enum SeedlistError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Data(#[from] DataError),

    #[error("Access list error: {0}")]
    Acl(#[from] AclError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Front matter error: {0}")]
    FrontMatter(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while loading and joining the CSV export
#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV directory does not exist: {0}")]
    MissingDir(String),

    #[error("CSV directory is empty: {0}")]
    EmptyDir(String),

    #[error("Failed to read table '{table}': {source}")]
    Table {
        table: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the access-list builder
///
/// Individual malformed seed URLs are logged and skipped, never surfaced
/// here; an unrecognized output format is the only fatal condition.
#[derive(Debug, Error)]
pub enum AclError {
    #[error("Unknown access list format '{0}'")]
    UnsupportedFormat(String),
}

/// Result type alias for Seedlist operations
pub type Result<T> = std::result::Result<T, SeedlistError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for dataset operations
pub type DataResult<T> = std::result::Result<T, DataError>;

// Re-export commonly used types
pub use acl::{build_access_list, AclFormat, CanonicalForm, ScopePolicy};
pub use config::Config;
pub use data::{Dataset, Target, TargetFilter};

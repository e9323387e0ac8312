//! Configuration module for Seedlist
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file that supplies defaults for repeated export runs.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DatasetConfig, FilterConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export the known frequency values for CLI argument validation
pub use validation::FREQUENCIES;

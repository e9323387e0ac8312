use crate::config::types::{Config, DatasetConfig, FilterConfig};
use crate::data::Terms;
use crate::ConfigError;

/// Crawl frequencies the curation tool can assign, plus the `all` selector
pub const FREQUENCIES: &[&str] = &[
    "nevercrawl",
    "daily",
    "weekly",
    "monthly",
    "quarterly",
    "sixmonthly",
    "annual",
    "domaincrawl",
    "all",
];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_dataset_config(&config.dataset)?;
    validate_filter_config(&config.filters)?;
    Ok(())
}

/// Validates the dataset location
fn validate_dataset_config(config: &DatasetConfig) -> Result<(), ConfigError> {
    if config.csv_dir.is_empty() {
        return Err(ConfigError::Validation(
            "csv-dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the default filter settings
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if !FREQUENCIES.contains(&config.frequency.as_str()) {
        return Err(ConfigError::Validation(format!(
            "frequency must be one of {}, got '{}'",
            FREQUENCIES.join(", "),
            config.frequency
        )));
    }

    if Terms::parse(&config.terms).is_none() {
        return Err(ConfigError::Validation(format!(
            "terms must be one of npld, oa, bypm, all, got '{}'",
            config.terms
        )));
    }

    Ok(())
}

use serde::Deserialize;

/// Main configuration structure for Seedlist
///
/// Everything is optional: the config file supplies site-wide defaults for
/// repeated export runs, and any CLI option overrides it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Where the CSV export lives
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Directory holding the exported CSV tables
    #[serde(rename = "csv-dir", default = "default_csv_dir")]
    pub csv_dir: String,
}

impl Default for DatasetConfig {
    fn default() -> DatasetConfig {
        DatasetConfig {
            csv_dir: default_csv_dir(),
        }
    }
}

fn default_csv_dir() -> String {
    "target-db-csv".to_string()
}

/// Default target-selection settings
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Crawl frequency to select; `all` means all-but-nevercrawl
    #[serde(default = "default_frequency")]
    pub frequency: String,

    /// Legal terms to select: `npld`, `oa`, `bypm` or `all`
    #[serde(default = "default_terms")]
    pub terms: String,

    /// Include targets marked hidden by curators
    #[serde(rename = "include-hidden", default)]
    pub include_hidden: bool,

    /// Include targets whose crawl end date has passed
    #[serde(rename = "include-expired", default)]
    pub include_expired: bool,

    /// Omit targets already in scope through a UK top-level domain
    #[serde(rename = "omit-uk-tlds", default)]
    pub omit_uk_tlds: bool,
}

impl Default for FilterConfig {
    fn default() -> FilterConfig {
        FilterConfig {
            frequency: default_frequency(),
            terms: default_terms(),
            include_hidden: false,
            include_expired: false,
            omit_uk_tlds: false,
        }
    }
}

fn default_frequency() -> String {
    "all".to_string()
}

fn default_terms() -> String {
    "npld".to_string()
}

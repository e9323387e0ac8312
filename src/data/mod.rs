//! Dataset loading and the joined Target model
//!
//! This module reads the relational CSV export of the curatorial database,
//! joins its tables into denormalized `Target` records and taxonomy trees,
//! derives legal/access status, and offers the filtering used by every
//! export command.

mod filter;
mod loader;
mod records;
mod status;

// Re-export the public surface
pub use filter::{TargetFilter, Terms};
pub use loader::{dataset_hash, load_dataset};
pub use records::{
    parse_db_datetime, CollectionArea, Curator, Dataset, Organisation, Target, TaxonomyNode,
};
pub use status::{check_npld_status, check_oa_status, is_bare_twitter_seed};

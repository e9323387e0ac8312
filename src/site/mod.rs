//! Static-site source generation
//!
//! Renders the dataset as Hugo-style content pages: one page per
//! publishable Target and one per published collection, nested to mirror
//! the collection hierarchy.

mod pages;
mod paths;

pub use pages::{generate_site, SiteStats};
pub use paths::{slugify, target_file_path};

//! Downstream JSON artifacts: crawl feeds and search annotations

mod annotations;
mod crawl_feed;

pub use annotations::{generate_annotations, Annotations, ScopedAnnotations, UrlAnnotation};
pub use crawl_feed::{generate_crawl_feed, CrawlFeedEntry, Schedule};

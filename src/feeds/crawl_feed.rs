use serde::Serialize;

use crate::data::Target;

/// One crawl schedule window for a Target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub frequency: String,
}

/// A Target in the crawl-feed interchange format
///
/// The field names are a wire contract with the crawl launcher, hence the
/// camelCase rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlFeedEntry {
    pub id: i64,
    pub title: String,
    pub seeds: Vec<String>,
    pub depth: Option<String>,
    pub scope: Option<String>,
    pub ignore_robots_txt: bool,
    pub schedules: Vec<Schedule>,
    pub watched: bool,
    pub document_url_scheme: Option<String>,
    pub login_page_url: Option<String>,
    pub logout_url: Option<String>,
    pub secret_id: Option<String>,
}

impl CrawlFeedEntry {
    pub fn from_target(target: &Target) -> CrawlFeedEntry {
        CrawlFeedEntry {
            id: target.id,
            title: target.title.clone(),
            seeds: target.urls.clone(),
            depth: target.depth.clone(),
            scope: target.scope.clone(),
            ignore_robots_txt: target.ignore_robots_txt,
            schedules: vec![Schedule {
                start_date: target.crawl_start_date.clone(),
                end_date: target.crawl_end_date.clone(),
                frequency: target.crawl_frequency.clone(),
            }],
            watched: target.watched,
            document_url_scheme: target.document_url_scheme.clone(),
            login_page_url: target.login_page_url.clone(),
            logout_url: target.logout_url.clone(),
            secret_id: target.secret_id.clone(),
        }
    }
}

/// Renders the crawl feed for a filtered set of Targets
pub fn generate_crawl_feed(targets: &[&Target]) -> Vec<CrawlFeedEntry> {
    targets
        .iter()
        .map(|target| CrawlFeedEntry::from_target(target))
        .collect()
}

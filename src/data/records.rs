use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Parses the export's timestamp convention, with or without fractional
/// seconds (`2020-03-13 13:16:22.445`)
pub fn parse_db_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Deserializes the Postgres CSV-export boolean convention (`t` / `f`)
fn pg_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value == "t")
}

/// One row of `target.csv`
///
/// Only the columns this tool consumes are modeled; the export carries
/// many more, which the CSV reader ignores by name.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetRow {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub depth: Option<String>,
    pub crawl_frequency: Option<String>,
    pub crawl_start_date: Option<String>,
    pub crawl_end_date: Option<String>,
    pub qaissue_id: Option<i64>,
    pub login_page_url: Option<String>,
    pub logout_url: Option<String>,
    pub secret_id: Option<String>,
    pub wct_id: Option<i64>,
    pub author_id: Option<i64>,
    pub organisation_id: Option<i64>,
    pub license_status: Option<String>,
    pub live_site_status: Option<String>,
    #[serde(deserialize_with = "pg_bool")]
    pub active: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub hidden: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub ignore_robots_txt: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub is_in_scope_ip: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub is_in_scope_ip_without_license: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub is_top_level_domain: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub is_uk_hosting: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub is_uk_registration: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub key_site: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub no_ld_criteria_met: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub professional_judgement: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub special_dispensation: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub uk_postal_address: bool,
    #[serde(deserialize_with = "pg_bool")]
    pub via_correspondence: bool,
}

/// One row of `field_url.csv`: a seed URL attached to a Target
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUrlRow {
    pub target_id: i64,
    pub url: String,
    pub position: Option<i64>,
}

/// One row of `taxonomy.csv`: a term in any of the taxonomy trees
/// (collections, subjects, licenses, QA issues)
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyRow {
    pub id: i64,
    pub ttype: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "pg_bool")]
    pub publish: bool,
}

/// One row of `collection_target.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionTargetRow {
    pub collection_id: i64,
    pub target_id: i64,
}

/// One row of `subject_target.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectTargetRow {
    pub subject_id: i64,
    pub target_id: i64,
}

/// One row of `license_target.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseTargetRow {
    pub license_id: i64,
    pub target_id: i64,
}

/// One row of `watched_target.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct WatchedTargetRow {
    pub id_target: i64,
    pub document_url_scheme: Option<String>,
}

/// One row of `taxonomy_parents_all.csv`, linking a collection area to a
/// collection beneath it
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyParentsRow {
    pub taxonomy_id: i64,
    pub parent_id: i64,
}

/// One row of `creator.csv`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Curator {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One row of `organisation.csv`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Organisation {
    pub id: i64,
    pub title: Option<String>,
    pub abbreviation: Option<String>,
}

/// A fully joined and post-processed Target record
///
/// Assembled by the loader from the target table plus the URL, taxonomy,
/// watched-target and license joins, with derived legal/access status
/// attached by the status pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Target {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub depth: Option<String>,
    pub crawl_frequency: String,
    pub crawl_start_date: Option<String>,
    pub crawl_end_date: Option<String>,

    /// Seed URLs in curatorial order
    pub urls: Vec<String>,
    pub collection_ids: Vec<i64>,
    pub subject_ids: Vec<i64>,
    pub licenses: Vec<String>,
    pub license_ids: Vec<i64>,

    pub watched: bool,
    pub document_url_scheme: Option<String>,

    pub qa_issue_id: Option<i64>,
    pub qa_issue: Option<String>,
    pub qa_issue_score: u8,

    // Derived legal/access status:
    pub is_npld: bool,
    pub inherits_npld: bool,
    pub is_oa: bool,
    pub inherits_oa: bool,
    pub invalid_reason: Option<String>,

    // Flags carried through from the export:
    pub active: bool,
    pub hidden: bool,
    pub ignore_robots_txt: bool,
    pub is_in_scope_ip: bool,
    pub is_in_scope_ip_without_license: bool,
    pub is_top_level_domain: bool,
    pub is_uk_hosting: bool,
    pub is_uk_registration: bool,
    pub key_site: bool,
    pub no_ld_criteria_met: bool,
    pub professional_judgement: bool,
    pub special_dispensation: bool,
    pub uk_postal_address: bool,
    pub via_correspondence: bool,

    pub login_page_url: Option<String>,
    pub logout_url: Option<String>,
    pub secret_id: Option<String>,
    pub wct_id: Option<i64>,
    pub author_id: Option<i64>,
    pub organisation_id: Option<i64>,
    pub license_status: Option<String>,
    pub live_site_status: Option<String>,
}

impl From<TargetRow> for Target {
    fn from(row: TargetRow) -> Target {
        Target {
            id: row.id,
            title: row.title.unwrap_or_default(),
            description: row.description,
            scope: row.scope,
            depth: row.depth,
            crawl_frequency: row.crawl_frequency.unwrap_or_default(),
            crawl_start_date: row.crawl_start_date,
            crawl_end_date: row.crawl_end_date,
            qa_issue_id: row.qaissue_id,
            active: row.active,
            hidden: row.hidden,
            ignore_robots_txt: row.ignore_robots_txt,
            is_in_scope_ip: row.is_in_scope_ip,
            is_in_scope_ip_without_license: row.is_in_scope_ip_without_license,
            is_top_level_domain: row.is_top_level_domain,
            is_uk_hosting: row.is_uk_hosting,
            is_uk_registration: row.is_uk_registration,
            key_site: row.key_site,
            no_ld_criteria_met: row.no_ld_criteria_met,
            professional_judgement: row.professional_judgement,
            special_dispensation: row.special_dispensation,
            uk_postal_address: row.uk_postal_address,
            via_correspondence: row.via_correspondence,
            login_page_url: row.login_page_url,
            logout_url: row.logout_url,
            secret_id: row.secret_id,
            wct_id: row.wct_id,
            author_id: row.author_id,
            organisation_id: row.organisation_id,
            license_status: row.license_status,
            live_site_status: row.live_site_status,
            ..Target::default()
        }
    }
}

/// A node in one of the taxonomy trees (collections, subjects, licenses)
///
/// Trees are assembled parent-before-child from the flat taxonomy table;
/// `target_ids` holds the associated targets in table order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaxonomyNode {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub publish: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub target_ids: Vec<i64>,
    pub collection_area_ids: Vec<i64>,
    pub children: Vec<TaxonomyNode>,
}

impl TaxonomyNode {
    /// Depth-first walk over this node and all descendants
    pub fn walk(&self) -> Vec<&TaxonomyNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }
}

/// A high-level collection area grouping several collections
#[derive(Debug, Clone, Serialize)]
pub struct CollectionArea {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub collections: Vec<i64>,
}

/// The whole joined export: targets plus supporting taxonomies
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub targets: BTreeMap<i64, Target>,
    /// Targets dropped by seed validation, kept for reporting
    pub invalid_targets: Vec<Target>,
    pub curators: BTreeMap<i64, Curator>,
    pub organisations: BTreeMap<i64, Organisation>,
    pub collections: BTreeMap<i64, TaxonomyNode>,
    pub collection_areas: BTreeMap<i64, CollectionArea>,
    pub subjects: BTreeMap<i64, TaxonomyNode>,
    pub licenses: BTreeMap<i64, TaxonomyNode>,
}

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::data::{parse_db_datetime, Dataset, Target, TaxonomyNode};
use crate::site::paths::{slugify, target_file_path};
use crate::Result;

/// Counters reported after a site generation run
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteStats {
    pub target_pages: usize,
    pub collection_pages: usize,
    pub skipped_targets: usize,
    pub skipped_collections: usize,
}

/// Front matter for one Target page
///
/// Scalar fields first; the organisation table must come last for TOML.
#[derive(Debug, Serialize)]
struct TargetPage {
    url: String,
    id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    wct_id: Option<i64>,
    date: String,
    wayback_date: String,
    target_url: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    publisher: Option<String>,
    start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    open_access: bool,
    npld: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    crawl_frequency: String,
    subjects: Vec<String>,
    licenses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qa_issue: Option<String>,
    qa_issue_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    live_site_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organisation: Option<OrganisationRef>,
}

#[derive(Debug, Serialize)]
struct OrganisationRef {
    id: i64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    abbreviation: Option<String>,
}

/// Front matter for one collection page
#[derive(Debug, Serialize)]
struct CollectionPage {
    url: String,
    id: i64,
    title: String,
    targets: Vec<String>,
    target_ids: Vec<i64>,
    stats: CollectionStats,
}

#[derive(Debug, Serialize)]
struct CollectionStats {
    num_targets: usize,
    num_oa_targets: usize,
}

/// Generates static-site source pages for targets and collections
///
/// Pages land under `content/target/` and `content/collection/` in the
/// output directory, as Hugo-style markdown with TOML front matter and the
/// record description as the body. Blocked, hidden, seedless and undated
/// targets are skipped with a log line each, as are unpublished
/// collections.
pub fn generate_site(dataset: &Dataset, output_dir: &Path) -> Result<SiteStats> {
    let mut stats = SiteStats::default();

    // Subjects are looked up flat when rendering target pages:
    let mut subject_names: BTreeMap<i64, String> = BTreeMap::new();
    for tree in dataset.subjects.values() {
        for node in tree.walk() {
            subject_names.insert(node.id, node.name.clone());
        }
    }

    for target in dataset.targets.values() {
        if generate_target_page(dataset, target, &subject_names, output_dir)? {
            stats.target_pages += 1;
        } else {
            stats.skipped_targets += 1;
        }
    }

    let collection_base = output_dir.join("content").join("collection");
    for collection in dataset.collections.values() {
        generate_collection_pages(dataset, collection, &collection_base, &mut stats)?;
    }

    info!(
        "Generated {} target pages and {} collection pages ({} targets and {} collections skipped)",
        stats.target_pages, stats.collection_pages, stats.skipped_targets, stats.skipped_collections
    );
    Ok(stats)
}

/// Writes one Target page; returns false if the Target was skipped
fn generate_target_page(
    dataset: &Dataset,
    target: &Target,
    subject_names: &BTreeMap<i64, String>,
    output_dir: &Path,
) -> Result<bool> {
    if target.crawl_frequency.eq_ignore_ascii_case("nevercrawl") {
        warn!("The Target '{}' is blocked (NEVERCRAWL).", target.title);
        return Ok(false);
    }
    let Some(url) = target.urls.first() else {
        warn!("The Target '{}' has no URLs!", target.title);
        return Ok(false);
    };
    if target.hidden {
        warn!("The Target '{}' is hidden!", target.title);
        return Ok(false);
    }
    let Some(start_date) = target
        .crawl_start_date
        .as_deref()
        .and_then(parse_db_datetime)
    else {
        warn!("No start date on Target {}!", target.id);
        return Ok(false);
    };

    let page_id = target.wct_id.unwrap_or(target.id);
    let start_date_iso = start_date.format("%Y-%m-%dT%H:%M:%S").to_string();
    let wayback_date = start_date.format("%Y%m%d%H%M%S").to_string();
    let end_date_iso = target
        .crawl_end_date
        .as_deref()
        .and_then(parse_db_datetime)
        .map(|date| date.format("%Y-%m-%dT%H:%M:%S").to_string());
    let publisher = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string));

    let organisation = target.organisation_id.and_then(|org_id| {
        dataset.organisations.get(&org_id).map(|org| OrganisationRef {
            id: org.id,
            name: org.title.clone().unwrap_or_default(),
            abbreviation: org.abbreviation.clone(),
        })
    });

    let page = TargetPage {
        url: format!("target/{}", page_id),
        id: target.id,
        wct_id: target.wct_id,
        date: start_date_iso.clone(),
        wayback_date,
        target_url: url.clone(),
        title: target.title.clone(),
        publisher,
        start_date: start_date_iso,
        end_date: end_date_iso,
        open_access: target.is_oa,
        npld: target.is_npld,
        scope: target.scope.clone(),
        crawl_frequency: target.crawl_frequency.clone(),
        subjects: target
            .subject_ids
            .iter()
            .filter_map(|id| subject_names.get(id).cloned())
            .collect(),
        licenses: target.licenses.clone(),
        qa_issue: target.qa_issue.clone(),
        qa_issue_score: target.qa_issue_score,
        license_status: target.license_status.clone(),
        live_site_status: target.live_site_status.clone(),
        organisation,
    };

    let page_path = output_dir
        .join("content")
        .join("target")
        .join(target_file_path(target))
        .join("index.en.md");
    info!("Writing: {}", page_path.display());
    write_page(&page_path, &toml::to_string(&page)?, target.description.as_deref())?;
    Ok(true)
}

/// Writes one collection's page and recurses into its children
fn generate_collection_pages(
    dataset: &Dataset,
    collection: &TaxonomyNode,
    base_path: &Path,
    stats: &mut SiteStats,
) -> Result<()> {
    if !collection.publish {
        warn!(
            "The Collection '{}' is not to be published!",
            collection.name
        );
        stats.skipped_collections += 1;
        return Ok(());
    }

    let collection_dir: PathBuf = base_path.join(slugify(&collection.name));
    for child in &collection.children {
        generate_collection_pages(dataset, child, &collection_dir, stats)?;
    }

    let mut target_ids = Vec::new();
    let mut target_paths = Vec::new();
    let mut num_oa_targets = 0;
    for target_id in &collection.target_ids {
        let Some(target) = dataset.targets.get(target_id) else {
            continue;
        };
        if target.hidden {
            continue;
        }
        target_ids.push(*target_id);
        target_paths.push(target_file_path(target));
        if target.is_oa {
            num_oa_targets += 1;
        }
    }

    let page = CollectionPage {
        url: format!("collection/{}", collection.id),
        id: collection.id,
        title: collection.name.clone(),
        stats: CollectionStats {
            num_targets: target_ids.len(),
            num_oa_targets,
        },
        targets: target_paths,
        target_ids,
    };

    let page_path = collection_dir.join("_index.en.md");
    info!("Writing: {}", page_path.display());
    write_page(
        &page_path,
        &toml::to_string(&page)?,
        collection.description.as_deref(),
    )?;
    stats.collection_pages += 1;
    Ok(())
}

/// Writes a Hugo-style page: TOML front matter plus the description body
fn write_page(path: &Path, front_matter: &str, description: Option<&str>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = String::new();
    content.push_str("+++\n");
    content.push_str(front_matter);
    content.push_str("+++\n\n");
    if let Some(description) = description {
        // Strip Windows newlines carried over from the database export.
        content.push_str(&description.replace("\r\n", "\n"));
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

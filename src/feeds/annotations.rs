use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{error, warn};

use crate::data::{parse_db_datetime, Target, TaxonomyNode};

/// Annotation payload for one URL: the collections and subjects it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct UrlAnnotation {
    /// The first collection this URL was seen in
    pub collection: String,
    pub collections: Vec<String>,
    pub subject: Vec<String>,
}

/// URL annotations grouped by the owning Target's scope
///
/// The search indexer applies an annotation to a single resource, a host,
/// or a whole domain depending on which group the URL appears under.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScopedAnnotations {
    pub subdomains: BTreeMap<String, UrlAnnotation>,
    pub resource: BTreeMap<String, UrlAnnotation>,
    pub root: BTreeMap<String, UrlAnnotation>,
    pub plus1: BTreeMap<String, UrlAnnotation>,
}

impl ScopedAnnotations {
    fn for_scope(&mut self, scope: &str) -> Option<&mut BTreeMap<String, UrlAnnotation>> {
        match scope {
            "subdomains" => Some(&mut self.subdomains),
            "resource" => Some(&mut self.resource),
            "root" => Some(&mut self.root),
            "plus1" => Some(&mut self.plus1),
            _ => None,
        }
    }
}

/// A collection's date range, millisecond-ISO in UTC
#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// The full search-annotation document
#[derive(Debug, Clone, Default, Serialize)]
pub struct Annotations {
    pub collections: ScopedAnnotations,
    #[serde(rename = "collectionDateRanges")]
    pub collection_date_ranges: BTreeMap<String, DateRange>,
}

/// Generates search annotations from the unfiltered Target set
///
/// Walks every collection tree, attaching each member Target's URLs under
/// the Target's scope with the accumulated collection and subject names.
/// Nested collections contribute pipe-joined names (`Top|Child`), so the
/// indexer can facet on the full path.
pub fn generate_annotations(
    targets: &BTreeMap<i64, Target>,
    collections: &BTreeMap<i64, TaxonomyNode>,
    subjects: &BTreeMap<i64, TaxonomyNode>,
) -> Annotations {
    // Subjects are stored as a tree but looked up flat:
    let mut subject_names: BTreeMap<i64, String> = BTreeMap::new();
    for tree in subjects.values() {
        for node in tree.walk() {
            subject_names.insert(node.id, node.name.clone());
        }
    }

    let mut annotations = Annotations::default();
    for collection in collections.values() {
        add_annotations(&mut annotations, collection, targets, &subject_names, "");
    }
    annotations
}

fn add_annotations(
    annotations: &mut Annotations,
    collection: &TaxonomyNode,
    targets: &BTreeMap<i64, Target>,
    subject_names: &BTreeMap<i64, String>,
    prefix: &str,
) {
    let collection_name = format!("{}{}", prefix, collection.name);

    for target_id in &collection.target_ids {
        let Some(target) = targets.get(target_id) else {
            error!("Target {} not found in targets list!", target_id);
            continue;
        };
        let Some(scope) = target.scope.as_deref().filter(|scope| !scope.is_empty()) else {
            error!("Scope not set for {} - {:?}!", target_id, target.urls);
            continue;
        };
        let Some(by_url) = annotations.collections.for_scope(scope) else {
            warn!("Unknown scope '{}' on target {}", scope, target_id);
            continue;
        };
        for url in &target.urls {
            let annotation = by_url.entry(url.clone()).or_insert_with(|| UrlAnnotation {
                collection: collection_name.clone(),
                collections: Vec::new(),
                subject: Vec::new(),
            });
            if !annotation.collections.contains(&collection_name) {
                annotation.collections.push(collection_name.clone());
            }
            for subject_id in &target.subject_ids {
                match subject_names.get(subject_id) {
                    Some(name) => {
                        if !annotation.subject.contains(name) {
                            annotation.subject.push(name.clone());
                        }
                    }
                    None => warn!(
                        "Subject {} referenced in target {} does not appear to exist!?",
                        subject_id, target_id
                    ),
                }
            }
        }
    }

    annotations.collection_date_ranges.insert(
        collection_name.clone(),
        DateRange {
            start: collection.start_date.as_deref().and_then(to_full_iso),
            end: collection.end_date.as_deref().and_then(to_full_iso),
        },
    );

    for child in &collection.children {
        add_annotations(
            annotations,
            child,
            targets,
            subject_names,
            &format!("{}|", collection_name),
        );
    }
}

/// Converts a database timestamp to millisecond-ISO UTC form
fn to_full_iso(value: &str) -> Option<String> {
    let parsed = parse_db_datetime(value)?;
    Some(
        parsed
            .and_utc()
            .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
            .to_string(),
    )
}

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::data::records::{
    CollectionArea, CollectionTargetRow, Curator, Dataset, FieldUrlRow, LicenseTargetRow,
    Organisation, SubjectTargetRow, Target, TargetRow, TaxonomyNode, TaxonomyParentsRow,
    TaxonomyRow, WatchedTargetRow,
};
use crate::data::status;
use crate::{DataError, DataResult};

/// QA-issue taxonomy terms mapped to a coarse publishability score
const QA_ISSUE_SCORES: &[(i64, u8)] = &[
    (233, 1), // QA issues
    (909, 2), // QA issues, but OK to publish
    (190, 3), // No QA issues
];

/// A taxonomy row plus the associations accumulated while joining
struct TaxEntry {
    row: TaxonomyRow,
    target_ids: Vec<i64>,
    collection_area_ids: Vec<i64>,
}

/// Loads the whole CSV export from a directory and performs the joins
///
/// Targets gain their seed URLs (honoring curatorial `position` ordering),
/// collection/subject/license associations, watched-target attributes and
/// QA-issue details; the taxonomy table is split into collections, subject
/// and license trees. Legal/access status derivation and seed validation
/// run last, moving Targets with disallowed seeds into `invalid_targets`.
///
/// Rows referencing unknown Targets or taxonomy terms are logged and
/// skipped; a missing or empty export directory is fatal.
pub fn load_dataset(csv_dir: &Path) -> DataResult<Dataset> {
    if !csv_dir.exists() {
        return Err(DataError::MissingDir(csv_dir.display().to_string()));
    }
    if csv_dir.read_dir()?.next().is_none() {
        return Err(DataError::EmptyDir(csv_dir.display().to_string()));
    }

    info!("Loading targets...");
    let mut targets: BTreeMap<i64, Target> = read_table::<TargetRow>(csv_dir, "target")?
        .into_iter()
        .map(|row| (row.id, Target::from(row)))
        .collect();

    info!("Loading URLs...");
    for row in read_table::<FieldUrlRow>(csv_dir, "field_url")? {
        let Some(target) = targets.get_mut(&row.target_id) else {
            warn!(
                "No such Target {} - no match for URL row: {}",
                row.target_id, row.url
            );
            continue;
        };
        match row.position {
            Some(position) => {
                let index = position.clamp(0, target.urls.len() as i64) as usize;
                target.urls.insert(index, row.url);
            }
            None => target.urls.push(row.url),
        }
    }

    info!("Loading taxonomies...");
    let mut tax: BTreeMap<i64, TaxEntry> = read_table::<TaxonomyRow>(csv_dir, "taxonomy")?
        .into_iter()
        .map(|row| {
            (
                row.id,
                TaxEntry {
                    row,
                    target_ids: Vec::new(),
                    collection_area_ids: Vec::new(),
                },
            )
        })
        .collect();

    info!("Loading collection_target associations...");
    let mut collections_by_target: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    for row in read_table::<CollectionTargetRow>(csv_dir, "collection_target")? {
        collections_by_target
            .entry(row.target_id)
            .or_default()
            .insert(row.collection_id);
        match tax.get_mut(&row.collection_id) {
            Some(entry) => entry.target_ids.push(row.target_id),
            None => warn!(
                "Unknown collection {} associated with target {}",
                row.collection_id, row.target_id
            ),
        }
    }

    info!("Loading subject_target associations...");
    let mut subjects_by_target: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    for row in read_table::<SubjectTargetRow>(csv_dir, "subject_target")? {
        subjects_by_target
            .entry(row.target_id)
            .or_default()
            .insert(row.subject_id);
        match tax.get_mut(&row.subject_id) {
            Some(entry) => entry.target_ids.push(row.target_id),
            None => warn!(
                "Unknown subject {} associated with target {}",
                row.subject_id, row.target_id
            ),
        }
    }

    info!("Loading collection areas...");
    let mut collections_by_area: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for row in read_table::<TaxonomyParentsRow>(csv_dir, "taxonomy_parents_all")? {
        collections_by_area
            .entry(row.taxonomy_id)
            .or_default()
            .push(row.parent_id);
        match tax.get_mut(&row.parent_id) {
            Some(entry) => entry.collection_area_ids.push(row.taxonomy_id),
            None => warn!(
                "Unknown collection {} under collection area {}",
                row.parent_id, row.taxonomy_id
            ),
        }
    }
    let mut collection_areas: BTreeMap<i64, CollectionArea> = BTreeMap::new();
    for (area_id, collections) in collections_by_area {
        let Some(entry) = tax.get(&area_id) else {
            warn!("Collection area {} missing from the taxonomy table", area_id);
            continue;
        };
        collection_areas.insert(
            area_id,
            CollectionArea {
                id: area_id,
                name: entry.row.name.clone().unwrap_or_default(),
                description: entry.row.description.clone(),
                collections,
            },
        );
    }

    info!("Loading watched_target associations...");
    for row in read_table::<WatchedTargetRow>(csv_dir, "watched_target")? {
        match targets.get_mut(&row.id_target) {
            Some(target) => {
                target.watched = true;
                target.document_url_scheme = row.document_url_scheme;
            }
            None => warn!("Watched target {} not in the target table", row.id_target),
        }
    }

    info!("Loading licenses...");
    for row in read_table::<LicenseTargetRow>(csv_dir, "license_target")? {
        let Some(license) = tax.get(&row.license_id) else {
            warn!(
                "Unknown license {} on target {}",
                row.license_id, row.target_id
            );
            continue;
        };
        let name = license.row.name.clone().unwrap_or_default();
        match targets.get_mut(&row.target_id) {
            Some(target) => {
                target.licenses.push(name);
                target.license_ids.push(row.license_id);
            }
            None => warn!("License row for unknown target {}", row.target_id),
        }
    }

    info!("Loading creators...");
    let curators: BTreeMap<i64, Curator> = read_table::<Curator>(csv_dir, "creator")?
        .into_iter()
        .map(|row| (row.id, row))
        .collect();

    info!("Loading organisations...");
    let organisations: BTreeMap<i64, Organisation> =
        read_table::<Organisation>(csv_dir, "organisation")?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

    // Split the flat taxonomy table into its trees:
    let collections = extract_taxonomy(&tax, "collections");
    let subjects = extract_taxonomy(&tax, "subject");
    let licenses = extract_taxonomy(&tax, "licenses");

    // Post-process the targets:
    for (id, target) in targets.iter_mut() {
        target.collection_ids = collections_by_target
            .remove(id)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
        target.subject_ids = subjects_by_target
            .remove(id)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
        if let Some(qa_id) = target.qa_issue_id {
            target.qa_issue = tax.get(&qa_id).and_then(|entry| entry.row.name.clone());
            target.qa_issue_score = QA_ISSUE_SCORES
                .iter()
                .find(|(id, _)| *id == qa_id)
                .map(|(_, score)| *score)
                .unwrap_or(0);
        }
    }

    status::derive_statuses(&mut targets);
    let invalid_targets = status::validate_seeds(&mut targets);

    Ok(Dataset {
        targets,
        invalid_targets,
        curators,
        organisations,
        collections,
        collection_areas,
        subjects,
        licenses,
    })
}

/// Computes a SHA-256 hash over the export's CSV tables
///
/// Used to tell one snapshot of the curatorial database from another in
/// logs and generated artifacts.
pub fn dataset_hash(csv_dir: &Path) -> DataResult<String> {
    let mut paths: Vec<PathBuf> = fs::read_dir(csv_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "csv").unwrap_or(false))
        .collect();
    paths.sort();

    let mut hasher = Sha256::new();
    for path in paths {
        if let Some(name) = path.file_name() {
            hasher.update(name.to_string_lossy().as_bytes());
        }
        hasher.update(&fs::read(&path)?);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Reads one CSV table, skipping (and logging) rows that fail to parse
///
/// Older exports occasionally carry stray header rows mid-file; those and
/// any otherwise-malformed rows are dropped rather than failing the load.
fn read_table<T: DeserializeOwned>(csv_dir: &Path, table: &str) -> DataResult<Vec<T>> {
    let path = csv_dir.join(format!("{}.csv", table));
    let file = fs::File::open(&path).map_err(|source| DataError::Table {
        table: table.to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => warn!("Skipping malformed row in {}.csv: {}", table, err),
        }
    }
    Ok(rows)
}

/// Builds the tree of taxonomy terms of one type
///
/// Terms without a parent become roots; every other term of the same type
/// attaches beneath its parent, recursively.
fn extract_taxonomy(tax: &BTreeMap<i64, TaxEntry>, ttype: &str) -> BTreeMap<i64, TaxonomyNode> {
    let mut children_by_parent: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    let mut roots: Vec<i64> = Vec::new();
    for (id, entry) in tax {
        if entry.row.ttype.as_deref() != Some(ttype) {
            continue;
        }
        match entry.row.parent_id {
            Some(parent_id) => children_by_parent.entry(parent_id).or_default().push(*id),
            None => roots.push(*id),
        }
    }

    roots
        .into_iter()
        .map(|id| (id, build_node(id, tax, &children_by_parent)))
        .collect()
}

fn build_node(
    id: i64,
    tax: &BTreeMap<i64, TaxEntry>,
    children_by_parent: &BTreeMap<i64, Vec<i64>>,
) -> TaxonomyNode {
    let entry = &tax[&id];
    TaxonomyNode {
        id,
        name: entry.row.name.clone().unwrap_or_default(),
        description: entry.row.description.clone(),
        publish: entry.row.publish,
        start_date: entry.row.start_date.clone(),
        end_date: entry.row.end_date.clone(),
        target_ids: entry.target_ids.clone(),
        collection_area_ids: entry.collection_area_ids.clone(),
        children: children_by_parent
            .get(&id)
            .map(|child_ids| {
                child_ids
                    .iter()
                    .map(|child_id| build_node(*child_id, tax, children_by_parent))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_table(dir: &Path, name: &str, content: &str) {
        let mut file = fs::File::create(dir.join(format!("{}.csv", name))).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn write_minimal_export(dir: &Path) {
        write_table(
            dir,
            "target",
            "id,title,scope,crawl_frequency,crawl_start_date,crawl_end_date,qaissue_id,\
active,hidden,ignore_robots_txt,is_in_scope_ip,is_in_scope_ip_without_license,\
is_top_level_domain,is_uk_hosting,is_uk_registration,key_site,no_ld_criteria_met,\
professional_judgement,special_dispensation,uk_postal_address,via_correspondence\n\
1,Example Site,subdomains,DAILY,2020-01-01 00:00:00,,190,t,f,f,f,f,t,f,f,f,f,f,f,f,f\n\
2,Another Site,root,ANNUAL,2020-01-01 00:00:00,,,t,f,f,f,f,f,f,f,f,f,f,f,f,f\n",
        );
        write_table(
            dir,
            "field_url",
            "id,url,position,target_id\n\
1,http://www.example.co.uk/,,1\n\
2,http://first.example.co.uk/,0,1\n\
3,http://another.example.org/,,2\n",
        );
        write_table(
            dir,
            "taxonomy",
            "id,name,ttype,parent_id,publish,description,start_date,end_date\n\
100,Politics,collections,,t,Political sites,2020-01-01 00:00:00,\n\
101,Elections,collections,100,t,,,\n\
190,No QA issues,qaissues,,f,,,\n\
200,Science,subject,,t,,,\n\
300,Open Licence,licenses,,t,,,\n",
        );
        write_table(
            dir,
            "collection_target",
            "collection_id,target_id\n101,1\n100,2\n",
        );
        write_table(dir, "subject_target", "subject_id,target_id\n200,1\n");
        write_table(
            dir,
            "watched_target",
            "id,id_target,document_url_scheme\n1,2,pdf\n",
        );
        write_table(dir, "license_target", "license_id,target_id\n300,2\n");
        write_table(dir, "taxonomy_parents_all", "taxonomy_id,parent_id\n");
        write_table(dir, "creator", "id,name,email\n1,curator,c@example.org\n");
        write_table(dir, "organisation", "id,title,abbreviation\n1,Library,LIB\n");
    }

    #[test]
    fn test_load_joins_urls_in_position_order() {
        let dir = TempDir::new().unwrap();
        write_minimal_export(dir.path());
        let dataset = load_dataset(dir.path()).unwrap();
        let target = &dataset.targets[&1];
        assert_eq!(
            target.urls,
            vec![
                "http://first.example.co.uk/".to_string(),
                "http://www.example.co.uk/".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_attaches_associations() {
        let dir = TempDir::new().unwrap();
        write_minimal_export(dir.path());
        let dataset = load_dataset(dir.path()).unwrap();

        let first = &dataset.targets[&1];
        assert_eq!(first.collection_ids, vec![101]);
        assert_eq!(first.subject_ids, vec![200]);
        assert_eq!(first.qa_issue.as_deref(), Some("No QA issues"));
        assert_eq!(first.qa_issue_score, 3);

        let second = &dataset.targets[&2];
        assert!(second.watched);
        assert_eq!(second.document_url_scheme.as_deref(), Some("pdf"));
        assert_eq!(second.licenses, vec!["Open Licence".to_string()]);
        assert_eq!(second.license_ids, vec![300]);
    }

    #[test]
    fn test_load_builds_taxonomy_trees() {
        let dir = TempDir::new().unwrap();
        write_minimal_export(dir.path());
        let dataset = load_dataset(dir.path()).unwrap();

        assert_eq!(dataset.collections.len(), 1);
        let politics = &dataset.collections[&100];
        assert_eq!(politics.name, "Politics");
        assert_eq!(politics.children.len(), 1);
        assert_eq!(politics.children[0].name, "Elections");
        assert_eq!(politics.children[0].target_ids, vec![1]);
        assert_eq!(politics.target_ids, vec![2]);

        assert_eq!(dataset.subjects.len(), 1);
        assert_eq!(dataset.licenses.len(), 1);
    }

    #[test]
    fn test_load_derives_status() {
        let dir = TempDir::new().unwrap();
        write_minimal_export(dir.path());
        let dataset = load_dataset(dir.path()).unwrap();

        // Target 1 has the UK TLD flag; target 2 carries a license.
        assert!(dataset.targets[&1].is_npld);
        assert!(!dataset.targets[&1].is_oa);
        assert!(dataset.targets[&2].is_oa);
        assert!(!dataset.targets[&2].is_npld);
    }

    #[test]
    fn test_missing_dir_is_fatal() {
        let result = load_dataset(Path::new("/nonexistent/export-dir"));
        assert!(matches!(result, Err(DataError::MissingDir(_))));
    }

    #[test]
    fn test_empty_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = load_dataset(dir.path());
        assert!(matches!(result, Err(DataError::EmptyDir(_))));
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_table(dir.path(), "not_target", "id\n1\n");
        let result = load_dataset(dir.path());
        assert!(matches!(result, Err(DataError::Table { ref table, .. }) if table == "target"));
    }

    #[test]
    fn test_dataset_hash_stable_and_content_sensitive() {
        let dir = TempDir::new().unwrap();
        write_minimal_export(dir.path());
        let first = dataset_hash(dir.path()).unwrap();
        let second = dataset_hash(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        write_table(dir.path(), "organisation", "id,title,abbreviation\n2,Other,O\n");
        let changed = dataset_hash(dir.path()).unwrap();
        assert_ne!(first, changed);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error};
use url::Url;

use crate::data::Target;

/// Whether a Target qualifies for non-print legal deposit in its own right
///
/// Manual curatorial flags are checked first, then the automatic flags
/// computed by the curation tool when the record was saved.
pub fn check_npld_status(target: &Target) -> bool {
    // Manual flags:
    if target.professional_judgement || target.uk_postal_address || target.via_correspondence {
        return true;
    }
    // Automatic flags, trusted as computed upstream:
    target.is_top_level_domain || target.is_uk_hosting || target.is_uk_registration
}

/// Whether a Target qualifies for open access: it holds at least one license
pub fn check_oa_status(target: &Target) -> bool {
    !target.licenses.is_empty()
}

/// Derives legal/access status for every Target, including inheritance
///
/// The first pass computes each Target's own status and collects the seed
/// URLs of qualifying Targets. The second pass grants `inherits_*` status
/// to Targets whose seeds sit on a host whose root URL (`scheme://host/`)
/// is itself a qualifying seed. Inheritance is host-level only: a Target
/// deeper on a qualifying host inherits, a sibling domain does not.
pub fn derive_statuses(targets: &mut BTreeMap<i64, Target>) {
    let mut npld_urls: BTreeSet<String> = BTreeSet::new();
    let mut oa_urls: BTreeSet<String> = BTreeSet::new();

    for target in targets.values_mut() {
        target.is_npld = check_npld_status(target);
        if target.is_npld {
            npld_urls.extend(target.urls.iter().cloned());
        }
        target.is_oa = check_oa_status(target);
        if target.is_oa {
            oa_urls.extend(target.urls.iter().cloned());
        }
    }

    for target in targets.values_mut() {
        let mut on_oa_host = false;
        let mut on_npld_host = false;
        for url in &target.urls {
            if let Some(base) = host_base(url) {
                on_oa_host = on_oa_host || oa_urls.contains(&base);
                on_npld_host = on_npld_host || npld_urls.contains(&base);
            }
        }
        if on_oa_host && !target.is_oa {
            target.is_oa = true;
            target.inherits_oa = true;
            debug!("Target {} inherits open-access status", target.id);
        }
        if on_npld_host && !target.is_npld {
            target.is_npld = true;
            target.inherits_npld = true;
            debug!("Target {} inherits legal-deposit status", target.id);
        }
    }
}

/// Drops Targets with disallowed seeds out of the valid set
///
/// Bare social-media profile URLs are not archivable seeds; a Target
/// declaring one is moved, whole, into the returned invalid list.
pub fn validate_seeds(targets: &mut BTreeMap<i64, Target>) -> Vec<Target> {
    let mut invalid_ids: Vec<i64> = Vec::new();
    for target in targets.values() {
        for url in &target.urls {
            if is_bare_twitter_seed(url) {
                error!(
                    "This target ({}) has a bare Twitter URL as a seed! {}",
                    target.id, url
                );
                invalid_ids.push(target.id);
                break;
            }
        }
    }

    let mut invalid_targets = Vec::new();
    for id in invalid_ids {
        debug!("Dropping invalid target {}", id);
        if let Some(mut target) = targets.remove(&id) {
            target.invalid_reason = Some("Bare Twitter URLs are not allowed.".to_string());
            invalid_targets.push(target);
        }
    }
    invalid_targets
}

/// True for a Twitter profile URL with no path beyond the account name
///
/// A profile page cannot be crawled as a seed; only specific resources
/// (statuses, searches with long queries) are acceptable.
pub fn is_bare_twitter_seed(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    if host != "twitter.com" && !host.ends_with(".twitter.com") {
        return false;
    }
    if parsed.fragment().is_some() {
        return false;
    }
    // A profile is a single path segment; anything deeper is a resource.
    let path = parsed.path();
    if path.matches('/').count() > 1 {
        return false;
    }
    let mut rest = path.trim_start_matches('/').to_string();
    if let Some(query) = parsed.query() {
        rest.push('?');
        rest.push_str(query);
    }
    rest.len() <= 15
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '='))
}

/// The `scheme://host/` base a URL lives under, used for inheritance lookups
fn host_base(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    })
}

use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::{info, warn};

use crate::acl::{apply_scope, canonicalize, cdn, validate, ScopePolicy, SeedRejection};
use crate::data::Target;
use crate::AclError;

/// Output format for an access list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclFormat {
    /// Raw seed URLs, sorted, one per line
    Urls,
    /// Full canonical prefix strings, sorted
    Surts,
    /// pywb access rules, sorted descending so longer prefixes win in a
    /// first-match line matcher
    Pywb,
}

impl FromStr for AclFormat {
    type Err = AclError;

    fn from_str(value: &str) -> Result<AclFormat, AclError> {
        match value {
            "urls" => Ok(AclFormat::Urls),
            "surts" => Ok(AclFormat::Surts),
            "pywb" => Ok(AclFormat::Pywb),
            other => Err(AclError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Builds an access list from a set of Targets
///
/// Each Target's seed URLs run through validation, canonicalization and
/// scope resolution; the results accumulate into ordered, de-duplicated
/// sets which are rendered in the requested format. When `include_cdns` is
/// set, the static CDN table seeds the list first, so "open access" list
/// variants implicitly allow known third-party asset hosts.
///
/// Individual malformed URLs are logged (with the owning target id) and
/// skipped; they never abort the batch. The only fatal error is an
/// unrecognized format name.
pub fn build_access_list(
    targets: &[&Target],
    include_cdns: bool,
    format: &str,
) -> Result<Vec<String>, AclError> {
    // Refuse unknown formats before doing any work.
    let format: AclFormat = format.parse()?;

    let mut all_urls: BTreeSet<String> = BTreeSet::new();
    let mut all_surts: BTreeSet<String> = BTreeSet::new();
    let mut surts_and_urls: Vec<(String, String)> = Vec::new();

    if include_cdns {
        for entry in cdn::cdn_entries() {
            all_surts.insert(entry.to_string());
            surts_and_urls.push((entry.to_string(), entry.to_string()));
        }
        info!("{} prefixes for known CDNs added", cdn::CDN_PREFIXES.len());
    }

    for target in targets {
        for seed in &target.urls {
            match validate(seed) {
                Err(SeedRejection::InvalidCharacters) => {
                    warn!(
                        "Questionable characters found in URL [{}] in target {}",
                        seed, target.id
                    );
                    continue;
                }
                Err(SeedRejection::NonsenseUrl) => {
                    warn!("Nonsense URL [{}] in target {}", seed, target.id);
                    continue;
                }
                Ok(()) => {}
            }

            match canonicalize(seed) {
                Some(canonical) => {
                    let scope = target.scope.as_deref().and_then(ScopePolicy::parse);
                    let canonical = apply_scope(canonical, scope);
                    let rendered = canonical.to_string();
                    all_surts.insert(rendered.clone());
                    surts_and_urls.push((rendered, seed.clone()));
                }
                None => warn!("Got no canonical form from {}", seed),
            }

            // Validated URLs are kept even when canonicalization fails, so
            // the plain URL list is as complete as possible.
            all_urls.insert(seed.clone());
        }
    }

    Ok(match format {
        AclFormat::Urls => all_urls.into_iter().collect(),
        AclFormat::Surts => all_surts.into_iter().collect(),
        AclFormat::Pywb => {
            let mut rules: BTreeSet<String> = BTreeSet::new();
            for (surt, url) in &surts_and_urls {
                rules.insert(pywb_rule(surt, url));
            }
            rules.into_iter().rev().collect()
        }
    })
}

/// Renders one pywb access rule line
///
/// The canonical prefix loses its scheme marker and any trailing comma;
/// the rule payload pairs an "allow" decision with the original URL.
fn pywb_rule(surt: &str, url: &str) -> String {
    let prefix = surt.strip_prefix("http://(").unwrap_or(surt);
    let prefix = prefix.trim_end_matches(',');
    format!(
        r#"{} - {{"access": "allow", "url": {}}}"#,
        prefix,
        serde_json::Value::from(url)
    )
}

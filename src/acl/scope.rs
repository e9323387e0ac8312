use crate::acl::CanonicalForm;
use tracing::debug;

/// Target-level crawl scope policy
///
/// Decides how far access permissions extend from a declared seed: across
/// the whole domain and its subdomains, or no further than the exact host.
/// Only `Subdomains` widens anything; the remaining values all narrow a
/// bare-host form to the exact host and differ only in how the crawler
/// (not this crate) bounds its traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopePolicy {
    /// The declared host and everything beneath its registered domain
    Subdomains,
    /// The exact host, any path
    Root,
    /// A single resource
    Resource,
    /// The seed page plus directly linked pages
    Plus1,
}

impl ScopePolicy {
    /// Parses a stored scope value; unknown or empty values yield `None`
    /// and are treated as exact-host by the resolver (the narrower, safer
    /// reading)
    pub fn parse(value: &str) -> Option<ScopePolicy> {
        match value {
            "subdomains" => Some(ScopePolicy::Subdomains),
            "root" => Some(ScopePolicy::Root),
            "resource" => Some(ScopePolicy::Resource),
            "plus1" => Some(ScopePolicy::Plus1),
            _ => None,
        }
    }

    /// The stored string form of this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopePolicy::Subdomains => "subdomains",
            ScopePolicy::Root => "root",
            ScopePolicy::Resource => "resource",
            ScopePolicy::Plus1 => "plus1",
        }
    }
}

/// Applies a Target's scope policy to a canonical form
///
/// A bare-host form arrives open (subdomain-matching by default); any
/// policy other than `subdomains` — including a missing or unrecognized
/// one — closes it down to the exact host. Forms that already carry a path
/// pass through untouched: scope only affects host-level breadth, never
/// path-level breadth.
pub fn apply_scope(mut canonical: CanonicalForm, scope: Option<ScopePolicy>) -> CanonicalForm {
    if canonical.is_bare_host() && scope != Some(ScopePolicy::Subdomains) {
        canonical.narrow_to_host();
        debug!("Narrowed to exact host: {}", canonical);
    }
    canonical
}

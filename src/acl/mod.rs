//! URL canonicalization and access-list derivation
//!
//! This module turns a Target's raw seed URLs into normalized,
//! prefix-matchable canonical forms and assembles them into allow-lists
//! for a downstream replay proxy. The pipeline is validate →
//! canonicalize → resolve scope → accumulate → render, with known CDN
//! prefixes merged in for open-access list variants.

mod builder;
mod canonical;
pub mod cdn;
mod scope;
mod validate;

// Re-export main functions
pub use builder::{build_access_list, AclFormat};
pub use canonical::{canonicalize, CanonicalForm};
pub use scope::{apply_scope, ScopePolicy};
pub use validate::{validate, SeedRejection};

use thiserror::Error;

/// Why a seed URL was rejected before canonicalization was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SeedRejection {
    #[error("URL contains characters outside the permitted set")]
    InvalidCharacters,

    #[error("URL is a nonsense placeholder")]
    NonsenseUrl,
}

/// Punctuation permitted in seed URLs, alongside word characters
const PERMITTED_PUNCTUATION: &str = ":/.-=?&~%+@,;";

/// Degenerate placeholder occasionally left behind by curatorial tooling
const NONSENSE_URL: &str = "http://../";

/// Checks a seed URL against the permitted character set and known
/// degenerate forms
///
/// Accepted URLs are passed through unmodified for the canonicalizer to
/// attempt; failure to canonicalize is reported separately. Rejection is
/// never fatal to a batch: callers log the rejection with the owning
/// target and move on.
///
/// # Examples
///
/// ```
/// use seedlist::acl::{validate, SeedRejection};
///
/// assert!(validate("http://www.example.co.uk/").is_ok());
/// assert_eq!(validate("http://../"), Err(SeedRejection::NonsenseUrl));
/// assert_eq!(
///     validate("http://example.com/a b"),
///     Err(SeedRejection::InvalidCharacters)
/// );
/// ```
pub fn validate(url: &str) -> Result<(), SeedRejection> {
    if !url.chars().all(is_permitted_char) {
        return Err(SeedRejection::InvalidCharacters);
    }
    if url == NONSENSE_URL {
        return Err(SeedRejection::NonsenseUrl);
    }
    Ok(())
}

/// Word characters (Unicode alphanumerics and underscore) plus the small
/// set of URL punctuation curators legitimately use
fn is_permitted_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || PERMITTED_PUNCTUATION.contains(c)
}

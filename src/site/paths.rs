use crate::data::Target;

/// Fallback for records predating reliable start dates
pub(crate) const DEFAULT_START_DATE: &str = "2006-01-01 12:00:00";

/// Converts a title to a URL/path-safe slug
///
/// Lowercases, keeps alphanumerics and underscores, and collapses runs of
/// whitespace and hyphens into single hyphens.
pub fn slugify(value: &str) -> String {
    let mut cleaned = String::new();
    for c in value.to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            cleaned.push(c);
        } else if c.is_whitespace() || c == '-' {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// The start date used for page placement, forced to a default when the
/// record carries none
pub(crate) fn start_date_forced(target: &Target) -> &str {
    target
        .crawl_start_date
        .as_deref()
        .filter(|date| !date.is_empty())
        .unwrap_or(DEFAULT_START_DATE)
}

/// The relative source path for a Target's page: `YYYY/YYYY-MM-DD-slug`
///
/// The slug is built from the first 32 characters of the title so related
/// snapshots sort together without unbounded path lengths.
pub fn target_file_path(target: &Target) -> String {
    let start_date = match start_date_forced(target) {
        date if date.len() >= 10 && date.is_ascii() => date,
        _ => DEFAULT_START_DATE,
    };
    let title_head: String = target.title.chars().take(32).collect();
    format!(
        "{}/{}-{}",
        &start_date[..4],
        &start_date[..10],
        slugify(&title_head)
    )
}

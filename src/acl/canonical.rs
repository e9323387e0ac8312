use std::fmt;
use url::Url;

/// Order-normalized representation of a seed URL's host and path
///
/// Host labels are held reversed so that shared canonical prefixes
/// correspond to shared origins or shared parent paths: a shorter canonical
/// string matches any URL whose canonical form starts with it. The form is
/// kept structured (labels, port, boundary, path) and only rendered to a
/// string at the edges, so narrowing never has to re-parse text.
///
/// A bare-host form starts out *open* (rendered with a trailing comma,
/// matching the host and all its subdomains); the scope resolver may close
/// it down to the exact host. Path-bearing forms are always closed at the
/// host boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalForm {
    /// Host labels in reversed order, e.g. `["uk", "co", "example", "www"]`
    labels: Vec<String>,
    /// Explicit non-default port, if any
    port: Option<u16>,
    /// Path plus query, verbatim; `None` for a bare host (root path, no query)
    path_query: Option<String>,
    /// Whether a bare-host form has been closed to the exact host
    closed: bool,
}

impl CanonicalForm {
    /// True if this form covers a whole host rather than a specific path
    pub fn is_bare_host(&self) -> bool {
        self.path_query.is_none()
    }

    /// True if this form still matches subdomains of its host
    pub fn is_open(&self) -> bool {
        self.path_query.is_none() && !self.closed
    }

    /// Reversed host labels
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Closes a bare-host form down to the exact host, any path
    pub(crate) fn narrow_to_host(&mut self) {
        self.closed = true;
    }
}

impl fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://({}", self.labels.join(","))?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        match &self.path_query {
            Some(path_query) => write!(f, "){}", path_query),
            None if self.closed => write!(f, ")/"),
            None => write!(f, ","),
        }
    }
}

/// Converts a URL into its canonical prefix form
///
/// The scheme is always rendered as `http://` since the downstream matcher
/// treats http and https identically. Host labels are reversed and joined
/// with commas; the path and query are appended verbatim. A bare host
/// (root path, no query) yields the open, comma-terminated form so that
/// subdomain matching is the default before scope narrowing is applied —
/// `http://example.com` and `http://example.com/` canonicalize identically.
///
/// Returns `None` if no host can be parsed out of the URL; callers log the
/// drop with their own context.
///
/// # Examples
///
/// ```
/// use seedlist::acl::canonicalize;
///
/// let form = canonicalize("https://www.example.co.uk/").unwrap();
/// assert_eq!(form.to_string(), "http://(uk,co,example,www,");
///
/// let form = canonicalize("http://example.com/about?lang=en").unwrap();
/// assert_eq!(form.to_string(), "http://(com,example)/about?lang=en");
///
/// assert!(canonicalize("mailto:curator@example.com").is_none());
/// ```
pub fn canonicalize(url: &str) -> Option<CanonicalForm> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let labels: Vec<String> = host
        .split('.')
        .filter(|label| !label.is_empty())
        .rev()
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return None;
    }

    let path = parsed.path();
    let path_query = if (path.is_empty() || path == "/") && parsed.query().is_none() {
        None
    } else {
        let mut path_query = path.to_string();
        if let Some(query) = parsed.query() {
            path_query.push('?');
            path_query.push_str(query);
        }
        Some(path_query)
    };

    Some(CanonicalForm {
        labels,
        port: parsed.port(),
        path_query,
        closed: false,
    })
}

//! Clone URL normalization

/// Suffix git hosting services accept on repository URLs
const GIT_SUFFIX: &str = ".git";

/// Normalize a clone URL for comparison
///
/// Trims whitespace and trailing slashes, then appends `.git` if absent, so
/// `https://host/org/name`, `https://host/org/name/` and
/// `https://host/org/name.git` all normalize to the same string.
pub fn normalize_clone_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.ends_with(GIT_SUFFIX) {
        url.to_string()
    } else {
        format!("{}{}", url, GIT_SUFFIX)
    }
}

/// Whether two clone URLs refer to the same repository
pub fn same_clone_url(a: &str, b: &str) -> bool {
    normalize_clone_url(a) == normalize_clone_url(b)
}

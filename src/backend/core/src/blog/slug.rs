//! Slug derivation from blog titles.

/// Derive a URL slug from a title.
///
/// Lowercases, collapses whitespace runs to single hyphens, then strips any
/// character outside `[a-z0-9_-]`. Slugs are unique across blogs; uniqueness
/// is enforced by the database.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

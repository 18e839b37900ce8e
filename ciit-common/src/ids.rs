//! Identifier helpers
//!
//! Session and idea ids are time-derived (`session-<millis>`, `idea-<millis>`)
//! so they sort by creation instant and stay unique per creation instant.
//! Concept ids are slugs derived from the concept name.

use chrono::Utc;

/// Generate a session identifier from the current wall clock.
pub fn session_id() -> String {
    format!("session-{}", Utc::now().timestamp_millis())
}

/// Generate an idea identifier from the current wall clock.
pub fn idea_id() -> String {
    format!("idea-{}", Utc::now().timestamp_millis())
}

/// Derive a concept id from its display name: lowercase, every run of
/// non-alphanumerics collapses to a single hyphen, leading/trailing hyphens
/// trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;
    for c in name.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug
}

/// Whether an id is safe to interpolate into a storage filename.
///
/// Rejects anything that could traverse out of the data folder; only
/// alphanumerics, hyphen and underscore ever appear in generated ids.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() < 100
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("Acme Fund"), "acme-fund");
        assert_eq!(slugify("  Green -- Bonds! "), "green-bonds");
        assert_eq!(slugify("CO2 (captured)"), "co2-captured");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn generated_ids_are_safe() {
        assert!(is_safe_id(&session_id()));
        assert!(is_safe_id(&idea_id()));
        assert!(is_safe_id(&slugify("Acme Fund")));
    }

    #[test]
    fn unsafe_ids_rejected() {
        assert!(!is_safe_id(""));
        assert!(!is_safe_id("../etc/passwd"));
        assert!(!is_safe_id("a/b"));
        assert!(!is_safe_id("a.json"));
    }
}

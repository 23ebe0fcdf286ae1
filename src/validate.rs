//! Input validation and intent detection.
//!
//! Login codes are checked locally before any network call. Collection
//! names typed on the command line resolve in three tiers: exact match,
//! synonym lookup, error with a suggestion.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::model::EntityType;

/// Check that `code` is exactly `length` ASCII letters or digits.
///
/// # Errors
///
/// Returns a human-readable reason on failure.
pub fn validate_login_code(code: &str, length: usize) -> Result<(), String> {
    let count = code.chars().count();
    if count != length {
        return Err(format!("expected {length} characters, got {count}"));
    }
    if let Some(bad) = code.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(format!("'{bad}' is not a letter or digit"));
    }
    Ok(())
}

// ── Collections ──────────────────────────────────────────────

/// A collection the command line can refresh or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Announcements,
    Info,
    Events,
    Lecturers,
    Forum,
}

impl Collection {
    pub const ALL: [Self; 5] = [
        Self::Announcements,
        Self::Info,
        Self::Events,
        Self::Lecturers,
        Self::Forum,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Announcements => "announcements",
            Self::Info => "info",
            Self::Events => "events",
            Self::Lecturers => "lecturers",
            Self::Forum => "forum",
        }
    }

    /// Entity type stored for this collection.
    #[must_use]
    pub const fn entity(self) -> EntityType {
        match self {
            Self::Announcements => EntityType::Announcement,
            Self::Info => EntityType::GeneralInfo,
            Self::Events => EntityType::Event,
            Self::Lecturers => EntityType::Lecturer,
            Self::Forum => EntityType::ForumThread,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_collection(s) {
            Ok(canonical) => Self::ALL
                .into_iter()
                .find(|c| c.as_str() == canonical)
                .ok_or_else(|| format!("unknown collection '{s}'")),
            Err((input, Some(suggestion))) => Err(format!(
                "unknown collection '{input}' (did you mean '{suggestion}'?)"
            )),
            Err((input, None)) => Err(format!("unknown collection '{input}'")),
        }
    }
}

pub static VALID_COLLECTIONS: LazyLock<HashSet<&str>> =
    LazyLock::new(|| Collection::ALL.iter().map(|c| c.as_str()).collect());

pub static COLLECTION_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("announcement", "announcements"),
        ("news", "announcements"),
        ("general", "info"),
        ("generalinfo", "info"),
        ("general_info", "info"),
        ("information", "info"),
        ("event", "events"),
        ("calendar", "events"),
        ("schedule", "events"),
        ("lecturer", "lecturers"),
        ("speakers", "lecturers"),
        ("people", "lecturers"),
        ("threads", "forum"),
        ("thread", "forum"),
        ("discussion", "forum"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a collection name via exact match or synonym lookup.
///
/// Returns the canonical name, or an error with the original input
/// and an optional suggestion.
pub fn normalize_collection(input: &str) -> Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    if VALID_COLLECTIONS.contains(lower.as_str()) {
        return Ok(lower);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = COLLECTION_SYNONYMS.get(lower.as_str()) {
        return Ok(canonical.to_string());
    }

    // Tier 3: find closest suggestion
    let suggestion = find_closest_match(&lower, &VALID_COLLECTIONS, &COLLECTION_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            let canonical = synonyms.get(v).copied().unwrap_or(v);
            best = Some((canonical, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_code_accepts_exact_alphanumeric() {
        assert!(validate_login_code("AB12CD34", 8).is_ok());
        assert!(validate_login_code("abcdefgh", 8).is_ok());
    }

    #[test]
    fn test_login_code_rejects_length_and_symbols() {
        assert!(validate_login_code("AB12CD3", 8).is_err());
        assert!(validate_login_code("AB12CD345", 8).is_err());
        assert!(validate_login_code("", 8).is_err());
        assert!(validate_login_code("AB12-D34", 8).unwrap_err().contains("'-'"));
        assert!(validate_login_code("AB12 D34", 8).is_err());
        assert!(validate_login_code("AB12CDé4", 8).is_err());
    }

    #[test]
    fn test_normalize_collection() {
        assert_eq!(normalize_collection("events"), Ok("events".to_string()));
        assert_eq!(normalize_collection("Calendar"), Ok("events".to_string()));
        assert_eq!(normalize_collection("news"), Ok("announcements".to_string()));
        assert!(normalize_collection("nonsense").is_err());
    }

    #[test]
    fn test_collection_suggestion() {
        let err = normalize_collection("lectures").unwrap_err();
        assert_eq!(err.1.as_deref(), Some("lecturers"));

        let err = "forun".parse::<Collection>().unwrap_err();
        assert!(err.contains("did you mean 'forum'"));
    }

    #[test]
    fn test_collection_entity() {
        assert_eq!("info".parse::<Collection>().unwrap().entity(), EntityType::GeneralInfo);
        assert_eq!(Collection::Forum.entity(), EntityType::ForumThread);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }
}

//! Content fingerprints for cached collections.
//!
//! A fingerprint is the SHA256 of the rows' canonical JSON text, one row per
//! line, in committed order. Two replaces with the same rows in the same
//! order produce the same fingerprint.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Fingerprint an ordered list of rows.
#[must_use]
pub fn content_hash(rows: &[Value]) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        hasher.update(row.to_string().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Check whether a collection differs from a stored fingerprint.
///
/// Returns `true` when there is no stored fingerprint.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_hash_deterministic() {
        let rows = vec![json!({"id": "1"}), json!({"id": "2"})];

        let hash1 = content_hash(&rows);
        let hash2 = content_hash(&rows);

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_content_hash_depends_on_order() {
        let a = vec![json!({"id": "1"}), json!({"id": "2"})];
        let b = vec![json!({"id": "2"}), json!({"id": "1"})];
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_has_changed() {
        assert!(has_changed("abc123", None));
        assert!(has_changed("abc123", Some("xyz789")));
        assert!(!has_changed("abc123", Some("abc123")));
    }
}

//! Cache key derivation: header fingerprints and content hashes

use sha2::{Digest, Sha256};

/// Separator for joined header fingerprints. U+001F (unit separator) does not
/// occur in real column names, so membership differences always change the
/// fingerprint.
pub const FINGERPRINT_SEPARATOR: char = '\u{1f}';

/// Derive a stable, order-independent fingerprint from a list of column names.
///
/// Headers are trimmed, lowercased, sorted, then joined. Two header lists that
/// are permutations of each other (after normalization) produce the same
/// fingerprint; lists differing in membership produce different ones.
///
/// An empty input maps to the empty string, which callers must treat as
/// "no usable signal" rather than a valid cache key.
pub fn fingerprint<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = items
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .collect();
    normalized.sort();
    normalized.join(&FINGERPRINT_SEPARATOR.to_string())
}

/// SHA-256 content hash of a structured payload, hex-encoded.
///
/// Used as the cache key for arbitrary structured payloads (report
/// summarization). The same value always serializes to the same string, so
/// identical payloads hash identically.
pub fn content_hash(payload: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_order_independent() {
        let a = fingerprint(["Date", "Pair", "Executed", "Fee"]);
        let b = fingerprint(["Fee", "Executed", "Date", "Pair"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_case_and_whitespace_folded() {
        let a = fingerprint(["  Date ", "PAIR"]);
        let b = fingerprint(["date", "pair"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_membership_sensitive() {
        let a = fingerprint(["date", "pair", "executed"]);
        let b = fingerprint(["date", "pair"]);
        let c = fingerprint(["date", "pair", "fee"]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_fingerprint_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(fingerprint(empty), "");
    }

    #[test]
    fn test_content_hash_deterministic() {
        let payload = json!({"period": "2025-06", "volume": 1234.5});
        assert_eq!(content_hash(&payload), content_hash(&payload));
        assert_ne!(
            content_hash(&payload),
            content_hash(&json!({"period": "2025-07", "volume": 1234.5}))
        );
    }
}

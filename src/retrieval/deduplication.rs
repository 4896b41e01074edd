//! Result deduplication by chunk id and by whitespace-normalized text

use crate::chunking::ChunkRecord;
use ahash::AHashSet;

/// Collapse every whitespace run to a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tracks the dedup keys of records already accepted
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen_ids: AHashSet<String>,
    seen_texts: AHashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `record` unless its id or normalized text was seen before.
    pub fn admit(&mut self, record: &ChunkRecord) -> bool {
        if self.seen_ids.contains(&record.id) {
            return false;
        }
        let normalized = normalize_whitespace(&record.text);
        if self.seen_texts.contains(&normalized) {
            return false;
        }
        self.seen_ids.insert(record.id.clone());
        self.seen_texts.insert(normalized);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str) -> ChunkRecord {
        ChunkRecord::new(id, text, "test")
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  the \t quick\n\nfox "), "the quick fox");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_deduplication() {
        let records = vec![
            record("a", "the quick fox"),
            record("b", "the   quick  fox"), // same text
            record("a", "something else"),  // same id
            record("c", "lazy dog"),
        ];

        let mut dedup = Deduplicator::new();
        let ids: Vec<&str> = records
            .iter()
            .filter(|r| dedup.admit(r))
            .map(|r| r.id.as_str())
            .collect();

        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_rejected_keys_are_not_recorded() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.admit(&ChunkRecord::new("a", "alpha", "s")));
        // rejected on id, so "beta" is never registered
        assert!(!dedup.admit(&ChunkRecord::new("a", "beta", "s")));
        assert!(dedup.admit(&ChunkRecord::new("b", "beta", "s")));
    }
}

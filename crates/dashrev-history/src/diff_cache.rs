//! Memoized diff payloads

use std::collections::HashMap;

use crate::models::{DiffFormat, DiffPayload};

/// Cache key: the compared pair plus the format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiffKey {
    /// Older version of the pair
    pub original: u32,
    /// Newer version of the pair
    pub new: u32,
    /// Rendering the payload was fetched in
    pub format: DiffFormat,
}

impl DiffKey {
    /// Key for a pair in a format
    pub fn new(original: u32, new: u32, format: DiffFormat) -> Self {
        Self {
            original,
            new,
            format,
        }
    }
}

/// Diff payloads fetched for the current comparison session
///
/// Only successful fetches are stored. Entries live until the next list-mode
/// reset clears the cache.
#[derive(Debug, Default, Clone)]
pub struct DiffCache {
    entries: HashMap<DiffKey, DiffPayload>,
}

impl DiffCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached payload for a key
    pub fn get(&self, key: &DiffKey) -> Option<&DiffPayload> {
        self.entries.get(key)
    }

    /// Store a payload
    pub fn insert(&mut self, key: DiffKey, payload: DiffPayload) {
        self.entries.insert(key, payload);
    }

    /// Formats cached for a pair
    pub fn formats_for(&self, original: u32, new: u32) -> Vec<DiffFormat> {
        self.entries
            .keys()
            .filter(|k| k.original == original && k.new == new)
            .map(|k| k.format.clone())
            .collect()
    }

    /// Number of cached payloads
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every payload
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_requires_same_pair_and_format() {
        let mut cache = DiffCache::new();
        cache.insert(
            DiffKey::new(4, 6, DiffFormat::Basic),
            DiffPayload::from(json!({"delta": 1})),
        );

        assert!(cache.get(&DiffKey::new(4, 6, DiffFormat::Basic)).is_some());
        assert!(cache.get(&DiffKey::new(4, 6, DiffFormat::Html)).is_none());
        assert!(cache.get(&DiffKey::new(5, 6, DiffFormat::Basic)).is_none());
    }

    #[test]
    fn test_formats_for_pair() {
        let mut cache = DiffCache::new();
        cache.insert(DiffKey::new(4, 6, DiffFormat::Basic), DiffPayload::empty());
        cache.insert(DiffKey::new(4, 6, DiffFormat::Json), DiffPayload::empty());
        cache.insert(DiffKey::new(1, 2, DiffFormat::Basic), DiffPayload::empty());

        let mut formats = cache.formats_for(4, 6);
        formats.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(formats, vec![DiffFormat::Basic, DiffFormat::Json]);
    }

    #[test]
    fn test_clear() {
        let mut cache = DiffCache::new();
        cache.insert(DiffKey::new(4, 6, DiffFormat::Basic), DiffPayload::empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}

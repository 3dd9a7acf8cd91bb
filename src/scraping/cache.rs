//! TTL cache for resolved link metadata.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::scraping::config::CacheConfig;
use crate::scraping::types::LinkMetadata;

/// Cache entry with TTL.
#[derive(Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe cache of metadata keyed by page URL.
pub struct MetadataCache {
    config: CacheConfig,
    entries: DashMap<String, CacheEntry<LinkMetadata>>,
}

impl MetadataCache {
    /// Create a new cache with the given configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    /// Get cached metadata for a URL, evicting it if stale.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<LinkMetadata> {
        if !self.config.enabled {
            return None;
        }

        let entry = self.entries.get(url)?;
        if entry.is_expired() {
            drop(entry);
            self.entries.remove(url);
            None
        } else {
            Some(entry.data.clone())
        }
    }

    /// Cache resolved metadata.
    pub fn insert(&self, url: &str, metadata: &LinkMetadata) {
        if !self.config.enabled {
            return;
        }

        self.enforce_max_entries();

        let ttl = Duration::from_secs(self.config.metadata_ttl_seconds);
        self.entries
            .insert(url.to_string(), CacheEntry::new(metadata.clone(), ttl));
    }

    /// Number of live (possibly expired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries, then the soonest-to-expire ones, until there is room.
    fn enforce_max_entries(&self) {
        if self.entries.len() < self.config.max_entries {
            return;
        }

        self.entries.retain(|_, entry| !entry.is_expired());

        while self.entries.len() >= self.config.max_entries.max(1) {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().expires_at)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(title: &str) -> LinkMetadata {
        LinkMetadata {
            source_url: format!("https://example.com/{title}"),
            title: title.to_string(),
            description: "desc".to_string(),
            thumbnail_url: None,
            site_domain: Some("example.com".to_string()),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = MetadataCache::new(CacheConfig::default());
        cache.insert("https://example.com/a", &metadata("a"));
        assert_eq!(cache.get("https://example.com/a"), Some(metadata("a")));
        assert_eq!(cache.get("https://example.com/b"), None);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = MetadataCache::new(CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        });
        cache.insert("https://example.com/a", &metadata("a"));
        assert!(cache.is_empty());
        assert_eq!(cache.get("https://example.com/a"), None);
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let config = CacheConfig {
            metadata_ttl_seconds: 0,
            ..CacheConfig::default()
        };
        let cache = MetadataCache::new(config);
        cache.insert("https://example.com/a", &metadata("a"));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("https://example.com/a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_max_entries_enforced() {
        let config = CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        };
        let cache = MetadataCache::new(config);
        cache.insert("a", &metadata("a"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b", &metadata("b"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c", &metadata("c"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert!(cache.get("c").is_some());
    }
}

//! Configuration for the scraping module.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Browser-like user agent sent with page fetches.
pub const PAGE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 MikaBot/1.0";

/// Client identifier sent with image probes.
pub const IMAGE_USER_AGENT: &str = "MikaBotImageFetcher/1.0";

/// Configuration for the link preview service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapingConfig {
    /// Timeout for the page fetch.
    #[serde(with = "duration_serde")]
    pub page_timeout: Duration,
    /// Timeout for a single image probe.
    #[serde(with = "duration_serde")]
    pub image_timeout: Duration,
    /// Connection timeout shared by both clients.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
    /// User agent for page fetches.
    pub page_user_agent: String,
    /// User agent for image probes.
    pub image_user_agent: String,
    /// Accept-Language header for page fetches.
    pub accept_language: String,
    /// Maximum page size to download (bytes).
    pub max_page_bytes: usize,
    /// Maximum image size to download while probing (bytes).
    pub max_image_bytes: usize,
    /// Both sides of a scanned `<img>` must be strictly larger than this.
    pub min_thumbnail_dimension: u32,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Cache configuration.
    pub cache_config: CacheConfig,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(10),
            image_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            page_user_agent: PAGE_USER_AGENT.to_string(),
            image_user_agent: IMAGE_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            max_page_bytes: 5 * 1024 * 1024,   // 5 MB
            max_image_bytes: 10 * 1024 * 1024, // 10 MB
            min_thumbnail_dimension: 80,
            max_redirects: 10,
            cache_config: CacheConfig::default(),
        }
    }
}

impl ScrapingConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page fetch timeout.
    #[must_use]
    pub const fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Set the image probe timeout.
    #[must_use]
    pub const fn with_image_timeout(mut self, timeout: Duration) -> Self {
        self.image_timeout = timeout;
        self
    }

    /// Replace the cache configuration.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache_config = cache;
        self
    }
}

/// Cache configuration for resolved link metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// TTL for resolved metadata (seconds).
    pub metadata_ttl_seconds: u64,
    /// Maximum cache size (number of entries).
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            metadata_ttl_seconds: 3600, // 1 hour
            max_entries: 500,
        }
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScrapingConfig::default();
        assert_eq!(config.page_timeout, Duration::from_secs(10));
        assert_eq!(config.image_timeout, Duration::from_secs(5));
        assert_eq!(config.min_thumbnail_dimension, 80);
        assert!(config.page_user_agent.ends_with("MikaBot/1.0"));
        assert!(config.cache_config.enabled);
    }

    #[test]
    fn test_config_builder() {
        let config = ScrapingConfig::new()
            .with_page_timeout(Duration::from_millis(250))
            .with_image_timeout(Duration::from_millis(100))
            .with_cache(CacheConfig {
                enabled: false,
                ..CacheConfig::default()
            });

        assert_eq!(config.page_timeout, Duration::from_millis(250));
        assert_eq!(config.image_timeout, Duration::from_millis(100));
        assert!(!config.cache_config.enabled);
    }

    #[test]
    fn test_duration_serde_roundtrip() {
        let config = ScrapingConfig::new().with_page_timeout(Duration::from_millis(1500));
        let json = serde_json::to_string(&config).unwrap_or_default();
        let parsed: Result<ScrapingConfig, _> = serde_json::from_str(&json);
        assert!(parsed.is_ok());
        if let Ok(parsed) = parsed {
            assert_eq!(parsed.page_timeout, Duration::from_millis(1500));
        }
    }
}

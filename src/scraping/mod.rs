//! Link scraping for rich previews.
//!
//! This module provides:
//! - Link detection in chat text
//! - Page fetching with browser-like headers and bounded bodies
//! - Open Graph / Twitter-card / HTML fallback metadata resolution
//! - Thumbnail vetting through an image dimension probe
//! - Caching with TTL

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod images;
pub mod metadata;
pub mod types;
pub mod urls;

pub use cache::MetadataCache;
pub use config::{CacheConfig, ScrapingConfig};
pub use error::{ScrapingError, ScrapingResult};
pub use images::{HttpImageProber, ImageProbe};
pub use types::{ImageDimensions, LinkMetadata, PageTags};
pub use urls::{find_urls, first_url};

use std::sync::Arc;

use url::Url;

/// Main scraping service that resolves link previews.
pub struct LinkPreviewService {
    config: ScrapingConfig,
    cache: MetadataCache,
    client: reqwest::Client,
    probe: Arc<dyn ImageProbe>,
}

impl LinkPreviewService {
    /// Create a new service with the given configuration.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be created.
    pub fn new(config: ScrapingConfig) -> ScrapingResult<Self> {
        let probe: Arc<dyn ImageProbe> = Arc::new(HttpImageProber::new(&config)?);
        Self::with_probe(config, probe)
    }

    /// Create a new service with default configuration.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be created.
    pub fn with_defaults() -> ScrapingResult<Self> {
        Self::new(ScrapingConfig::default())
    }

    /// Create a service around a custom image probe.
    ///
    /// # Errors
    /// Returns an error if the page client cannot be created.
    pub fn with_probe(config: ScrapingConfig, probe: Arc<dyn ImageProbe>) -> ScrapingResult<Self> {
        let client = http::page_client(&config)?;
        let cache = MetadataCache::new(config.cache_config.clone());

        Ok(Self {
            config,
            cache,
            client,
            probe,
        })
    }

    /// Resolve preview metadata for the first link in `text`, if any.
    pub async fn preview_for_message(&self, text: &str) -> Option<LinkMetadata> {
        let url = first_url(text)?;
        self.resolve(&url).await
    }

    /// Resolve preview metadata for a page URL.
    ///
    /// `None` means the page could not be fetched; every other shortfall is
    /// filled with defaults.
    pub async fn resolve(&self, url: &Url) -> Option<LinkMetadata> {
        if let Some(cached) = self.cache.get(url.as_str()) {
            tracing::debug!("Cache hit for URL: {url}");
            return Some(cached);
        }

        let metadata =
            metadata::resolve_metadata(&self.client, self.probe.as_ref(), url, &self.config)
                .await?;

        self.cache.insert(url.as_str(), &metadata);
        Some(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_service_creation() {
        let service = LinkPreviewService::with_defaults();
        assert!(service.is_ok());
    }

    #[tokio::test]
    async fn test_message_without_link_resolves_nothing() {
        let service = LinkPreviewService::with_defaults().expect("service");
        assert_eq!(service.preview_for_message("just chatting").await, None);
    }

    #[tokio::test]
    async fn test_only_first_link_is_fetched_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/first"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<title>The First Page</title>"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/second"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = LinkPreviewService::with_defaults().expect("service");
        let text = format!("{uri}/first and {uri}/second", uri = server.uri());

        let first = service.preview_for_message(&text).await.expect("metadata");
        assert_eq!(first.title, "The First Page");

        let again = service.preview_for_message(&text).await;
        assert_eq!(again, Some(first));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let service = LinkPreviewService::with_defaults().expect("service");
        let url = Url::parse(&format!("{}/flaky", server.uri())).expect("url");
        assert_eq!(service.resolve(&url).await, None);
        assert_eq!(service.resolve(&url).await, None);
        server.verify().await;
    }
}

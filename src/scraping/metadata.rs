//! Link metadata resolution with ranked fallbacks.
//!
//! Title, description and thumbnail each resolve on their own: a page with
//! no usable image still gets a title, and vice versa. Only a failed page
//! fetch yields no metadata at all.

use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::scraping::config::ScrapingConfig;
use crate::scraping::http;
use crate::scraping::images::ImageProbe;
use crate::scraping::types::{LinkMetadata, PageTags};
use crate::scraping::urls::{absolutize, has_raster_extension, is_http_like, site_domain};

/// Title used when the page offers nothing better.
pub const PLACEHOLDER_TITLE: &str = "✨ Celestial Link Preview ✨";

/// Description used when the scraped one is missing or too short.
pub const FILLER_DESCRIPTION: &str =
    "✨ Glimmering with cosmic insight. A refined experience. Mika's touch ensures beauty and clarity. 💎";

/// Scraped descriptions must be longer than this to be shown.
const MIN_DESCRIPTION_CHARS: usize = 50;
/// Scraped descriptions are cut to this many characters.
const MAX_DESCRIPTION_CHARS: usize = 300;
/// Titles shorter than this trigger the URL-path fallback.
const MIN_TITLE_CHARS: usize = 5;

/// Fetch `page_url` and resolve its preview metadata.
///
/// Returns `None` only when the page itself cannot be fetched (transport
/// error, timeout, non-success status, oversized body).
pub async fn resolve_metadata(
    client: &reqwest::Client,
    probe: &dyn ImageProbe,
    page_url: &Url,
    config: &ScrapingConfig,
) -> Option<LinkMetadata> {
    let html = match http::get_capped_text(client, page_url.as_str(), config.max_page_bytes).await {
        Ok(html) => html,
        Err(err) => {
            warn!(url = %page_url, %err, "Failed to fetch page metadata");
            return None;
        }
    };

    let tags = extract_tags(&html);
    debug!(url = %page_url, images = tags.img_sources.len(), "Parsed page tags");

    Some(build_metadata(&tags, page_url, probe, config.min_thumbnail_dimension).await)
}

/// Assemble metadata from already-extracted tags.
pub async fn build_metadata(
    tags: &PageTags,
    page_url: &Url,
    probe: &dyn ImageProbe,
    min_thumbnail_dimension: u32,
) -> LinkMetadata {
    let thumbnail_url = resolve_thumbnail(tags, page_url, probe, min_thumbnail_dimension).await;

    LinkMetadata {
        source_url: page_url.to_string(),
        title: resolve_title(tags, page_url),
        description: resolve_description(tags),
        thumbnail_url,
        site_domain: site_domain(page_url),
    }
}

/// Pull every tag the resolver cares about out of an HTML document.
#[must_use]
pub fn extract_tags(html: &str) -> PageTags {
    let document = Html::parse_document(html);

    PageTags {
        og_title: meta_content(&document, "property", "og:title"),
        twitter_title: meta_content(&document, "name", "twitter:title"),
        html_title: element_text(&document, "title"),
        og_description: meta_content(&document, "property", "og:description"),
        twitter_description: meta_content(&document, "name", "twitter:description"),
        meta_description: meta_content(&document, "name", "description"),
        og_image: meta_content(&document, "property", "og:image"),
        twitter_image: meta_content(&document, "name", "twitter:image"),
        img_sources: img_sources(&document),
    }
}

/// `content` of the first `<meta {attr}="{key}">`, trimmed and non-empty.
fn meta_content(document: &Html, attr: &str, key: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[{attr}='{key}']")).ok()?;
    document
        .select(&selector)
        .find_map(|element| element.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(String::from)
}

fn element_text(document: &Html, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn img_sources(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(String::from)
        .collect()
}

/// Title: `og:title`, `twitter:title`, `<title>`, then the placeholder.
///
/// Weak results (placeholder or under five characters) fall back to a title
/// derived from the last URL path segment when that is a sensible length.
#[must_use]
pub fn resolve_title(tags: &PageTags, page_url: &Url) -> String {
    let title = tags
        .og_title
        .as_deref()
        .or(tags.twitter_title.as_deref())
        .or(tags.html_title.as_deref())
        .unwrap_or(PLACEHOLDER_TITLE);

    let weak = title.is_empty()
        || title == PLACEHOLDER_TITLE
        || title.chars().count() < MIN_TITLE_CHARS;

    if weak {
        if let Some(derived) = title_from_path(page_url) {
            return derived;
        }
    }

    if title.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// `/blog/my-cool_post` becomes `My Cool Post`.
fn title_from_path(page_url: &Url) -> Option<String> {
    let raw = page_url.path().rsplit('/').next()?;
    let segment = percent_decode_str(raw).decode_utf8_lossy();
    if segment.chars().count() <= 2 {
        return None;
    }

    let candidate = segment.replace(['-', '_'], " ");
    let len = candidate.chars().count();
    (MIN_TITLE_CHARS..60)
        .contains(&len)
        .then(|| title_case(&candidate))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

/// Description: `og:description`, `twitter:description`, `meta description`.
///
/// Substantial text is clipped and given a heart prefix; anything shorter is
/// replaced with the themed filler.
#[must_use]
pub fn resolve_description(tags: &PageTags) -> String {
    let scraped = tags
        .og_description
        .as_deref()
        .or(tags.twitter_description.as_deref())
        .or(tags.meta_description.as_deref())
        .unwrap_or_default();

    if scraped.chars().count() > MIN_DESCRIPTION_CHARS {
        let clipped: String = scraped.chars().take(MAX_DESCRIPTION_CHARS).collect();
        format!("💖 {clipped}...")
    } else {
        FILLER_DESCRIPTION.to_string()
    }
}

/// Thumbnail: meta-tag images first (trusted), else scanned `<img>` tags
/// that pass the dimension probe.
pub async fn resolve_thumbnail(
    tags: &PageTags,
    page_url: &Url,
    probe: &dyn ImageProbe,
    min_dimension: u32,
) -> Option<String> {
    let declared: Vec<&str> = [tags.og_image.as_deref(), tags.twitter_image.as_deref()]
        .into_iter()
        .flatten()
        .collect();

    if !declared.is_empty() {
        return declared
            .into_iter()
            .find_map(|candidate| accept_candidate(candidate, page_url));
    }

    for src in &tags.img_sources {
        if !src.starts_with("http") || !has_raster_extension(src) {
            continue;
        }

        let Some(dims) = probe.dimensions(src).await else {
            continue;
        };

        if !dims.exceeds(min_dimension) {
            debug!(src = %src, width = dims.width, height = dims.height, "Image too small for thumbnail");
            continue;
        }

        if let Some(accepted) = accept_candidate(src, page_url) {
            return Some(accepted);
        }
    }

    None
}

fn accept_candidate(candidate: &str, page_url: &Url) -> Option<String> {
    absolutize(candidate, page_url).filter(|url| is_http_like(url) && has_raster_extension(url))
}

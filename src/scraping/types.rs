//! Core types for link scraping results.

use serde::{Deserialize, Serialize};

/// Best-effort metadata resolved for a shared link.
///
/// `title` and `description` are never empty; the resolver substitutes
/// themed defaults when the page offers nothing usable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    /// The URL as it appeared in the message.
    pub source_url: String,
    /// Resolved title.
    pub title: String,
    /// Resolved, already-stylized description.
    pub description: String,
    /// Absolute thumbnail URL, if a usable candidate was found.
    pub thumbnail_url: Option<String>,
    /// Host of the page URL.
    pub site_domain: Option<String>,
}

/// Pixel dimensions reported by the image prober.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Create dimensions from a `(width, height)` pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both sides are strictly larger than `min`.
    #[must_use]
    pub const fn exceeds(&self, min: u32) -> bool {
        self.width > min && self.height > min
    }
}

/// Raw metadata tags lifted out of a parsed HTML document.
///
/// Holding owned strings lets the DOM be dropped before any further
/// awaiting (the `scraper` tree is not `Send`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageTags {
    /// `og:title` content.
    pub og_title: Option<String>,
    /// `twitter:title` content.
    pub twitter_title: Option<String>,
    /// Text of the `<title>` element.
    pub html_title: Option<String>,
    /// `og:description` content.
    pub og_description: Option<String>,
    /// `twitter:description` content.
    pub twitter_description: Option<String>,
    /// `<meta name="description">` content.
    pub meta_description: Option<String>,
    /// `og:image` content.
    pub og_image: Option<String>,
    /// `twitter:image` content.
    pub twitter_image: Option<String>,
    /// Every `<img src>` value in document order.
    pub img_sources: Vec<String>,
}

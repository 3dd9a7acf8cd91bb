//! Link detection in chat text and URL helpers shared by the resolver.

use url::Url;

/// Raster image extensions accepted for thumbnails.
pub const RASTER_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

/// Scan free text for absolute HTTP(S) links.
///
/// The text is split on whitespace and each token is kept only if it starts
/// with `http://` or `https://` and parses into a URL with a host. Malformed
/// tokens are skipped. Order of appearance is preserved.
#[must_use]
pub fn find_urls(text: &str) -> Vec<Url> {
    text.split_whitespace()
        .filter(|token| token.starts_with("http://") || token.starts_with("https://"))
        .filter_map(|token| Url::parse(token).ok())
        .filter(is_web_url)
        .collect()
}

/// First link in the text, if any. Only this one gets a preview.
#[must_use]
pub fn first_url(text: &str) -> Option<Url> {
    find_urls(text).into_iter().next()
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
}

/// Whether a URL string starts with an HTTP(S) scheme.
#[must_use]
pub fn is_http_like(candidate: &str) -> bool {
    candidate.starts_with("http://") || candidate.starts_with("https://")
}

/// Whether a URL string ends in a recognized raster extension.
#[must_use]
pub fn has_raster_extension(candidate: &str) -> bool {
    let lower = candidate.to_ascii_lowercase();
    RASTER_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Resolve a potentially relative URL against the page URL.
///
/// Strings already starting with `http` are returned untouched; anything that
/// cannot be joined yields `None`.
#[must_use]
pub fn absolutize(candidate: &str, base_url: &Url) -> Option<String> {
    if candidate.starts_with("http") {
        return Some(candidate.to_string());
    }

    base_url.join(candidate).ok().map(String::from)
}

/// Host (with explicit port, if any) of a page URL.
#[must_use]
pub fn site_domain(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

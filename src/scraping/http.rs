//! HTTP clients and bounded body download shared by the resolver and prober.

use encoding_rs::{Encoding, UTF_8};
use futures::StreamExt;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;

use crate::scraping::config::ScrapingConfig;
use crate::scraping::error::{ScrapingError, ScrapingResult};

/// Build the client used for page fetches (browser-like headers, redirects).
///
/// # Errors
/// Returns an error if the HTTP client cannot be created.
pub fn page_client(config: &ScrapingConfig) -> ScrapingResult<reqwest::Client> {
    let mut headers = HeaderMap::new();

    if let Ok(ua) = HeaderValue::from_str(&config.page_user_agent) {
        headers.insert(USER_AGENT, ua);
    }

    if let Ok(accept) = HeaderValue::from_str(
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ) {
        headers.insert(ACCEPT, accept);
    }

    if let Ok(lang) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, lang);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.page_timeout)
        .connect_timeout(config.connect_timeout)
        .redirect(Policy::limited(config.max_redirects))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| ScrapingError::HttpClient(e.to_string()))
}

/// Build the client used for image probes (identifier header, short timeout).
///
/// # Errors
/// Returns an error if the HTTP client cannot be created.
pub fn image_client(config: &ScrapingConfig) -> ScrapingResult<reqwest::Client> {
    let mut headers = HeaderMap::new();

    if let Ok(ua) = HeaderValue::from_str(&config.image_user_agent) {
        headers.insert(USER_AGENT, ua);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.image_timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| ScrapingError::HttpClient(e.to_string()))
}

/// GET `url` and stream the body, refusing anything above `max_bytes`.
///
/// # Errors
/// Returns an error on transport failure, timeout, non-success status, or an
/// oversized body.
pub async fn get_capped(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> ScrapingResult<Vec<u8>> {
    fetch_capped(client, url, max_bytes)
        .await
        .map(|(_, body)| body)
}

/// Like [`get_capped`], decoding the body with the `Content-Type` charset.
///
/// Unknown or missing charsets decode as UTF-8; a byte-order mark wins over
/// the header.
///
/// # Errors
/// Same as [`get_capped`].
pub async fn get_capped_text(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> ScrapingResult<String> {
    let (content_type, body) = fetch_capped(client, url, max_bytes).await?;
    let encoding = content_type
        .as_deref()
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, had_errors) = encoding.decode(&body);
    if had_errors {
        tracing::debug!(url, encoding = encoding.name(), "Body had undecodable bytes");
    }
    Ok(text.into_owned())
}

/// `charset` parameter of a `Content-Type` value, unquoted.
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

async fn fetch_capped(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> ScrapingResult<(Option<String>, Vec<u8>)> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(ScrapingError::from_request)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapingError::HttpStatus(status.as_u16()));
    }

    if let Some(len) = response.content_length() {
        if usize::try_from(len).map_or(true, |len| len > max_bytes) {
            return Err(ScrapingError::TooLarge(max_bytes));
        }
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(String::from);

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ScrapingError::from_request)?;
        if body.len() + chunk.len() > max_bytes {
            return Err(ScrapingError::TooLarge(max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((content_type, body))
}

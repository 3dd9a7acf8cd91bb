//! Error types for the scraping module.

use thiserror::Error;

/// Errors that can occur while fetching pages and probing images.
///
/// None of these ever reach the chat: the resolver and the prober turn them
/// into missing fields and log them.
#[derive(Debug, Error)]
pub enum ScrapingError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Body exceeded the configured byte cap.
    #[error("Content too large: more than {0} bytes")]
    TooLarge(usize),

    /// Image payload could not be decoded.
    #[error("Image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapingError {
    /// Classify a reqwest error, keeping timeouts distinct.
    #[must_use]
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::HttpRequest(err)
        }
    }
}

/// Convenience result alias for scraping operations.
pub type ScrapingResult<T> = Result<T, ScrapingError>;

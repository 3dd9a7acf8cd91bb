//! Image probing: fetch a candidate thumbnail and read its pixel size.

use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;

use image::ImageReader;
use tracing::debug;

use crate::scraping::config::ScrapingConfig;
use crate::scraping::error::ScrapingResult;
use crate::scraping::http;
use crate::scraping::types::ImageDimensions;

/// Boxed future returned by image probes.
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = Option<ImageDimensions>> + Send + 'a>>;

/// Anything that can tell the pixel size of a remote image.
///
/// Implementations must never fail loudly: `None` means "unknown".
pub trait ImageProbe: Send + Sync {
    /// Dimensions of the image at `url`, or `None` on any failure.
    fn dimensions<'a>(&'a self, url: &'a str) -> ProbeFuture<'a>;
}

/// HTTP-backed prober with its own short timeout and identifier header.
pub struct HttpImageProber {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageProber {
    /// Build a prober from the scraping configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ScrapingConfig) -> ScrapingResult<Self> {
        Ok(Self {
            client: http::image_client(config)?,
            max_bytes: config.max_image_bytes,
        })
    }
}

impl ImageProbe for HttpImageProber {
    fn dimensions<'a>(&'a self, url: &'a str) -> ProbeFuture<'a> {
        Box::pin(async move {
            match probe_dimensions(&self.client, url, self.max_bytes).await {
                Ok(dims) => {
                    debug!(url, width = dims.width, height = dims.height, "Probed image");
                    Some(dims)
                }
                Err(err) => {
                    debug!(url, %err, "Image probe failed");
                    None
                }
            }
        })
    }
}

/// Download an image (bounded by `max_bytes`) and decode its dimensions.
///
/// # Errors
/// Returns an error on transport failure, non-success status, oversized
/// bodies, or undecodable payloads.
pub async fn probe_dimensions(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> ScrapingResult<ImageDimensions> {
    let body = http::get_capped(client, url, max_bytes).await?;
    decode_dimensions(&body)
}

/// Read the dimensions from an in-memory image without decoding pixels.
///
/// # Errors
/// Returns an error if the format cannot be recognized or the header is
/// corrupt.
pub fn decode_dimensions(bytes: &[u8]) -> ScrapingResult<ImageDimensions> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageDimensions::new(width, height))
}

/// Encode a blank PNG of the given size.
#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png fixture");
    buf
}

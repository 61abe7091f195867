// ABOUTME: Resource handling for the darsy application
// ABOUTME: Resolves section and cover images from local paths, URLs or data URLs

use crate::errors::{LessonError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Where an image reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Local,
    Remote,
    /// Inline `data:<mime>;base64,<payload>` URL.
    Inline,
}

/// An image referenced by a lesson, resolvable to raw bytes.
#[derive(Debug, Clone)]
pub struct ImageResource {
    pub reference: String,
    pub source: ImageSource,
}

impl ImageResource {
    pub fn new(reference: &str) -> Self {
        let source = if reference.starts_with("data:") {
            ImageSource::Inline
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            ImageSource::Remote
        } else {
            ImageSource::Local
        };
        Self {
            reference: reference.to_string(),
            source,
        }
    }

    /// Load the image bytes.
    pub fn bytes(&self, timeout: Duration) -> Result<Vec<u8>> {
        match self.source {
            ImageSource::Local => self.read_local(),
            ImageSource::Remote => self.fetch_remote(timeout),
            ImageSource::Inline => decode_data_url(&self.reference).map(|(_, data)| data),
        }
    }

    /// Fetch content from a remote URL with retry capability
    fn fetch_remote(&self, timeout: Duration) -> Result<Vec<u8>> {
        info!("Fetching remote image: {}", self.reference);

        let client = Client::builder().timeout(timeout).build()?;

        // Try up to 3 times with increasing backoff
        let mut retry_delay = 500;
        let mut last_error = None;

        for attempt in 1..=3 {
            match client.get(&self.reference).send() {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response.bytes()?.to_vec());
                    }
                    last_error = Some(LessonError::ValidationError(format!(
                        "HTTP error: {}",
                        response.status()
                    )));
                }
                Err(e) => {
                    last_error = Some(LessonError::FetchError(e));
                }
            }

            info!(
                "Fetch attempt {} failed, retrying in {} ms",
                attempt, retry_delay
            );
            std::thread::sleep(Duration::from_millis(retry_delay));
            retry_delay *= 2;
        }

        Err(last_error.unwrap_or_else(|| {
            LessonError::ValidationError("Unknown error fetching image".to_string())
        }))
    }

    fn read_local(&self) -> Result<Vec<u8>> {
        info!("Reading local image: {}", self.reference);
        let path = Path::new(&self.reference);
        if !path.exists() {
            return Err(LessonError::PathNotFoundError(path.to_path_buf()));
        }
        Ok(fs::read(path)?)
    }
}

/// Split a base64 `data:` URL into its MIME type and decoded payload.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let invalid = |reason: &str| LessonError::ValidationError(format!("Invalid data URL: {}", reason));

    let rest = url.strip_prefix("data:").ok_or_else(|| invalid("missing data: prefix"))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("missing payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| invalid("only base64 payloads are supported"))?;

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&e.to_string()))?;
    Ok((mime.to_string(), data))
}

/// Read an image file into a base64 `data:` URL.
pub fn encode_data_url(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(LessonError::PathNotFoundError(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    let mime = match image::guess_format(&data)? {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::Gif => "image/gif",
        image::ImageFormat::WebP => "image/webp",
        other => {
            return Err(LessonError::ValidationError(format!(
                "Unsupported image format: {:?}",
                other
            )))
        }
    };
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(data)))
}

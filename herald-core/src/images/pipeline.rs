//! Download generated images and store normalized copies

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HeraldError, Result};
use crate::llm::RetryConfig;
use crate::llm::guard::guarded;

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// Edge length of processed images
pub const DEFAULT_TARGET_SIZE: u32 = 1024;

/// Stores hosted images locally
#[async_trait]
pub trait ImagePipeline: Send + Sync {
    /// Fetch every non-empty URL and return the processed paths.
    ///
    /// A URL that fails to download or decode is skipped, so the result
    /// never has more entries than `urls`.
    async fn fetch_all(&self, urls: &[String]) -> Vec<PathBuf>;
}

/// Local file name for an image URL: the path basename, query stripped,
/// with `.png` appended unless it already has an image extension.
pub fn file_name_for(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let base = path.rsplit('/').next().unwrap_or_default();
    let base = if base.is_empty() { "image" } else { base };

    let lower = base.to_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        base.to_string()
    } else {
        format!("{}.png", base)
    }
}

/// Decode `bytes`, convert to RGB, resize to `size` x `size` and re-encode as PNG.
pub fn normalize_image(bytes: &[u8], size: u32) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| HeraldError::Image(format!("decode failed: {}", e)))?;
    let rgb = image::imageops::resize(&decoded.to_rgb8(), size, size, FilterType::CatmullRom);

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| HeraldError::Image(format!("encode failed: {}", e)))?;
    Ok(out.into_inner())
}

/// `<stem>_processed.png` for a stored file name
fn processed_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    format!("{}_processed.png", stem)
}

/// Downloads over HTTP into a directory, creating it on first use.
///
/// The raw download is kept next to its processed copy. Both names carry
/// the prompt index so URLs sharing a basename never collide.
pub struct HttpImagePipeline {
    client: reqwest::Client,
    output_dir: PathBuf,
    timeout: Duration,
    retry: RetryConfig,
    target_size: u32,
}

impl HttpImagePipeline {
    pub fn new(output_dir: impl Into<PathBuf>, timeout: Duration, retry: RetryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            output_dir: output_dir.into(),
            timeout,
            retry,
            target_size: DEFAULT_TARGET_SIZE,
        }
    }

    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HeraldError::Api {
                service: "image host".to_string(),
                status: status.as_u16(),
                message: format!("download of {} failed", url),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_one(&self, index: usize, url: &str) -> Result<PathBuf> {
        let bytes = guarded(&self.retry, self.timeout, || self.download(url)).await?;
        let name = format!("{}_{}", index + 1, file_name_for(url));

        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(self.output_dir.join(&name), &bytes).await?;
        self.store_processed(&name, &bytes).await
    }

    async fn store_processed(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let processed = normalize_image(bytes, self.target_size)?;
        let path = self.output_dir.join(processed_name(name));
        tokio::fs::write(&path, processed).await?;
        Ok(path)
    }
}

#[async_trait]
impl ImagePipeline for HttpImagePipeline {
    async fn fetch_all(&self, urls: &[String]) -> Vec<PathBuf> {
        let mut stored = Vec::new();
        for (index, url) in urls.iter().enumerate().filter(|(_, u)| !u.is_empty()) {
            match self.fetch_one(index, url).await {
                Ok(path) => {
                    tracing::debug!(path = %path.display(), "image stored");
                    stored.push(path);
                }
                Err(e) => tracing::warn!(url = %url, error = %e, "skipping image"),
            }
        }
        stored
    }
}

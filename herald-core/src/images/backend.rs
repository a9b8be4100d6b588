//! Image-generation backends

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ImageConfig;
use crate::error::{HeraldError, Result};
use crate::llm::guard::guarded;
use crate::llm::{RetryConfig, api_error};

/// Turns a text prompt into a hosted image URL
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// OpenAI images API (DALL-E)
pub struct OpenAIImageBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    size: String,
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

impl OpenAIImageBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        let defaults = ImageConfig::default();
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: defaults.model,
            size: defaults.size,
            base_url: defaults.base_url,
            timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
        }
    }

    /// Build from the `[images]` section.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is available.
    pub fn from_config(config: &ImageConfig, timeout: Duration, retry: RetryConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            HeraldError::Configuration(
                "images.api_key or OPENAI_API_KEY is required for image generation".to_string(),
            )
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            size: config.size.clone(),
            base_url: config.base_url.clone(),
            timeout,
            retry,
        })
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let body = GenerationRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("OpenAI Images", response).await);
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| HeraldError::Image(format!("Failed to parse images response: {}", e)))?;

        first_url(parsed)
    }
}

fn first_url(response: GenerationResponse) -> Result<String> {
    response
        .data
        .into_iter()
        .find_map(|d| d.url)
        .ok_or_else(|| HeraldError::Image("images API returned no URL".to_string()))
}

#[async_trait]
impl ImageBackend for OpenAIImageBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        guarded(&self.retry, self.timeout, || self.request(prompt)).await
    }
}

/// Backend used when image generation is not configured. Every prompt fails,
/// so the image agent records placeholders instead of aborting the run.
pub struct UnconfiguredImageBackend {
    reason: String,
}

impl UnconfiguredImageBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ImageBackend for UnconfiguredImageBackend {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(HeraldError::Configuration(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_url() {
        let response: GenerationResponse = serde_json::from_value(serde_json::json!({
            "data": [{"revised_prompt": "x"}, {"url": "https://img.example/a.png"}]
        }))
        .unwrap();
        assert_eq!(first_url(response).unwrap(), "https://img.example/a.png");

        let empty: GenerationResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(first_url(empty), Err(HeraldError::Image(_))));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ImageConfig::default();
        assert!(
            OpenAIImageBackend::from_config(&config, Duration::from_secs(1), RetryConfig::no_retry())
                .is_err()
        );
    }

    #[test]
    fn test_request_body() {
        let body = GenerationRequest {
            model: "dall-e-3",
            prompt: "a lighthouse",
            n: 1,
            size: "1024x1024",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "dall-e-3");
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["n"], 1);
    }
}

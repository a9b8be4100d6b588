//! Configuration types for the Herald pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HeraldError, Result};

/// Main configuration for Herald
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HeraldConfig {
    /// LLM provider configuration (optional, falls back to provider env vars)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LLMProviderConfig>,

    /// Research and web search configuration
    pub research: ResearchConfig,

    /// Image generation configuration
    pub images: ImageConfig,

    /// LinkedIn publishing and OAuth configuration
    pub linkedin: LinkedInConfig,

    /// Result cache configuration
    pub cache: CacheConfig,

    /// Per-call time budgets
    pub timeouts: TimeoutConfig,

    /// Retry policy for transient failures
    pub retry: RetrySettings,

    /// Workflow behaviour
    pub workflow: WorkflowConfig,

    /// Persisted state
    pub persistence: PersistenceConfig,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMProviderConfig {
    /// Provider type
    pub provider: LLMProviderKind,

    /// Model name (empty means provider default)
    #[serde(default)]
    pub model: String,

    /// API key (if needed, prefer env vars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL (for custom endpoints, e.g., Ollama)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Default sampling temperature for writer agents
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    4000
}

impl LLMProviderConfig {
    /// Create a configuration for a provider with default model and sampling.
    pub fn new(provider: LLMProviderKind) -> Self {
        Self {
            provider,
            model: String::new(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// LLM provider type, chosen once when the pipeline is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProviderKind {
    OpenAI,
    Anthropic,
    Ollama,
}

impl LLMProviderKind {
    /// Parse a provider name as accepted in config and env vars.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(LLMProviderKind::OpenAI),
            "anthropic" | "claude" => Some(LLMProviderKind::Anthropic),
            "ollama" => Some(LLMProviderKind::Ollama),
            _ => None,
        }
    }
}

/// Research configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// SerpAPI key; without it the synthetic result set is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serp_api_key: Option<String>,

    /// Number of results requested from the search capability
    pub search_results_limit: usize,

    /// SerpAPI endpoint
    pub search_base_url: String,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            serp_api_key: None,
            search_results_limit: 10,
            search_base_url: "https://serpapi.com/search.json".to_string(),
        }
    }
}

/// Image generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// API key for the image endpoint (defaults to the OpenAI key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Image model name
    pub model: String,

    /// Requested image size
    pub size: String,

    /// Images API base URL
    pub base_url: String,

    /// Directory downloaded images are written to
    pub output_dir: PathBuf,

    /// Edge length processed copies are resized to
    pub target_size: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            output_dir: PathBuf::from("./generated_images"),
            target_size: 1024,
        }
    }
}

/// LinkedIn configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInConfig {
    /// Bearer token used for publishing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// OAuth client id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// OAuth redirect URI registered with the LinkedIn app
    pub redirect_uri: String,

    /// UGC posts endpoint
    pub api_url: String,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:5000/linkedin/callback".to_string(),
            api_url: "https://api.linkedin.com/v2/ugcPosts".to_string(),
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of LinkedIn writer results kept
    pub linkedin_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            linkedin_capacity: 128,
        }
    }
}

/// Time budget per external call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Text completion
    #[serde(with = "humantime_serde")]
    pub completion: Duration,

    /// Web search
    #[serde(with = "humantime_serde")]
    pub search: Duration,

    /// Image generation and download
    #[serde(with = "humantime_serde")]
    pub image: Duration,

    /// LinkedIn publish and OAuth exchange
    #[serde(with = "humantime_serde")]
    pub publish: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            completion: Duration::from_secs(120),
            search: Duration::from_secs(20),
            image: Duration::from_secs(120),
            publish: Duration::from_secs(30),
        }
    }
}

/// Retry policy for transient failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first one
    pub max_attempts: usize,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
        }
    }
}

/// What the orchestrator does when a node fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run and return the error
    #[default]
    Abort,
    /// Record the error, skip to finalize, and report partial results
    Degrade,
}

/// Workflow behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkflowConfig {
    pub failure_policy: FailurePolicy,
}

/// Persisted state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Last generated blog post
    pub blog_file: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            blog_file: PathBuf::from("blog_content.json"),
        }
    }
}

impl HeraldConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Loads in this order (later wins):
    /// 1. Built-in defaults
    /// 2. User config (`~/.config/herald/herald.toml`)
    /// 3. Project config (`./herald.toml`)
    /// 4. File named by `HERALD_CONFIG_PATH`
    /// 5. `HERALD_` prefixed environment variables, `__` separating sections
    /// 6. Well-known provider variables (`OPENAI_API_KEY`, `SERP_API_KEY`, ...)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or validation fails.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::new().merge(Serialized::defaults(HeraldConfig::default()));

        if let Some(dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(dir.join("herald").join("herald.toml")));
        }

        figment = figment.merge(Toml::file("herald.toml"));

        if let Ok(path) = std::env::var("HERALD_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("HERALD_").split("__"));

        let mut config: HeraldConfig = figment.extract().map_err(|e| {
            HeraldError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: HeraldConfig = Figment::new()
            .merge(Serialized::defaults(HeraldConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                HeraldError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply well-known environment variables on top of file configuration.
    ///
    /// Only fills values that are still unset, except `HERALD_LLM_PROVIDER`
    /// which selects the provider outright.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(provider_str) = std::env::var("HERALD_LLM_PROVIDER") {
            let provider = LLMProviderKind::parse(&provider_str).ok_or_else(|| {
                HeraldError::Configuration(format!("Invalid LLM provider: {}", provider_str))
            })?;

            let llm = self
                .llm
                .get_or_insert_with(|| LLMProviderConfig::new(provider));
            llm.provider = provider;

            if let Ok(model) = std::env::var("HERALD_LLM_MODEL") {
                llm.model = model;
            }
            if let Ok(base_url) = std::env::var("HERALD_LLM_BASE_URL") {
                llm.base_url = Some(base_url);
            }
        }

        if self.research.serp_api_key.is_none() {
            self.research.serp_api_key = non_empty_env("SERP_API_KEY");
        }

        if self.images.api_key.is_none() {
            self.images.api_key = non_empty_env("OPENAI_API_KEY");
        }

        if self.linkedin.access_token.is_none() {
            self.linkedin.access_token = non_empty_env("LINKEDIN_ACCESS_TOKEN");
        }
        if self.linkedin.client_id.is_none() {
            self.linkedin.client_id = non_empty_env("LINKEDIN_CLIENT_ID");
        }
        if self.linkedin.client_secret.is_none() {
            self.linkedin.client_secret = non_empty_env("LINKEDIN_CLIENT_SECRET");
        }

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(llm) = &self.llm {
            if !(0.0..=2.0).contains(&llm.temperature) {
                return Err(HeraldError::Configuration(format!(
                    "llm.temperature must be within 0.0..=2.0, got {}",
                    llm.temperature
                )));
            }
            if llm.max_tokens == 0 {
                return Err(HeraldError::Configuration(
                    "llm.max_tokens must be greater than zero".to_string(),
                ));
            }
        }

        if self.research.search_results_limit == 0 {
            return Err(HeraldError::Configuration(
                "research.search_results_limit must be greater than zero".to_string(),
            ));
        }

        if self.images.target_size == 0 {
            return Err(HeraldError::Configuration(
                "images.target_size must be greater than zero".to_string(),
            ));
        }

        if self.cache.linkedin_capacity == 0 {
            return Err(HeraldError::Configuration(
                "cache.linkedin_capacity must be greater than zero".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(HeraldError::Configuration(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Writer temperature, from the LLM section or the default.
    pub fn temperature(&self) -> f32 {
        self.llm
            .as_ref()
            .map(|l| l.temperature)
            .unwrap_or_else(default_temperature)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

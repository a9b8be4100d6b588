//! Factory for creating LLM providers from configuration

use std::sync::Arc;

use crate::config::{HeraldConfig, LLMProviderConfig, LLMProviderKind};
use crate::error::{HeraldError, Result};
use crate::llm::{GuardedProvider, LLMProvider, RetryConfig};

#[cfg(feature = "llm-ollama")]
use crate::llm::providers::ollama::{self, OllamaProvider};

#[cfg(feature = "llm-openai")]
use crate::llm::providers::openai::{self, OpenAIProvider};

#[cfg(feature = "llm-anthropic")]
use crate::llm::providers::anthropic::{self, AnthropicProvider};

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be created (missing API key,
    /// or the provider's feature is disabled).
    pub fn create(config: &LLMProviderConfig) -> Result<Arc<dyn LLMProvider>> {
        let model = (!config.model.is_empty()).then(|| config.model.clone());

        match config.provider {
            #[cfg(feature = "llm-openai")]
            LLMProviderKind::OpenAI => {
                let provider = match &config.api_key {
                    Some(api_key) => {
                        let model = model
                            .or_else(|| std::env::var("OPENAI_MODEL").ok())
                            .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
                        match &config.base_url {
                            Some(base_url) => {
                                OpenAIProvider::with_base_url(api_key, model, base_url)
                            }
                            None => OpenAIProvider::new(api_key, model),
                        }
                    }
                    None => OpenAIProvider::from_env(model)?,
                };
                Ok(Arc::new(provider))
            }

            #[cfg(not(feature = "llm-openai"))]
            LLMProviderKind::OpenAI => Err(HeraldError::Configuration(
                "OpenAI provider requires 'llm-openai' feature".to_string(),
            )),

            #[cfg(feature = "llm-anthropic")]
            LLMProviderKind::Anthropic => {
                let provider = match &config.api_key {
                    Some(api_key) => {
                        let model = model
                            .or_else(|| std::env::var("ANTHROPIC_MODEL").ok())
                            .unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string());
                        match &config.base_url {
                            Some(base_url) => {
                                AnthropicProvider::with_base_url(api_key, model, base_url)
                            }
                            None => AnthropicProvider::new(api_key, model),
                        }
                    }
                    None => AnthropicProvider::from_env(model)?,
                };
                Ok(Arc::new(provider))
            }

            #[cfg(not(feature = "llm-anthropic"))]
            LLMProviderKind::Anthropic => Err(HeraldError::Configuration(
                "Anthropic provider requires 'llm-anthropic' feature".to_string(),
            )),

            #[cfg(feature = "llm-ollama")]
            LLMProviderKind::Ollama => {
                let provider = match &config.base_url {
                    Some(url) => OllamaProvider::new(
                        model.unwrap_or_else(|| ollama::DEFAULT_MODEL.to_string()),
                        Some(url.clone()),
                    ),
                    None => OllamaProvider::from_env(model),
                };
                Ok(Arc::new(provider))
            }

            #[cfg(not(feature = "llm-ollama"))]
            LLMProviderKind::Ollama => Err(HeraldError::Configuration(
                "Ollama provider requires 'llm-ollama' feature".to_string(),
            )),
        }
    }

    /// Pick a provider for a configuration without an `[llm]` section.
    ///
    /// Checks `OPENAI_API_KEY`, then `ANTHROPIC_API_KEY`, then `OLLAMA_BASE_URL`.
    pub fn detect_from_env() -> Option<LLMProviderConfig> {
        let is_set = |name: &str| std::env::var(name).is_ok_and(|v| !v.trim().is_empty());

        let kind = if is_set("OPENAI_API_KEY") {
            LLMProviderKind::OpenAI
        } else if is_set("ANTHROPIC_API_KEY") {
            LLMProviderKind::Anthropic
        } else if is_set("OLLAMA_BASE_URL") {
            LLMProviderKind::Ollama
        } else {
            return None;
        };

        Some(LLMProviderConfig::new(kind))
    }

    /// Create the provider for a full configuration, wrapped with the
    /// completion timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no provider is configured or detectable.
    pub fn from_config(config: &HeraldConfig) -> Result<Arc<dyn LLMProvider>> {
        let llm = match &config.llm {
            Some(llm) => llm.clone(),
            None => Self::detect_from_env().ok_or_else(|| {
                HeraldError::Configuration(
                    "No LLM provider configured. Set [llm] in herald.toml, HERALD_LLM_PROVIDER, or OPENAI_API_KEY"
                        .to_string(),
                )
            })?,
        };

        let inner = Self::create(&llm)?;
        let info = inner.model_info();
        tracing::info!(provider = %info.provider, model = %info.model_name, "LLM provider ready");

        Ok(Arc::new(
            GuardedProvider::new(inner, RetryConfig::from(&config.retry), config.timeouts.completion)
                .with_default_max_tokens(llm.max_tokens),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_with_key() {
        let mut config = LLMProviderConfig::new(LLMProviderKind::OpenAI);
        config.api_key = Some("sk-test".to_string());
        config.model = "gpt-4o-mini".to_string();

        let provider = LLMProviderFactory::create(&config).unwrap();
        let info = provider.model_info();
        assert_eq!(info.provider, "openai");
        assert_eq!(info.model_name, "gpt-4o-mini");
    }

    #[test]
    fn test_create_ollama_with_base_url() {
        let mut config = LLMProviderConfig::new(LLMProviderKind::Ollama);
        config.base_url = Some("http://gpu-box:11434".to_string());

        let provider = LLMProviderFactory::create(&config).unwrap();
        assert_eq!(provider.model_info().model_name, ollama::DEFAULT_MODEL);
    }

    #[test]
    fn test_from_config_wraps_provider() {
        let mut llm = LLMProviderConfig::new(LLMProviderKind::Anthropic);
        llm.api_key = Some("test-key".to_string());
        let config = HeraldConfig {
            llm: Some(llm),
            ..Default::default()
        };

        let provider = LLMProviderFactory::from_config(&config).unwrap();
        assert_eq!(provider.model_info().provider, "anthropic");
    }
}

//! Time budget and transient-failure retry around external calls

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::retry::{RetryConfig, with_retry_when};
use super::{LLMProvider, LLMRequest, LLMResponse, ModelInfo};
use crate::error::{HeraldError, Result};

/// Run `operation` with a per-attempt time budget, retrying transient failures.
///
/// An attempt that exceeds `budget` fails with [`HeraldError::Timeout`], which
/// counts as transient.
pub async fn guarded<F, Fut, T>(retry: &RetryConfig, budget: Duration, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_retry_when(
        retry,
        || {
            let attempt = operation();
            async move {
                match tokio::time::timeout(budget, attempt).await {
                    Ok(result) => result,
                    Err(_) => Err(HeraldError::Timeout(budget)),
                }
            }
        },
        |e: &HeraldError| e.is_transient(&retry.retryable_status_codes),
    )
    .await
}

/// LLM provider wrapper applying a completion timeout and retry policy.
pub struct GuardedProvider {
    inner: Arc<dyn LLMProvider>,
    retry: RetryConfig,
    timeout: Duration,
    default_max_tokens: Option<usize>,
}

impl GuardedProvider {
    pub fn new(inner: Arc<dyn LLMProvider>, retry: RetryConfig, timeout: Duration) -> Self {
        Self {
            inner,
            retry,
            timeout,
            default_max_tokens: None,
        }
    }

    /// Token limit applied to requests that do not set one.
    pub fn with_default_max_tokens(mut self, max_tokens: usize) -> Self {
        self.default_max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl LLMProvider for GuardedProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        match (request.max_tokens, self.default_max_tokens) {
            (None, Some(max_tokens)) => {
                let request = request.clone().with_max_tokens(max_tokens);
                guarded(&self.retry, self.timeout, || self.inner.generate_request(&request)).await
            }
            _ => guarded(&self.retry, self.timeout, || self.inner.generate_request(request)).await,
        }
    }

    fn model_info(&self) -> ModelInfo {
        self.inner.model_info()
    }
}

//! Scripted providers for unit tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{LLMProvider, LLMRequest, LLMResponse, ModelInfo};
use crate::error::{HeraldError, Result};

/// Answers with the reply of the first rule whose needle appears in the
/// system prompt, or the default reply.
pub(crate) struct ScriptedProvider {
    rules: Vec<(String, String)>,
    default: String,
    calls: AtomicUsize,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(default: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default: default.into(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn rule(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), reply.into()));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let system = request.system_prompt().unwrap_or_default();
        let content = self
            .rules
            .iter()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default.clone());

        Ok(LLMResponse {
            content,
            usage: None,
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "mock".to_string(),
            model_name: "scripted".to_string(),
        }
    }
}

/// Fails every call with the error built by `make`.
pub(crate) struct FailingProvider {
    make: fn() -> HeraldError,
    calls: AtomicUsize,
}

impl FailingProvider {
    pub(crate) fn new(make: fn() -> HeraldError) -> Self {
        Self {
            make,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for FailingProvider {
    async fn generate_request(&self, _request: &LLMRequest) -> Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make)())
    }
}

//! LinkedIn post writer with a content-addressed result cache

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{Agent, ContentContext};
use crate::cache::{ResultCache, key_for};
use crate::error::{Result, mentions_credentials};
use crate::llm::{LLMProvider, LLMRequest};
use crate::routing::AgentKind;

/// LinkedIn rejects longer commentary
pub const MAX_POST_CHARS: usize = 2000;

const QUALITY_SCORE: u32 = 88;

const INSTRUCTIONS: &str = "You are a professional LinkedIn content creator. Your job is to write an engaging LinkedIn post for a professional audience. If a blog post is provided, summarize and adapt it for LinkedIn. If research summary or key insights are available, incorporate them. Always:
- Make the post concise, actionable, and encourage engagement (comments, shares, likes)
- Add relevant hashtags and a call to action
- Use a professional, positive tone
";

/// Why a post could not be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedInWriteError {
    /// The provider rejected or lacked credentials
    Credentials,
    Other(String),
}

impl fmt::Display for LinkedInWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkedInWriteError::Credentials => {
                f.write_str("API key missing or invalid. Please check your credentials.")
            }
            LinkedInWriteError::Other(message) => write!(f, "An error occurred: {}", message),
        }
    }
}

impl LinkedInWriteError {
    fn classify(message: String) -> Self {
        if mentions_credentials(&message) {
            LinkedInWriteError::Credentials
        } else {
            LinkedInWriteError::Other(message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInPost {
    /// At most [`MAX_POST_CHARS`] characters, empty on error
    pub content: String,
    pub quality_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LinkedInWriteError>,
}

impl LinkedInPost {
    fn failed(error: LinkedInWriteError) -> Self {
        Self {
            content: String::new(),
            quality_score: 0,
            error: Some(error),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub struct LinkedInWriterAgent {
    llm: Arc<dyn LLMProvider>,
    temperature: f32,
    cache: Arc<ResultCache<LinkedInPost>>,
}

impl LinkedInWriterAgent {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        temperature: f32,
        cache: Arc<ResultCache<LinkedInPost>>,
    ) -> Self {
        Self {
            llm,
            temperature,
            cache,
        }
    }

    fn prompt(context: &ContentContext) -> String {
        let insights = context.insights_line();
        let fields = [
            ("Topic", context.topic.as_str()),
            ("Research Summary", context.research_summary.as_str()),
            ("Key Insights", insights.as_str()),
            ("Target Audience", context.audience()),
            ("Brand Voice", context.voice()),
            ("Blog Content", context.blog_content.as_deref().unwrap_or_default()),
        ];

        let mut prompt = INSTRUCTIONS.to_string();
        for (label, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
            prompt.push_str(&format!("\n{}: {}", label, value));
        }

        prompt.push_str(
            "\nIf any fields above are missing, use what is available to create a LinkedIn post relevant to the topic.",
        );
        prompt
    }

    /// Write a post for `context`.
    ///
    /// Identical contexts are answered from the cache, failed attempts
    /// included. Provider failures become a post carrying an error; only a
    /// context that cannot be serialized is an `Err`.
    pub async fn write(&self, context: &ContentContext) -> Result<LinkedInPost> {
        let key = key_for(context)?;
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(key = %&key[..12], "linkedin cache hit");
            return Ok(hit);
        }

        let request = LLMRequest::with_system_prompt(
            "You are a professional LinkedIn content creator.",
            Self::prompt(context),
        )
        .with_temperature(self.temperature);

        let post = match self.llm.generate_request(&request).await {
            Ok(response) => LinkedInPost {
                content: truncate_chars(&response.content, MAX_POST_CHARS),
                quality_score: QUALITY_SCORE,
                error: None,
            },
            Err(e) => {
                let error = LinkedInWriteError::classify(e.to_string());
                tracing::warn!(error = %error, "linkedin post generation failed");
                LinkedInPost::failed(error)
            }
        };

        self.cache.put(key, post.clone()).await;
        Ok(post)
    }
}

#[async_trait]
impl Agent for LinkedInWriterAgent {
    type Input = ContentContext;
    type Output = LinkedInPost;

    fn kind(&self) -> AgentKind {
        AgentKind::LinkedInWriter
    }

    async fn produce(&self, input: &ContentContext) -> Result<LinkedInPost> {
        self.write(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeraldError;
    use crate::llm::mock::{FailingProvider, ScriptedProvider};

    fn agent(llm: Arc<dyn LLMProvider>, capacity: usize) -> LinkedInWriterAgent {
        LinkedInWriterAgent::new(llm, 0.7, Arc::new(ResultCache::new(capacity)))
    }

    #[tokio::test]
    async fn test_post_is_truncated() {
        let llm = Arc::new(ScriptedProvider::new("é".repeat(2500)));
        let post = agent(llm, 4).write(&ContentContext::new("topic")).await.unwrap();
        assert_eq!(post.content.chars().count(), MAX_POST_CHARS);
        assert_eq!(post.quality_score, 88);
        assert!(post.error.is_none());
    }

    #[tokio::test]
    async fn test_identical_context_hits_cache() {
        let llm = Arc::new(ScriptedProvider::new("Great post #rust"));
        let writer = agent(llm.clone(), 4);
        let context = ContentContext::new("Rust").with_research("s", vec!["i".to_string()]);

        let first = writer.write(&context).await.unwrap();
        let second = writer.write(&context.clone()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(llm.calls(), 1);

        writer
            .write(&context.with_voice(Some("bold".to_string())))
            .await
            .unwrap();
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_eviction_recomputes() {
        let llm = Arc::new(ScriptedProvider::new("post"));
        let writer = agent(llm.clone(), 1);

        writer.write(&ContentContext::new("a")).await.unwrap();
        writer.write(&ContentContext::new("b")).await.unwrap();
        writer.write(&ContentContext::new("a")).await.unwrap();
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn test_credential_error_mapping() {
        let llm = Arc::new(FailingProvider::new(|| HeraldError::Api {
            service: "OpenAI".to_string(),
            status: 401,
            message: "Incorrect API key provided".to_string(),
        }));
        let post = agent(llm, 4).write(&ContentContext::new("t")).await.unwrap();

        assert_eq!(post.error, Some(LinkedInWriteError::Credentials));
        assert_eq!(
            post.error.unwrap().to_string(),
            "API key missing or invalid. Please check your credentials."
        );
        assert_eq!(post.quality_score, 0);
        assert!(post.content.is_empty());
    }

    #[tokio::test]
    async fn test_generic_error_mapping_is_cached() {
        let llm = Arc::new(FailingProvider::new(|| {
            HeraldError::Network("connection reset".to_string())
        }));
        let writer = agent(llm.clone(), 4);

        let post = writer.write(&ContentContext::new("t")).await.unwrap();
        assert_eq!(
            post.error.as_ref().map(|e| e.to_string()),
            Some("An error occurred: Network error: connection reset".to_string())
        );

        writer.write(&ContentContext::new("t")).await.unwrap();
        assert_eq!(llm.calls(), 1);
    }

    #[test]
    fn test_prompt_skips_empty_fields() {
        let prompt = LinkedInWriterAgent::prompt(
            &ContentContext::new("Rust").with_blog("Full blog text"),
        );
        assert!(prompt.contains("\nTopic: Rust"));
        assert!(prompt.contains("\nBlog Content: Full blog text"));
        assert!(!prompt.contains("Research Summary:"));
        assert!(!prompt.contains("Brand Voice:"));
    }
}

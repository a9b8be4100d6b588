//! Agents that turn research into content
//!
//! Every agent implements [`Agent`]: a single `produce` capability from a
//! typed input to a typed output. The query handler and the research
//! aggregator implement it too, so the orchestrator can hold all six behind
//! trait objects and tests can swap any of them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::routing::AgentKind;

pub mod blog;
pub mod image;
pub mod linkedin;
pub mod strategist;

pub use blog::{BlogPost, BlogWriterAgent};
pub use image::{ImageGenerationAgent, ImageSet};
pub use linkedin::{LinkedInPost, LinkedInWriteError, LinkedInWriterAgent};
pub use strategist::{ContentStrategistAgent, Strategy};

/// A pipeline agent
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    /// Identifier recorded in `completed_agents`
    fn kind(&self) -> AgentKind;

    async fn produce(&self, input: &Self::Input) -> Result<Self::Output>;
}

/// Input shared by the writer agents.
///
/// Serializes with stable key order through [`crate::cache::key_for`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentContext {
    pub topic: String,
    pub research_summary: String,
    pub key_insights: Vec<String>,
    pub target_audience: Option<String>,
    pub brand_voice: Option<String>,
    pub blog_content: Option<String>,
}

impl ContentContext {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn with_research(mut self, summary: impl Into<String>, insights: Vec<String>) -> Self {
        self.research_summary = summary.into();
        self.key_insights = insights;
        self
    }

    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.target_audience = audience;
        self
    }

    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.brand_voice = voice;
        self
    }

    pub fn with_blog(mut self, blog: impl Into<String>) -> Self {
        self.blog_content = Some(blog.into());
        self
    }

    pub(crate) fn insights_line(&self) -> String {
        self.key_insights.join(", ")
    }

    pub(crate) fn audience(&self) -> &str {
        self.target_audience.as_deref().unwrap_or_default()
    }

    pub(crate) fn voice(&self) -> &str {
        self.brand_voice.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builders() {
        let context = ContentContext::new("Rust adoption")
            .with_research("summary", vec!["a".to_string(), "b".to_string()])
            .with_audience(Some("CTOs".to_string()))
            .with_voice(None);

        assert_eq!(context.insights_line(), "a, b");
        assert_eq!(context.audience(), "CTOs");
        assert_eq!(context.voice(), "");
        assert!(context.blog_content.is_none());
    }

    #[test]
    fn test_context_cache_key_is_stable() {
        let a = ContentContext::new("t").with_research("s", vec!["x".to_string()]);
        let b = a.clone();
        assert_eq!(
            crate::cache::key_for(&a).unwrap(),
            crate::cache::key_for(&b).unwrap()
        );
        let c = a.clone().with_voice(Some("witty".to_string()));
        assert_ne!(
            crate::cache::key_for(&a).unwrap(),
            crate::cache::key_for(&c).unwrap()
        );
    }
}

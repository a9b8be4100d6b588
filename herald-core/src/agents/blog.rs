//! SEO blog writer

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Agent, ContentContext};
use crate::error::Result;
use crate::llm::{LLMProvider, LLMRequest};
use crate::routing::AgentKind;

const SEO_SCORE: u32 = 90;
const READABILITY_SCORE: f64 = 80.5;
const QUALITY_SCORE: u32 = 85;

/// A generated blog post with its fixed quality metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub content: String,
    pub keywords: Vec<String>,
    pub seo_score: u32,
    pub readability_score: f64,
    pub quality_score: u32,
}

/// Comma-separated keywords after the last `Keywords:` marker.
pub fn extract_keywords(content: &str) -> Vec<String> {
    match content.rsplit_once("Keywords:") {
        Some((_, tail)) => tail
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    }
}

pub struct BlogWriterAgent {
    llm: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl BlogWriterAgent {
    pub fn new(llm: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    fn prompt(context: &ContentContext) -> String {
        format!(
            "You are an expert SEO blog writer. Write a detailed, search-optimized blog post about \"{}\".\n\
             Use the following research summary and key insights:\n\
             Research Summary: {}\n\
             Key Insights: {}\n\
             Target Audience: {}\n\
             Brand Voice: {}\n\
             Provide a list of 5 SEO keywords at the end, on a line starting with \"Keywords:\".",
            context.topic,
            context.research_summary,
            context.insights_line(),
            context.audience(),
            context.voice()
        )
    }

    pub async fn write(&self, context: &ContentContext) -> Result<BlogPost> {
        let request = LLMRequest::with_system_prompt(
            "You are an expert SEO blog writer.",
            Self::prompt(context),
        )
        .with_temperature(self.temperature);

        let content = self.llm.generate_request(&request).await?.content;
        let keywords = extract_keywords(&content);
        tracing::debug!(chars = content.len(), keywords = keywords.len(), "blog post written");

        Ok(BlogPost {
            content,
            keywords,
            seo_score: SEO_SCORE,
            readability_score: READABILITY_SCORE,
            quality_score: QUALITY_SCORE,
        })
    }
}

#[async_trait]
impl Agent for BlogWriterAgent {
    type Input = ContentContext;
    type Output = BlogPost;

    fn kind(&self) -> AgentKind {
        AgentKind::BlogWriter
    }

    async fn produce(&self, input: &ContentContext) -> Result<BlogPost> {
        self.write(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::ScriptedProvider;

    #[test]
    fn test_extract_keywords_uses_last_marker() {
        let content = "Intro mentions Keywords: a, b\n\nBody\n\nKeywords: rust, async , , tokio";
        assert_eq!(extract_keywords(content), vec!["rust", "async", "tokio"]);
    }

    #[test]
    fn test_extract_keywords_missing_marker() {
        assert!(extract_keywords("no marker here").is_empty());
    }

    #[tokio::test]
    async fn test_write_blog() {
        let llm = Arc::new(ScriptedProvider::new(
            "# AI in Marketing\n\nBody text.\n\nKeywords: AI, marketing, automation",
        ));
        let agent = BlogWriterAgent::new(llm.clone(), 0.7);
        let context = ContentContext::new("AI in marketing")
            .with_research("Summary", vec!["one".to_string(), "two".to_string()])
            .with_audience(Some("CMOs".to_string()));

        let post = agent.produce(&context).await.unwrap();
        assert_eq!(post.keywords, vec!["AI", "marketing", "automation"]);
        assert_eq!(post.seo_score, 90);
        assert_eq!(post.readability_score, 80.5);
        assert_eq!(post.quality_score, 85);

        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(0.7));
        let user = &request.messages[1].content;
        assert!(user.contains("Key Insights: one, two"));
        assert!(user.contains("Target Audience: CMOs"));
        assert!(user.contains("Brand Voice: \n"));
    }
}

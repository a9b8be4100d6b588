//! Social image generation: prompt writing, image generation, local storage

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::{Agent, ContentContext};
use crate::error::Result;
use crate::images::{ImageBackend, ImagePipeline};
use crate::llm::{LLMProvider, LLMRequest};
use crate::routing::AgentKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    pub prompts: Vec<String>,
    /// One entry per prompt; empty where generation failed
    pub image_urls: Vec<String>,
    /// Stored files, never more than `prompts`
    pub images: Vec<PathBuf>,
}

pub struct ImageGenerationAgent {
    llm: Arc<dyn LLMProvider>,
    temperature: f32,
    backend: Arc<dyn ImageBackend>,
    pipeline: Arc<dyn ImagePipeline>,
}

impl ImageGenerationAgent {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        temperature: f32,
        backend: Arc<dyn ImageBackend>,
        pipeline: Arc<dyn ImagePipeline>,
    ) -> Self {
        Self {
            llm,
            temperature,
            backend,
            pipeline,
        }
    }

    fn prompt(context: &ContentContext) -> String {
        format!(
            "You are a creative visual designer. Based on the following topic and context, generate 2 highly descriptive prompts for DALL-E 3 image generation.\n\
             Topic: {}\n\
             Research Summary: {}\n\
             Target Audience: {}\n\
             Brand Voice: {}\n\
             Each prompt should be unique, visually rich, and suitable for blog or social media use. Write one prompt per line.",
            context.topic,
            context.research_summary,
            context.audience(),
            context.voice()
        )
    }

    pub async fn generate(&self, context: &ContentContext) -> Result<ImageSet> {
        let request = LLMRequest::with_system_prompt(
            "You are a creative visual designer.",
            Self::prompt(context),
        )
        .with_temperature(self.temperature);

        let response = self.llm.generate_request(&request).await?;
        let prompts: Vec<String> = response
            .content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();

        let mut image_urls = Vec::with_capacity(prompts.len());
        for prompt in &prompts {
            match self.backend.generate(prompt).await {
                Ok(url) => image_urls.push(url),
                Err(e) => {
                    tracing::warn!(error = %e, "image generation failed for prompt");
                    image_urls.push(String::new());
                }
            }
        }

        let images = self.pipeline.fetch_all(&image_urls).await;
        tracing::info!(
            prompts = prompts.len(),
            stored = images.len(),
            "images generated"
        );

        Ok(ImageSet {
            prompts,
            image_urls,
            images,
        })
    }
}

#[async_trait]
impl Agent for ImageGenerationAgent {
    type Input = ContentContext;
    type Output = ImageSet;

    fn kind(&self) -> AgentKind {
        AgentKind::ImageGenerator
    }

    async fn produce(&self, input: &ContentContext) -> Result<ImageSet> {
        self.generate(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeraldError;
    use crate::llm::mock::ScriptedProvider;

    /// Fails for prompts containing "fail"
    struct PickyBackend;

    #[async_trait]
    impl ImageBackend for PickyBackend {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("fail") {
                Err(HeraldError::Image("content policy".to_string()))
            } else {
                Ok(format!("https://img.example/{}.png", prompt.len()))
            }
        }
    }

    /// Pretends every non-empty URL was stored
    struct RecordingPipeline;

    #[async_trait]
    impl ImagePipeline for RecordingPipeline {
        async fn fetch_all(&self, urls: &[String]) -> Vec<PathBuf> {
            urls.iter()
                .filter(|u| !u.is_empty())
                .map(|u| PathBuf::from(crate::images::file_name_for(u)))
                .collect()
        }
    }

    #[tokio::test]
    async fn test_failed_prompt_gets_placeholder() {
        let llm = Arc::new(ScriptedProvider::new(
            "A neon city skyline\n\n  please fail this one  \nA calm forest",
        ));
        let agent = ImageGenerationAgent::new(
            llm,
            0.7,
            Arc::new(PickyBackend),
            Arc::new(RecordingPipeline),
        );

        let set = agent.produce(&ContentContext::new("cities")).await.unwrap();
        assert_eq!(set.prompts.len(), 3);
        assert_eq!(set.prompts[1], "please fail this one");
        assert_eq!(set.image_urls.len(), 3);
        assert!(set.image_urls[1].is_empty());
        assert_eq!(set.images.len(), 2);
        assert!(set.images.len() <= set.prompts.len());
    }

    #[tokio::test]
    async fn test_prompt_leaves_out_insights() {
        let llm = Arc::new(ScriptedProvider::new("one prompt"));
        let agent = ImageGenerationAgent::new(
            llm.clone(),
            0.7,
            Arc::new(PickyBackend),
            Arc::new(RecordingPipeline),
        );
        let context = ContentContext::new("t").with_research("sum", vec!["secret insight".to_string()]);

        agent.produce(&context).await.unwrap();
        let user = &llm.requests()[0].messages[1].content;
        assert!(user.contains("Research Summary: sum"));
        assert!(!user.contains("secret insight"));
    }
}

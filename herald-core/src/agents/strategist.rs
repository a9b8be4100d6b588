//! Content strategy planner

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Agent, ContentContext};
use crate::error::Result;
use crate::llm::{LLMProvider, LLMRequest};
use crate::routing::AgentKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub strategy: String,
}

pub struct ContentStrategistAgent {
    llm: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl ContentStrategistAgent {
    pub fn new(llm: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    fn prompt(context: &ContentContext) -> String {
        format!(
            "You are a senior content strategist. Based on the following research and context, create a detailed content strategy for the topic \"{}\".\n\
             Research Summary: {}\n\
             Key Insights: {}\n\
             Target Audience: {}\n\
             Brand Voice: {}\n\
             Please include:\n\
             - Main content themes\n\
             - Suggested formats (blog, video, infographic, etc.)\n\
             - Distribution channels\n\
             - Posting frequency\n\
             - SEO and engagement tips\n\
             - KPIs to track",
            context.topic,
            context.research_summary,
            context.insights_line(),
            context.audience(),
            context.voice()
        )
    }

    pub async fn plan(&self, context: &ContentContext) -> Result<Strategy> {
        let request = LLMRequest::with_system_prompt(
            "You are a senior content strategist.",
            Self::prompt(context),
        )
        .with_temperature(self.temperature);

        let strategy = self.llm.generate_request(&request).await?.content;
        Ok(Strategy { strategy })
    }
}

#[async_trait]
impl Agent for ContentStrategistAgent {
    type Input = ContentContext;
    type Output = Strategy;

    fn kind(&self) -> AgentKind {
        AgentKind::ContentStrategist
    }

    async fn produce(&self, input: &ContentContext) -> Result<Strategy> {
        self.plan(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::ScriptedProvider;

    #[tokio::test]
    async fn test_plan_returns_raw_text() {
        let llm = Arc::new(ScriptedProvider::new("Themes: ...\nKPIs: CTR"));
        let agent = ContentStrategistAgent::new(llm.clone(), 0.7);

        let strategy = agent
            .produce(&ContentContext::new("B2B SaaS growth"))
            .await
            .unwrap();
        assert_eq!(strategy.strategy, "Themes: ...\nKPIs: CTR");
        assert_eq!(agent.kind(), AgentKind::ContentStrategist);
        assert!(llm.requests()[0].messages[1].content.contains("\"B2B SaaS growth\""));
    }
}

//! Research aggregation: search, insight extraction, fact scoring, summary

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::credibility::{FactStatus, VerifiedFact};
use super::insights::{format_results, parse_insights};
use super::ResearchRecord;
use crate::agents::Agent;
use crate::config::HeraldConfig;
use crate::error::Result;
use crate::llm::guard::guarded;
use crate::llm::{LLMProvider, LLMRequest, RetryConfig};
use crate::routing::AgentKind;
use crate::search::{SearchProvider, SerpApiSearch, synthetic_results};

const INSIGHT_TEMPERATURE: f32 = 0.5;

fn insight_prompt(topic: &str) -> String {
    format!(
        "You are a Research Analysis Agent. Extract the most important and actionable insights about \"{topic}\" from the search results below.\n\n\
         Focus on:\n\
         1. Current trends and developments\n\
         2. Statistical data and facts\n\
         3. Expert opinions and predictions\n\
         4. Practical applications and use cases\n\
         5. Challenges and opportunities\n\n\
         Provide 5-8 key insights, each as a separate bullet point."
    )
}

fn summary_prompt(topic: &str) -> String {
    format!(
        "Create a comprehensive research summary about \"{topic}\".\n\n\
         Structure the summary with:\n\
         1. Executive Summary (2-3 sentences)\n\
         2. Key Findings (bullet points)\n\
         3. Current Trends\n\
         4. Implications and Opportunities\n\n\
         Make it informative, well-structured, and actionable."
    )
}

/// Runs the four research steps in order for one topic.
pub struct ResearchAggregator {
    llm: Arc<dyn LLMProvider>,
    search: Option<Arc<dyn SearchProvider>>,
    limit: usize,
    search_timeout: Duration,
    retry: RetryConfig,
}

impl ResearchAggregator {
    /// Create an aggregator without a search backend; every run uses the
    /// synthetic result set.
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            llm,
            search: None,
            limit: 10,
            search_timeout: Duration::from_secs(20),
            retry: RetryConfig::default(),
        }
    }

    /// Aggregator wired from the `[research]`, `[timeouts]` and `[retry]`
    /// sections. SerpAPI is used only when a key is configured.
    pub fn from_config(config: &HeraldConfig, llm: Arc<dyn LLMProvider>) -> Self {
        let aggregator = Self::new(llm)
            .with_limit(config.research.search_results_limit)
            .with_search_timeout(config.timeouts.search)
            .with_retry(RetryConfig::from(&config.retry));

        match &config.research.serp_api_key {
            Some(key) => aggregator.with_search(Arc::new(SerpApiSearch::with_base_url(
                key.clone(),
                config.research.search_base_url.clone(),
            ))),
            None => aggregator,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Produce a research record for `topic`.
    ///
    /// Search failures fall back to synthetic results; completion failures
    /// propagate.
    pub async fn research(&self, topic: &str) -> Result<ResearchRecord> {
        let raw_results = self.search_or_synthesize(topic).await;
        tracing::debug!(topic, results = raw_results.len(), "search step complete");

        let insight_request = LLMRequest::with_system_prompt(
            insight_prompt(topic),
            format!("Search Results:\n{}", format_results(&raw_results)),
        )
        .with_temperature(INSIGHT_TEMPERATURE);
        let response = self.llm.generate_request(&insight_request).await?;
        let insights = parse_insights(&response.content);

        let verified_facts: Vec<VerifiedFact> =
            insights.iter().map(|i| VerifiedFact::assess(i.as_str())).collect();

        let high_confidence = verified_facts
            .iter()
            .filter(|f| f.status == FactStatus::Verified)
            .map(|f| f.fact.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let summary_request = LLMRequest::with_system_prompt(
            summary_prompt(topic),
            format!("High-confidence insights:\n{}", high_confidence),
        )
        .with_temperature(INSIGHT_TEMPERATURE);
        let summary = self.llm.generate_request(&summary_request).await?.content;

        let sources = raw_results.iter().filter_map(|r| r.link.clone()).collect();

        tracing::info!(
            topic,
            insights = insights.len(),
            verified = verified_facts
                .iter()
                .filter(|f| f.status == FactStatus::Verified)
                .count(),
            "research complete"
        );

        Ok(ResearchRecord {
            topic: topic.to_string(),
            raw_results,
            insights,
            verified_facts,
            summary,
            sources,
        })
    }

    async fn search_or_synthesize(&self, topic: &str) -> Vec<crate::search::SearchResult> {
        let Some(search) = &self.search else {
            tracing::info!(topic, "no search backend configured, using synthetic results");
            return synthetic_results(topic);
        };

        match guarded(&self.retry, self.search_timeout, || search.search(topic, self.limit)).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(backend = search.name(), error = %e, "search failed, using synthetic results");
                synthetic_results(topic)
            }
        }
    }
}

#[async_trait]
impl Agent for ResearchAggregator {
    type Input = String;
    type Output = ResearchRecord;

    fn kind(&self) -> AgentKind {
        AgentKind::DeepResearch
    }

    async fn produce(&self, topic: &String) -> Result<ResearchRecord> {
        self.research(topic).await
    }
}

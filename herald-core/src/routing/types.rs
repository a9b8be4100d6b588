//! Content types, agent identifiers and routing decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    LinkedIn,
    Research,
    Strategy,
    Image,
    Mixed,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::Blog,
        ContentType::LinkedIn,
        ContentType::Research,
        ContentType::Strategy,
        ContentType::Image,
        ContentType::Mixed,
    ];

    /// Exact match on the lowercase name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::LinkedIn => "linkedin",
            ContentType::Research => "research",
            ContentType::Strategy => "strategy",
            ContentType::Image => "image",
            ContentType::Mixed => "mixed",
        }
    }

    /// Content types whose output gets social images
    pub fn wants_images(&self) -> bool {
        matches!(self, ContentType::Blog | ContentType::Mixed | ContentType::Image)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of every agent in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    #[serde(rename = "query_handler_agent")]
    QueryHandler,
    #[serde(rename = "deep_research_agent")]
    DeepResearch,
    #[serde(rename = "blog_writer_agent")]
    BlogWriter,
    #[serde(rename = "linkedin_writer_agent")]
    LinkedInWriter,
    #[serde(rename = "content_strategist_agent")]
    ContentStrategist,
    #[serde(rename = "image_generation_agent")]
    ImageGenerator,
}

impl AgentKind {
    pub fn id(&self) -> &'static str {
        match self {
            AgentKind::QueryHandler => "query_handler_agent",
            AgentKind::DeepResearch => "deep_research_agent",
            AgentKind::BlogWriter => "blog_writer_agent",
            AgentKind::LinkedInWriter => "linkedin_writer_agent",
            AgentKind::ContentStrategist => "content_strategist_agent",
            AgentKind::ImageGenerator => "image_generation_agent",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Agents used when the model names none
pub const DEFAULT_AGENTS: [AgentKind; 2] = [AgentKind::DeepResearch, AgentKind::BlogWriter];

/// Agents used for ambiguous requests
pub const FALLBACK_AGENTS: [AgentKind; 3] = [
    AgentKind::DeepResearch,
    AgentKind::BlogWriter,
    AgentKind::LinkedInWriter,
];

/// How a request should be handled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub content_type: ContentType,
    /// Ordered, no duplicates
    pub required_agents: Vec<AgentKind>,
    pub research_needed: bool,
    pub target_audience: Option<String>,
    pub brand_voice: Option<String>,
    pub intent: String,
    pub fallback_used: bool,
}

impl RoutingDecision {
    /// Decision applied to ambiguous or unparseable requests.
    pub fn fallback(query: &str) -> Self {
        Self {
            content_type: ContentType::Blog,
            required_agents: FALLBACK_AGENTS.to_vec(),
            research_needed: true,
            target_audience: None,
            brand_voice: None,
            intent: format!(
                "Ambiguous or unclear request detected. Fallback routing applied. Original: {}",
                query
            ),
            fallback_used: true,
        }
    }

    pub fn requires(&self, agent: AgentKind) -> bool {
        self.required_agents.contains(&agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parse() {
        assert_eq!(ContentType::parse("linkedin"), Some(ContentType::LinkedIn));
        assert_eq!(ContentType::parse("mixed"), Some(ContentType::Mixed));
        assert_eq!(ContentType::parse("Blog"), None);
        assert_eq!(ContentType::parse("blog post"), None);
    }

    #[test]
    fn test_wants_images() {
        assert!(ContentType::Blog.wants_images());
        assert!(ContentType::Image.wants_images());
        assert!(!ContentType::Research.wants_images());
    }

    #[test]
    fn test_agent_ids_match_serde() {
        for kind in [
            AgentKind::QueryHandler,
            AgentKind::DeepResearch,
            AgentKind::BlogWriter,
            AgentKind::LinkedInWriter,
            AgentKind::ContentStrategist,
            AgentKind::ImageGenerator,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
        }
    }

    #[test]
    fn test_fallback_decision() {
        let decision = RoutingDecision::fallback("hmm");
        assert!(decision.fallback_used);
        assert_eq!(decision.content_type, ContentType::Blog);
        assert_eq!(decision.required_agents, FALLBACK_AGENTS.to_vec());
        assert!(decision.intent.ends_with("Original: hmm"));
    }
}

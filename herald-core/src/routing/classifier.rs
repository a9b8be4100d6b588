//! Intent classification of incoming requests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use super::types::{AgentKind, ContentType, DEFAULT_AGENTS, RoutingDecision};
use crate::agents::Agent;
use crate::error::{HeraldError, Result};
use crate::llm::{LLMProvider, LLMRequest};

const CLASSIFIER_TEMPERATURE: f32 = 0.3;

/// Fewer distinct `KEY:` lines than this marks the answer as ambiguous
const MIN_PARSED_KEYS: usize = 3;

const SYSTEM_PROMPT: &str = "You are a Query Analysis Agent. Your job is to analyze user requests and determine:
1. What type of content they want (blog, linkedin, research, strategy, image)
2. What agents should be involved
3. Whether web research is needed
4. The target audience and brand voice (if mentioned)
5. Use the user's previous requests (conversation history) to personalize agent selection.

Respond with a structured analysis in this format:
CONTENT_TYPE: [blog/linkedin/research/strategy/image/mixed]
REQUIRED_AGENTS: [list of agents needed]
RESEARCH_NEEDED: [yes/no]
TARGET_AUDIENCE: [if mentioned]
BRAND_VOICE: [if mentioned]
INTENT: [brief description of what user wants]";

/// Keys of the analysis block, in match priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalysisKey {
    ContentType,
    RequiredAgents,
    ResearchNeeded,
    TargetAudience,
    BrandVoice,
    Intent,
}

impl AnalysisKey {
    const PRIORITY: [(&'static str, AnalysisKey); 6] = [
        ("content_type", AnalysisKey::ContentType),
        ("required_agents", AnalysisKey::RequiredAgents),
        ("research_needed", AnalysisKey::ResearchNeeded),
        ("target_audience", AnalysisKey::TargetAudience),
        ("brand_voice", AnalysisKey::BrandVoice),
        ("intent", AnalysisKey::Intent),
    ];

    /// First key whose name is a substring of the normalized line key.
    fn match_key(key: &str) -> Option<Self> {
        Self::PRIORITY
            .iter()
            .find(|(name, _)| key.contains(name))
            .map(|(_, k)| *k)
    }
}

/// Substrings of the agent list and the agent each one selects, in output order
const AGENT_MARKERS: [(&str, AgentKind); 5] = [
    ("research", AgentKind::DeepResearch),
    ("blog", AgentKind::BlogWriter),
    ("linkedin", AgentKind::LinkedInWriter),
    ("strategy", AgentKind::ContentStrategist),
    ("image", AgentKind::ImageGenerator),
];

fn parse_agents(value: &str) -> Vec<AgentKind> {
    let lower = value.to_lowercase();
    AGENT_MARKERS
        .iter()
        .filter(|(marker, _)| lower.contains(marker))
        .map(|(_, agent)| *agent)
        .collect()
}

fn optional_value(value: &str) -> Option<String> {
    let lower = value.to_lowercase();
    if lower == "none" || lower == "not mentioned" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a `KEY: value` analysis block into a routing decision.
///
/// Parsing never fails; unusable answers produce the fallback decision.
pub fn parse_analysis(text: &str, query: &str) -> RoutingDecision {
    let mut content_type = ContentType::Blog.as_str().to_string();
    let mut required_agents = DEFAULT_AGENTS.to_vec();
    let mut research_needed = true;
    let mut target_audience = None;
    let mut brand_voice = None;
    let mut intent = query.to_string();
    let mut parsed_keys: HashSet<String> = HashSet::new();

    for line in text.trim().lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        let matched = AnalysisKey::match_key(&key);
        parsed_keys.insert(key);

        let Some(matched) = matched else {
            continue;
        };

        match matched {
            AnalysisKey::ContentType => content_type = value.to_lowercase(),
            AnalysisKey::RequiredAgents => {
                let agents = parse_agents(value);
                if !agents.is_empty() {
                    required_agents = agents;
                }
            }
            AnalysisKey::ResearchNeeded => {
                research_needed = value.to_lowercase().contains("yes");
            }
            AnalysisKey::TargetAudience => {
                if let Some(v) = optional_value(value) {
                    target_audience = Some(v);
                }
            }
            AnalysisKey::BrandVoice => {
                if let Some(v) = optional_value(value) {
                    brand_voice = Some(v);
                }
            }
            AnalysisKey::Intent => intent = value.to_string(),
        }
    }

    let parsed_type = ContentType::parse(&content_type);

    if parsed_type.is_some_and(|c| c.wants_images())
        && !required_agents.contains(&AgentKind::ImageGenerator)
    {
        required_agents.push(AgentKind::ImageGenerator);
    }

    let ambiguous = required_agents.is_empty()
        || required_agents == DEFAULT_AGENTS
        || parsed_type.is_none()
        || parsed_keys.len() < MIN_PARSED_KEYS;

    match parsed_type {
        Some(content_type) if !ambiguous => RoutingDecision {
            content_type,
            required_agents,
            research_needed,
            target_audience,
            brand_voice,
            intent,
            fallback_used: false,
        },
        _ => {
            tracing::info!(
                parsed_keys = parsed_keys.len(),
                content_type = %content_type,
                "ambiguous analysis, applying fallback routing"
            );
            RoutingDecision::fallback(query)
        }
    }
}

/// Input to the query handler
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub query: String,
    /// Earlier requests and responses, oldest first
    pub history: Vec<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }
}

/// Classifies a request into a [`RoutingDecision`] with one completion call.
pub struct IntentClassifier {
    llm: Arc<dyn LLMProvider>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }

    /// Analyze `query` in the context of `history`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Classifier`] when the completion call fails.
    /// Ambiguous answers are not errors.
    pub async fn analyze(&self, query: &str, history: &[String]) -> Result<RoutingDecision> {
        let user = format!(
            "Conversation history:\n{}\n\nAnalyze this request: {}",
            history.join("\n"),
            query
        );
        let request = LLMRequest::with_system_prompt(SYSTEM_PROMPT, user)
            .with_temperature(CLASSIFIER_TEMPERATURE);

        let response = self
            .llm
            .generate_request(&request)
            .await
            .map_err(|e| HeraldError::Classifier(e.to_string()))?;

        let decision = parse_analysis(&response.content, query);
        tracing::info!(
            content_type = %decision.content_type,
            agents = decision.required_agents.len(),
            fallback = decision.fallback_used,
            "query analyzed"
        );
        Ok(decision)
    }
}

#[async_trait]
impl Agent for IntentClassifier {
    type Input = QueryRequest;
    type Output = RoutingDecision;

    fn kind(&self) -> AgentKind {
        AgentKind::QueryHandler
    }

    async fn produce(&self, input: &QueryRequest) -> Result<RoutingDecision> {
        self.analyze(&input.query, &input.history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{FailingProvider, ScriptedProvider};
    use crate::routing::types::FALLBACK_AGENTS;

    const FULL_ANSWER: &str = "CONTENT_TYPE: Blog
REQUIRED_AGENTS: research agent, blog writer, linkedin writer
RESEARCH_NEEDED: Yes
TARGET_AUDIENCE: marketing managers
BRAND_VOICE: not mentioned
INTENT: Blog about AI in marketing";

    #[test]
    fn test_full_answer() {
        let decision = parse_analysis(FULL_ANSWER, "write a blog about AI in marketing");

        assert!(!decision.fallback_used);
        assert_eq!(decision.content_type, ContentType::Blog);
        assert_eq!(
            decision.required_agents,
            vec![
                AgentKind::DeepResearch,
                AgentKind::BlogWriter,
                AgentKind::LinkedInWriter,
                AgentKind::ImageGenerator,
            ]
        );
        assert!(decision.research_needed);
        assert_eq!(decision.target_audience.as_deref(), Some("marketing managers"));
        assert!(decision.brand_voice.is_none());
        assert_eq!(decision.intent, "Blog about AI in marketing");
    }

    #[test]
    fn test_single_key_falls_back() {
        let decision = parse_analysis("CONTENT_TYPE: linkedin", "something");
        assert!(decision.fallback_used);
        assert_eq!(decision.content_type, ContentType::Blog);
        assert_eq!(decision.required_agents, FALLBACK_AGENTS.to_vec());
        assert!(decision.research_needed);
        assert_eq!(
            decision.intent,
            "Ambiguous or unclear request detected. Fallback routing applied. Original: something"
        );
    }

    #[test]
    fn test_unknown_content_type_falls_back() {
        let text = "CONTENT_TYPE: podcast\nREQUIRED_AGENTS: research, linkedin\nRESEARCH_NEEDED: no";
        assert!(parse_analysis(text, "q").fallback_used);
    }

    #[test]
    fn test_default_pair_is_ambiguous() {
        let text = "CONTENT_TYPE: research\nREQUIRED_AGENTS: research and blog\nRESEARCH_NEEDED: yes";
        assert!(parse_analysis(text, "q").fallback_used);
    }

    #[test]
    fn test_blog_with_default_pair_gets_image_and_is_not_ambiguous() {
        let text = "CONTENT_TYPE: blog\nREQUIRED_AGENTS: research, blog\nRESEARCH_NEEDED: yes";
        let decision = parse_analysis(text, "q");
        assert!(!decision.fallback_used);
        assert_eq!(
            decision.required_agents,
            vec![AgentKind::DeepResearch, AgentKind::BlogWriter, AgentKind::ImageGenerator]
        );
    }

    #[test]
    fn test_research_needed_no() {
        let text = "CONTENT_TYPE: linkedin\nREQUIRED_AGENTS: linkedin writer\nRESEARCH_NEEDED: No";
        let decision = parse_analysis(text, "q");
        assert!(!decision.fallback_used);
        assert!(!decision.research_needed);
        assert_eq!(decision.required_agents, vec![AgentKind::LinkedInWriter]);
    }

    #[test]
    fn test_unrecognized_keys_count_toward_minimum() {
        let text = "CONTENT_TYPE: strategy\nTONE: casual\nFORMAT: long\nREQUIRED_AGENTS: strategy";
        let decision = parse_analysis(text, "q");
        assert!(!decision.fallback_used);
        assert_eq!(decision.content_type, ContentType::Strategy);
        assert_eq!(decision.required_agents, vec![AgentKind::ContentStrategist]);
    }

    #[test]
    fn test_repeated_key_counts_once() {
        let text = "CONTENT_TYPE: strategy\nREQUIRED_AGENTS: strategy\n Content_Type : strategy";
        assert!(parse_analysis(text, "q").fallback_used);
    }

    #[test]
    fn test_colons_in_values_are_kept() {
        let text = "content_type: strategy\nrequired_agents: strategy\nintent: plan: Q3 launch";
        let decision = parse_analysis(text, "q");
        assert_eq!(decision.intent, "plan: Q3 launch");
        assert_eq!(decision.required_agents, vec![AgentKind::ContentStrategist]);
    }

    #[test]
    fn test_image_agent_invariant() {
        for content_type in ["blog", "mixed", "image"] {
            let text = format!(
                "CONTENT_TYPE: {}\nREQUIRED_AGENTS: linkedin, strategy\nRESEARCH_NEEDED: yes",
                content_type
            );
            let decision = parse_analysis(&text, "q");
            assert!(!decision.fallback_used);
            assert!(decision.requires(AgentKind::ImageGenerator));
        }
    }

    #[tokio::test]
    async fn test_analyze_sends_history_and_low_temperature() {
        let llm = Arc::new(ScriptedProvider::new(FULL_ANSWER));
        let classifier = IntentClassifier::new(llm.clone());

        let decision = classifier
            .analyze("AI in marketing", &["old request".to_string(), "old answer".to_string()])
            .await
            .unwrap();
        assert_eq!(decision.content_type, ContentType::Blog);

        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(
            request.messages[1].content,
            "Conversation history:\nold request\nold answer\n\nAnalyze this request: AI in marketing"
        );
    }

    #[tokio::test]
    async fn test_completion_failure_is_classifier_error() {
        let llm = Arc::new(FailingProvider::new(|| HeraldError::Network("reset".to_string())));
        let classifier = IntentClassifier::new(llm);
        let result = classifier.produce(&QueryRequest::new("q")).await;
        assert!(matches!(result, Err(HeraldError::Classifier(_))));
    }
}

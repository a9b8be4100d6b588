//! State threaded through one workflow run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

use super::node::NodeId;
use crate::agents::{BlogPost, ContentContext, ImageSet, LinkedInPost};
use crate::research::{ResearchRecord, VerifiedFact};
use crate::routing::{AgentKind, ContentType, RoutingDecision};
use crate::search::SearchResult;

/// Accumulated state of a run.
///
/// `processing_steps`, `completed_agents`, `errors` and `warnings` only ever
/// grow. Every other field is overwritten by the node that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,

    pub user_query: String,
    pub conversation_history: Vec<String>,

    // Routing
    pub query_intent: String,
    pub content_type: Option<ContentType>,
    pub target_audience: Option<String>,
    pub brand_voice: Option<String>,
    pub required_agents: Vec<AgentKind>,
    pub research_needed: bool,
    pub fallback_used: bool,

    // Research
    pub research_results: Vec<SearchResult>,
    pub web_sources: Vec<String>,
    pub key_insights: Vec<String>,
    pub verified_facts: Vec<VerifiedFact>,
    pub research_summary: String,

    // Content
    pub blog_content: String,
    pub linkedin_content: String,
    pub strategy_content: String,
    pub image_prompts: Vec<String>,
    pub generated_images: Vec<PathBuf>,

    // Metrics
    pub keywords: Vec<String>,
    pub seo_score: Option<u32>,
    pub readability_score: Option<f64>,
    pub content_quality_scores: BTreeMap<String, u32>,

    // Progress
    pub current_step: Option<NodeId>,
    pub next_steps: Vec<NodeId>,
    pub processing_steps: Vec<String>,
    pub completed_agents: Vec<AgentKind>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub success: bool,
}

impl WorkflowState {
    pub fn new(query: impl Into<String>, history: Vec<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            user_query: query.into(),
            conversation_history: history,
            query_intent: String::new(),
            content_type: None,
            target_audience: None,
            brand_voice: None,
            required_agents: Vec::new(),
            research_needed: true,
            fallback_used: false,
            research_results: Vec::new(),
            web_sources: Vec::new(),
            key_insights: Vec::new(),
            verified_facts: Vec::new(),
            research_summary: String::new(),
            blog_content: String::new(),
            linkedin_content: String::new(),
            strategy_content: String::new(),
            image_prompts: Vec::new(),
            generated_images: Vec::new(),
            keywords: Vec::new(),
            seo_score: None,
            readability_score: None,
            content_quality_scores: BTreeMap::new(),
            current_step: None,
            next_steps: Vec::new(),
            processing_steps: Vec::new(),
            completed_agents: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            success: false,
        }
    }

    /// Writer input built from the query, routing and research fields.
    pub fn content_context(&self) -> ContentContext {
        ContentContext::new(self.user_query.clone())
            .with_research(self.research_summary.clone(), self.key_insights.clone())
            .with_audience(self.target_audience.clone())
            .with_voice(self.brand_voice.clone())
    }

    pub fn apply_routing(&mut self, decision: RoutingDecision) {
        self.query_intent = decision.intent;
        self.content_type = Some(decision.content_type);
        self.target_audience = decision.target_audience;
        self.brand_voice = decision.brand_voice;
        self.required_agents = decision.required_agents;
        self.research_needed = decision.research_needed;
        self.fallback_used = decision.fallback_used;
    }

    pub fn apply_research(&mut self, record: ResearchRecord) {
        self.research_results = record.raw_results;
        self.web_sources = record.sources;
        self.key_insights = record.insights;
        self.verified_facts = record.verified_facts;
        self.research_summary = record.summary;
        self.keywords.clear();
    }

    /// Blog scores replace any earlier quality scores.
    pub fn apply_blog(&mut self, post: BlogPost) {
        self.blog_content = post.content;
        self.keywords = post.keywords;
        self.seo_score = Some(post.seo_score);
        self.readability_score = Some(post.readability_score);
        self.content_quality_scores = BTreeMap::from([("blog".to_string(), post.quality_score)]);
    }

    pub fn apply_images(&mut self, images: ImageSet) {
        self.image_prompts = images.prompts;
        self.generated_images = images.images;
    }

    pub fn apply_linkedin(&mut self, post: LinkedInPost) {
        if let Some(error) = &post.error {
            self.warnings.push(format!("LinkedIn writer: {}", error));
        }
        self.linkedin_content = post.content;
        self.content_quality_scores
            .insert("linkedin".to_string(), post.quality_score);
    }

    /// Record that `node` finished.
    pub fn complete(&mut self, node: NodeId) {
        self.current_step = Some(node);
        self.processing_steps.push(node.step_label().to_string());
        if let Some(agent) = node.agent() {
            self.completed_agents.push(agent);
        }
    }

    /// Terminal bookkeeping. A run succeeds only when nothing was recorded in
    /// `errors`.
    pub fn finalize(&mut self) {
        self.complete(NodeId::Finalize);
        self.success = self.errors.is_empty();
        self.next_steps.clear();
    }
}

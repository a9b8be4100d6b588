//! Content workflow orchestrator
//!
//! Runs the node graph for one query: each node invokes one agent, merges
//! its result into a copy of the state and picks the next node from that
//! copy.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::execution::{ExecutionTrace, NodeTrace, WorkflowError, WorkflowResult};
use super::node::{NodeId, next_node};
use super::state::WorkflowState;
use crate::agents::{
    Agent, BlogPost, BlogWriterAgent, ContentContext, ImageGenerationAgent, ImageSet,
    LinkedInPost, LinkedInWriterAgent,
};
use crate::cache::ResultCache;
use crate::config::{FailurePolicy, HeraldConfig};
use crate::error::Result;
use crate::images::{HttpImagePipeline, ImageBackend, OpenAIImageBackend, UnconfiguredImageBackend};
use crate::llm::{LLMProvider, LLMProviderFactory, RetryConfig};
use crate::research::{ResearchAggregator, ResearchRecord};
use crate::routing::{IntentClassifier, QueryRequest, RoutingDecision};

/// Shared handle to an agent with the given input and output
pub type Handler<I, O> = Arc<dyn Agent<Input = I, Output = O>>;

/// Final state and trace of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub state: WorkflowState,
    pub trace: ExecutionTrace,
}

/// Drives the content workflow
pub struct ContentOrchestrator {
    classifier: Handler<QueryRequest, RoutingDecision>,
    research: Handler<String, ResearchRecord>,
    blog: Handler<ContentContext, BlogPost>,
    linkedin: Handler<ContentContext, LinkedInPost>,
    images: Handler<ContentContext, ImageSet>,
    policy: FailurePolicy,
}

impl std::fmt::Debug for ContentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentOrchestrator")
            .field("policy", &self.policy)
            .finish()
    }
}

impl ContentOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Build every agent from configuration, choosing the LLM provider with
    /// [`LLMProviderFactory::from_config`].
    pub fn from_config(config: &HeraldConfig) -> WorkflowResult<Self> {
        let llm = LLMProviderFactory::from_config(config)
            .map_err(|e| WorkflowError::InvalidConfig(e.to_string()))?;
        Self::with_provider(config, llm)
    }

    /// Build every agent from configuration around an existing provider.
    pub fn with_provider(config: &HeraldConfig, llm: Arc<dyn LLMProvider>) -> WorkflowResult<Self> {
        config
            .validate()
            .map_err(|e| WorkflowError::InvalidConfig(e.to_string()))?;

        let temperature = config.temperature();
        let retry = RetryConfig::from(&config.retry);

        let research = ResearchAggregator::from_config(config, llm.clone());

        let backend: Arc<dyn ImageBackend> =
            match OpenAIImageBackend::from_config(&config.images, config.timeouts.image, retry.clone()) {
                Ok(backend) => Arc::new(backend),
                Err(e) => {
                    tracing::debug!(error = %e, "image generation disabled");
                    Arc::new(UnconfiguredImageBackend::new(e.to_string()))
                }
            };
        let pipeline = HttpImagePipeline::new(
            config.images.output_dir.clone(),
            config.timeouts.image,
            retry,
        )
        .with_target_size(config.images.target_size);
        let cache = Arc::new(ResultCache::new(config.cache.linkedin_capacity));

        Self::builder()
            .classifier(Arc::new(IntentClassifier::new(llm.clone())))
            .research(Arc::new(research))
            .blog_writer(Arc::new(BlogWriterAgent::new(llm.clone(), temperature)))
            .linkedin_writer(Arc::new(LinkedInWriterAgent::new(
                llm.clone(),
                temperature,
                cache,
            )))
            .image_generator(Arc::new(ImageGenerationAgent::new(
                llm,
                temperature,
                backend,
                Arc::new(pipeline),
            )))
            .failure_policy(config.workflow.failure_policy)
            .build()
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run the workflow for `query` until `Finalize`.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::Abort`] the first node failure is returned as
    /// [`WorkflowError::NodeFailed`]. Under [`FailurePolicy::Degrade`] runs
    /// always finish and failures are listed in `state.errors`.
    pub async fn run(&self, query: &str, history: Vec<String>) -> WorkflowResult<WorkflowRun> {
        let mut state = WorkflowState::new(query, history);
        let mut trace = ExecutionTrace::new(state.run_id);
        let mut node = NodeId::START;

        tracing::info!(run_id = %state.run_id, policy = ?self.policy, "workflow started");

        loop {
            let start = Instant::now();
            match self.execute(node, &state).await {
                Ok(next_state) => {
                    state = next_state;
                    trace.add_node(NodeTrace::success(node, elapsed_ms(start)));
                }
                Err(source) => {
                    trace.add_node(NodeTrace::failure(node, source.to_string(), elapsed_ms(start)));

                    if self.policy == FailurePolicy::Abort {
                        tracing::error!(run_id = %state.run_id, node = %node, error = %source, "workflow aborted");
                        return Err(WorkflowError::NodeFailed { node, source });
                    }

                    let skipped = remaining_nodes(node, &state);
                    state.errors.push(format!("{}: {}", node, source));
                    state.warnings.push(format!(
                        "{} failed; skipped: {}",
                        node,
                        if skipped.is_empty() {
                            "none".to_string()
                        } else {
                            skipped
                                .iter()
                                .map(NodeId::as_str)
                                .collect::<Vec<_>>()
                                .join(", ")
                        }
                    ));
                    tracing::warn!(node = %node, error = %source, skipped = skipped.len(), "node failed, finalizing");

                    state.next_steps = vec![NodeId::Finalize];
                    node = NodeId::Finalize;
                    continue;
                }
            }

            let Some(next) = next_node(node, &state) else {
                break;
            };
            tracing::info!(node = %node, next = %next, "node complete");
            state.next_steps = vec![next];
            node = next;
        }

        tracing::info!(
            run_id = %state.run_id,
            success = state.success,
            duration_ms = trace.total_duration_ms,
            "workflow finished"
        );

        Ok(WorkflowRun { state, trace })
    }

    /// Run one node against a copy of `state`.
    async fn execute(&self, node: NodeId, state: &WorkflowState) -> Result<WorkflowState> {
        let mut next = state.clone();

        match node {
            NodeId::QueryAnalysis => {
                let request = QueryRequest::new(state.user_query.clone())
                    .with_history(state.conversation_history.clone());
                tracing::debug!(agent = %self.classifier.kind(), "analyzing query");
                next.apply_routing(self.classifier.produce(&request).await?);
            }
            NodeId::Research => {
                tracing::debug!(agent = %self.research.kind(), "researching");
                next.apply_research(self.research.produce(&state.user_query).await?);
            }
            NodeId::BlogWriting => {
                tracing::debug!(agent = %self.blog.kind(), "writing blog");
                next.apply_blog(self.blog.produce(&state.content_context()).await?);
            }
            NodeId::ImageGeneration => {
                let mut context = state.content_context();
                context.key_insights.clear();
                tracing::debug!(agent = %self.images.kind(), "generating images");
                next.apply_images(self.images.produce(&context).await?);
            }
            NodeId::LinkedInWriting => {
                tracing::debug!(agent = %self.linkedin.kind(), "writing LinkedIn post");
                next.apply_linkedin(self.linkedin.produce(&state.content_context()).await?);
            }
            NodeId::Finalize => {
                next.finalize();
                return Ok(next);
            }
        }

        next.complete(node);
        Ok(next)
    }
}

/// Nodes that would have followed `failed`, projected from the last good state.
fn remaining_nodes(failed: NodeId, state: &WorkflowState) -> Vec<NodeId> {
    let mut skipped = Vec::new();
    let mut current = failed;
    while let Some(next) = next_node(current, state) {
        if next.is_terminal() {
            break;
        }
        skipped.push(next);
        current = next;
    }
    skipped
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Builder for [`ContentOrchestrator`]
#[derive(Default)]
pub struct OrchestratorBuilder {
    classifier: Option<Handler<QueryRequest, RoutingDecision>>,
    research: Option<Handler<String, ResearchRecord>>,
    blog: Option<Handler<ContentContext, BlogPost>>,
    linkedin: Option<Handler<ContentContext, LinkedInPost>>,
    images: Option<Handler<ContentContext, ImageSet>>,
    policy: FailurePolicy,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifier(mut self, agent: Handler<QueryRequest, RoutingDecision>) -> Self {
        self.classifier = Some(agent);
        self
    }

    pub fn research(mut self, agent: Handler<String, ResearchRecord>) -> Self {
        self.research = Some(agent);
        self
    }

    pub fn blog_writer(mut self, agent: Handler<ContentContext, BlogPost>) -> Self {
        self.blog = Some(agent);
        self
    }

    pub fn linkedin_writer(mut self, agent: Handler<ContentContext, LinkedInPost>) -> Self {
        self.linkedin = Some(agent);
        self
    }

    pub fn image_generator(mut self, agent: Handler<ContentContext, ImageSet>) -> Self {
        self.images = Some(agent);
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidConfig`] when an agent is missing.
    pub fn build(self) -> WorkflowResult<ContentOrchestrator> {
        fn require<T>(agent: Option<T>, name: &str) -> WorkflowResult<T> {
            agent.ok_or_else(|| WorkflowError::InvalidConfig(format!("missing {} agent", name)))
        }

        Ok(ContentOrchestrator {
            classifier: require(self.classifier, "query handler")?,
            research: require(self.research, "research")?,
            blog: require(self.blog, "blog writer")?,
            linkedin: require(self.linkedin, "LinkedIn writer")?,
            images: require(self.images, "image generation")?,
            policy: self.policy,
        })
    }
}

//! # Herald - Multi-Agent Content Pipeline
//!
//! Herald turns a natural-language request ("write a blog about AI in
//! marketing") into researched marketing content:
//! - Intent classification into a routing decision
//! - Web research with credibility-scored insights
//! - Blog, LinkedIn and social-image generation
//! - A workflow state machine that sequences the agents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use herald_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HeraldConfig::load()?;
//!     let orchestrator = ContentOrchestrator::from_config(&config)?;
//!
//!     let run = orchestrator.run("Write a blog about AI in marketing", Vec::new()).await?;
//!     println!("{}", run.state.blog_content);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `llm-openai`: OpenAI chat completions
//! - `llm-anthropic`: Anthropic messages API
//! - `llm-ollama`: local models through Ollama

pub mod agents;
pub mod cache;
pub mod config;
pub mod error;
pub mod images;
pub mod llm;
pub mod persistence;
pub mod publish;
pub mod research;
pub mod routing;
pub mod search;
pub mod workflow;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::agents::{
        Agent, BlogPost, BlogWriterAgent, ContentContext, ContentStrategistAgent,
        ImageGenerationAgent, ImageSet, LinkedInPost, LinkedInWriteError, LinkedInWriterAgent,
        Strategy,
    };
    pub use crate::cache::ResultCache;
    pub use crate::config::{FailurePolicy, HeraldConfig, LLMProviderConfig, LLMProviderKind};
    pub use crate::error::{HeraldError, Result};
    pub use crate::llm::{
        LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, Message, MessageRole,
    };
    pub use crate::persistence::BlogStore;
    pub use crate::publish::{LinkedInOAuth, LinkedInPublisher, PublishOutcome};
    pub use crate::research::{FactStatus, ResearchAggregator, ResearchRecord, VerifiedFact};
    pub use crate::routing::{AgentKind, ContentType, IntentClassifier, RoutingDecision};
    pub use crate::search::{SearchProvider, SearchResult, SerpApiSearch};
    pub use crate::workflow::{
        ContentOrchestrator, ExecutionTrace, NodeId, WorkflowError, WorkflowRun, WorkflowState,
    };
}

//! Query routing: what content a request wants and which agents produce it

pub mod classifier;
pub mod types;

pub use classifier::{IntentClassifier, QueryRequest, parse_analysis};
pub use types::{AgentKind, ContentType, DEFAULT_AGENTS, FALLBACK_AGENTS, RoutingDecision};

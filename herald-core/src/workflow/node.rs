//! Workflow nodes and the transition table

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::WorkflowState;
use crate::routing::{AgentKind, ContentType};

/// A node in the content workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    #[serde(rename = "query_analysis")]
    QueryAnalysis,
    #[serde(rename = "research")]
    Research,
    #[serde(rename = "blog_writing")]
    BlogWriting,
    #[serde(rename = "image_generation")]
    ImageGeneration,
    #[serde(rename = "linkedin_writing")]
    LinkedInWriting,
    #[serde(rename = "finalize")]
    Finalize,
}

impl NodeId {
    /// Entry node of every run
    pub const START: NodeId = NodeId::QueryAnalysis;

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::QueryAnalysis => "query_analysis",
            NodeId::Research => "research",
            NodeId::BlogWriting => "blog_writing",
            NodeId::ImageGeneration => "image_generation",
            NodeId::LinkedInWriting => "linkedin_writing",
            NodeId::Finalize => "finalize",
        }
    }

    /// Label appended to `processing_steps` when the node completes
    pub fn step_label(&self) -> &'static str {
        match self {
            NodeId::QueryAnalysis => "Query Analysis Complete",
            NodeId::Research => "Research Complete",
            NodeId::BlogWriting => "Blog Writing Complete",
            NodeId::ImageGeneration => "Image Generation Complete",
            NodeId::LinkedInWriting => "LinkedIn Writing Complete",
            NodeId::Finalize => "Workflow Complete",
        }
    }

    /// Agent invoked by the node. `Finalize` runs none.
    pub fn agent(&self) -> Option<AgentKind> {
        match self {
            NodeId::QueryAnalysis => Some(AgentKind::QueryHandler),
            NodeId::Research => Some(AgentKind::DeepResearch),
            NodeId::BlogWriting => Some(AgentKind::BlogWriter),
            NodeId::ImageGeneration => Some(AgentKind::ImageGenerator),
            NodeId::LinkedInWriting => Some(AgentKind::LinkedInWriter),
            NodeId::Finalize => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == NodeId::Finalize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node that follows `current`, decided from the state `current` produced.
///
/// Returns `None` after `Finalize`. Only blog requests continue past
/// research; every other content type goes straight to `Finalize`.
pub fn next_node(current: NodeId, state: &WorkflowState) -> Option<NodeId> {
    match current {
        NodeId::QueryAnalysis => Some(NodeId::Research),
        NodeId::Research => {
            if state.content_type == Some(ContentType::Blog) {
                Some(NodeId::BlogWriting)
            } else {
                Some(NodeId::Finalize)
            }
        }
        NodeId::BlogWriting => {
            if state.required_agents.contains(&AgentKind::LinkedInWriter) {
                Some(NodeId::LinkedInWriting)
            } else {
                Some(NodeId::ImageGeneration)
            }
        }
        NodeId::ImageGeneration | NodeId::LinkedInWriting => Some(NodeId::Finalize),
        NodeId::Finalize => None,
    }
}

//! Workflow execution types and error handling

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::node::NodeId;
use crate::error::HeraldError;

/// Error type for workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A node's agent failed and the run was aborted
    #[error("Node '{node}' failed: {source}")]
    NodeFailed {
        node: NodeId,
        #[source]
        source: HeraldError,
    },

    /// The orchestrator could not be assembled
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Trace of a single node execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTrace {
    pub node: NodeId,

    /// Duration of node execution
    pub duration_ms: u64,

    pub success: bool,

    /// Error message if failed
    pub error: Option<String>,
}

impl NodeTrace {
    pub fn success(node: NodeId, duration_ms: u64) -> Self {
        Self {
            node,
            duration_ms,
            success: true,
            error: None,
        }
    }

    pub fn failure(node: NodeId, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            node,
            duration_ms,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Complete execution trace for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub run_id: Uuid,

    /// Node traces in execution order
    pub nodes: Vec<NodeTrace>,

    pub total_duration_ms: u64,

    /// False as soon as any node failed
    pub success: bool,

    /// Last node error
    pub error: Option<String>,
}

impl ExecutionTrace {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            nodes: Vec::new(),
            total_duration_ms: 0,
            success: true,
            error: None,
        }
    }

    pub fn add_node(&mut self, node: NodeTrace) {
        self.total_duration_ms += node.duration_ms;
        if !node.success {
            self.success = false;
            self.error = node.error.clone();
        }
        self.nodes.push(node);
    }

    /// Nodes in the order they ran
    pub fn path(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.node).collect()
    }

    pub fn completed_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_trace() {
        let mut trace = ExecutionTrace::new(Uuid::new_v4());
        trace.add_node(NodeTrace::success(NodeId::QueryAnalysis, 100));
        trace.add_node(NodeTrace::success(NodeId::Research, 150));

        assert!(trace.success);
        assert_eq!(trace.completed_nodes(), 2);
        assert_eq!(trace.total_duration_ms, 250);
        assert_eq!(trace.path(), vec![NodeId::QueryAnalysis, NodeId::Research]);
    }

    #[test]
    fn test_execution_trace_failure() {
        let mut trace = ExecutionTrace::new(Uuid::new_v4());
        trace.add_node(NodeTrace::success(NodeId::QueryAnalysis, 10));
        trace.add_node(NodeTrace::failure(NodeId::Research, "Error occurred", 5));
        trace.add_node(NodeTrace::success(NodeId::Finalize, 0));

        assert!(!trace.success);
        assert_eq!(trace.error.as_deref(), Some("Error occurred"));
        assert_eq!(trace.completed_nodes(), 2);
    }

    #[test]
    fn test_node_failed_display() {
        let err = WorkflowError::NodeFailed {
            node: NodeId::BlogWriting,
            source: HeraldError::Llm("rate limited".to_string()),
        };
        let message = err.to_string();
        assert!(message.starts_with("Node 'blog_writing' failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

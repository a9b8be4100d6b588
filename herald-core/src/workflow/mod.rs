//! Content workflow state machine
//!
//! A run walks a fixed node graph:
//!
//! ```text
//! query_analysis -> research -> blog_writing -> linkedin_writing -> finalize
//!                            \               \-> image_generation -> finalize
//!                             \-> finalize
//! ```
//!
//! Only blog requests continue past research. After the blog, the LinkedIn
//! writer runs when the routing decision asks for it, otherwise images are
//! generated.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_core::config::HeraldConfig;
//! use herald_core::workflow::ContentOrchestrator;
//!
//! let config = HeraldConfig::load()?;
//! let orchestrator = ContentOrchestrator::from_config(&config)?;
//! let run = orchestrator.run("Write a blog about AI in marketing", Vec::new()).await?;
//! println!("{}", run.state.blog_content);
//! ```

mod execution;
mod node;
mod orchestrator;
mod state;

pub use execution::{ExecutionTrace, NodeTrace, WorkflowError, WorkflowResult};
pub use node::{NodeId, next_node};
pub use orchestrator::{ContentOrchestrator, Handler, OrchestratorBuilder, WorkflowRun};
pub use state::WorkflowState;

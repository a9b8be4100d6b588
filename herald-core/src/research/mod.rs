//! Web research: credibility scoring, insight parsing and aggregation

pub mod aggregator;
pub mod credibility;
pub mod insights;

use serde::{Deserialize, Serialize};

use crate::search::SearchResult;

pub use aggregator::ResearchAggregator;
pub use credibility::{FactStatus, VerifiedFact, score};
pub use insights::{MAX_INSIGHTS, parse_insights};

/// Everything one research run learned about a topic.
///
/// Built once by [`ResearchAggregator::research`] and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub topic: String,
    pub raw_results: Vec<SearchResult>,
    /// At most [`MAX_INSIGHTS`] entries
    pub insights: Vec<String>,
    pub verified_facts: Vec<VerifiedFact>,
    pub summary: String,
    /// Links of `raw_results` in order, missing links skipped
    pub sources: Vec<String>,
}

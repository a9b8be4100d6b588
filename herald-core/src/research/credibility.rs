//! Heuristic credibility scoring for research statements

use serde::{Deserialize, Serialize};

/// Scores strictly above this are considered verified
pub const VERIFIED_THRESHOLD: f64 = 0.7;

const AUTHORITATIVE_WORDS: [&str; 6] = ["study", "research", "analysis", "report", "survey", "data"];
const VAGUE_WORDS: [&str; 5] = ["might", "could", "possibly", "maybe", "unclear"];

/// Verification status derived from a credibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactStatus {
    Verified,
    NeedsReview,
}

impl FactStatus {
    pub fn from_score(score: f64) -> Self {
        if score > VERIFIED_THRESHOLD {
            FactStatus::Verified
        } else {
            FactStatus::NeedsReview
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactStatus::Verified => "verified",
            FactStatus::NeedsReview => "needs_review",
        }
    }
}

/// A scored insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedFact {
    pub fact: String,
    pub credibility_score: f64,
    pub status: FactStatus,
}

impl VerifiedFact {
    pub fn assess(fact: impl Into<String>) -> Self {
        let fact = fact.into();
        let credibility_score = score(&fact);
        Self {
            status: FactStatus::from_score(credibility_score),
            fact,
            credibility_score,
        }
    }
}

/// Score a statement in `[0, 1]`.
///
/// Starts at 0.5, adds 0.2 for any ASCII digit and 0.2 for authoritative
/// wording, and subtracts 0.1 once for hedging words. Word checks are
/// case-insensitive substring tests. Arithmetic is done in tenths so equal
/// inputs land on the exact same threshold side.
pub fn score(statement: &str) -> f64 {
    let lower = statement.to_lowercase();
    let mut tenths: i32 = 5;

    if statement.chars().any(|c| c.is_ascii_digit()) {
        tenths += 2;
    }
    if AUTHORITATIVE_WORDS.iter().any(|w| lower.contains(w)) {
        tenths += 2;
    }
    if VAGUE_WORDS.iter().any(|w| lower.contains(w)) {
        tenths -= 1;
    }

    f64::from(tenths.clamp(0, 10)) / 10.0
}

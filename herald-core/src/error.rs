//! Error types for Herald operations

use std::time::Duration;

/// Result type for Herald operations
pub type Result<T> = std::result::Result<T, HeraldError>;

/// Error types for the Herald pipeline
#[derive(Debug, thiserror::Error)]
pub enum HeraldError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request could not be delivered to a remote service
    #[error("Network error: {0}")]
    Network(String),

    /// Remote service answered with a non-success status
    #[error("{service} API error ({status}): {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    /// LLM provider returned something unusable
    #[error("LLM error: {0}")]
    Llm(String),

    /// Intent classification failed (the completion call itself, not an ambiguous answer)
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Web search failed
    #[error("Search error: {0}")]
    Search(String),

    /// Image generation or download failed
    #[error("Image error: {0}")]
    Image(String),

    /// Publishing to LinkedIn failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Persisted state could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// External call exceeded its time budget
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl HeraldError {
    /// Whether the failure is worth another attempt.
    ///
    /// Network failures and timeouts always are; API errors only when the
    /// status is in `retryable_statuses`.
    pub fn is_transient(&self, retryable_statuses: &[u16]) -> bool {
        match self {
            HeraldError::Network(_) | HeraldError::Timeout(_) => true,
            HeraldError::Api { status, .. } => retryable_statuses.contains(status),
            _ => false,
        }
    }
}

/// Whether an error message points at missing or invalid credentials.
///
/// Plain substring test on the lowercased text for "key" or "token".
pub fn mentions_credentials(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("key") || lower.contains("token")
}

impl From<String> for HeraldError {
    fn from(s: String) -> Self {
        HeraldError::Other(s)
    }
}

impl From<&str> for HeraldError {
    fn from(s: &str) -> Self {
        HeraldError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for HeraldError {
    fn from(err: anyhow::Error) -> Self {
        HeraldError::Other(err.to_string())
    }
}

impl From<reqwest::Error> for HeraldError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            HeraldError::Network(format!("request timed out: {}", err))
        } else {
            HeraldError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_detection() {
        assert!(mentions_credentials("Incorrect API key provided"));
        assert!(mentions_credentials("invalid TOKEN"));
        assert!(!mentions_credentials("connection reset by peer"));
    }

    #[test]
    fn test_transient_classification() {
        let statuses = [429, 503];
        assert!(HeraldError::Network("reset".into()).is_transient(&statuses));
        assert!(HeraldError::Timeout(Duration::from_secs(1)).is_transient(&statuses));
        assert!(
            HeraldError::Api {
                service: "OpenAI".into(),
                status: 429,
                message: "slow down".into(),
            }
            .is_transient(&statuses)
        );
        assert!(
            !HeraldError::Api {
                service: "OpenAI".into(),
                status: 401,
                message: "bad key".into(),
            }
            .is_transient(&statuses)
        );
        assert!(!HeraldError::Llm("empty".into()).is_transient(&statuses));
    }

    #[test]
    fn test_from_str() {
        let err: HeraldError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}

//! Publishing posts through the LinkedIn UGC API

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::LinkedInConfig;

/// Result of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    Published { message: String },
    Failed { error: String },
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }

    fn failed(error: impl Into<String>) -> Self {
        PublishOutcome::Failed {
            error: error.into(),
        }
    }
}

/// UGC post body for a text-only, public share
pub fn ugc_payload(author_urn: &str, text: &str) -> serde_json::Value {
    json!({
        "author": author_urn,
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": {
                "shareCommentary": { "text": text },
                "shareMediaCategory": "NONE"
            }
        },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
        }
    })
}

pub struct LinkedInPublisher {
    client: reqwest::Client,
    access_token: Option<String>,
    api_url: String,
    timeout: Duration,
}

impl LinkedInPublisher {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.filter(|t| !t.is_empty()),
            api_url: LinkedInConfig::default().api_url,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &LinkedInConfig, timeout: Duration) -> Self {
        Self {
            api_url: config.api_url.clone(),
            timeout,
            ..Self::new(config.access_token.clone())
        }
    }

    /// Publish `text` as `author_urn`.
    ///
    /// Only a `201 Created` counts as success. The call is made once with a
    /// time budget and never retried, since a repeated POST would duplicate
    /// the post.
    pub async fn publish(&self, text: &str, author_urn: &str) -> PublishOutcome {
        let Some(token) = &self.access_token else {
            return PublishOutcome::failed("LinkedIn access token not set.");
        };

        let request = self
            .client
            .post(&self.api_url)
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&ugc_payload(author_urn, text))
            .send();

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return PublishOutcome::failed(e.to_string()),
            Err(_) => {
                return PublishOutcome::failed(format!(
                    "LinkedIn did not answer within {:?}",
                    self.timeout
                ));
            }
        };

        if response.status() == reqwest::StatusCode::CREATED {
            tracing::info!(author = author_urn, "post published to LinkedIn");
            PublishOutcome::Published {
                message: "Blog posted to LinkedIn successfully.".to_string(),
            }
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "LinkedIn rejected the post");
            PublishOutcome::failed(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = ugc_payload("urn:li:person:abc", "Hello LinkedIn");
        assert_eq!(payload["author"], "urn:li:person:abc");
        assert_eq!(payload["lifecycleState"], "PUBLISHED");
        let share = &payload["specificContent"]["com.linkedin.ugc.ShareContent"];
        assert_eq!(share["shareCommentary"]["text"], "Hello LinkedIn");
        assert_eq!(share["shareMediaCategory"], "NONE");
        assert_eq!(
            payload["visibility"]["com.linkedin.ugc.MemberNetworkVisibility"],
            "PUBLIC"
        );
    }

    #[tokio::test]
    async fn test_missing_token() {
        let publisher = LinkedInPublisher::new(Some(String::new()));
        let outcome = publisher.publish("text", "urn:li:person:abc").await;
        assert_eq!(
            outcome,
            PublishOutcome::Failed {
                error: "LinkedIn access token not set.".to_string()
            }
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = PublishOutcome::Published {
            message: "ok".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "published");
        assert_eq!(json["message"], "ok");
    }
}

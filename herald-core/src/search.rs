//! Web-search capability used by the research aggregator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{HeraldError, Result};
use crate::llm::api_error;

/// SerpAPI never yields more than this many organic results per call
pub const MAX_ORGANIC_RESULTS: usize = 10;

/// One web-search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    /// Absent when the engine returned no usable URL
    pub link: Option<String>,
    pub snippet: String,
    pub source: String,
}

/// Trait for web-search backends
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search the web for `query`, returning at most `limit` results.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Google results through SerpAPI
pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://serpapi.com/search.json")
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn request_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}?engine=google&q={}&num={}&api_key={}",
            self.base_url,
            urlencoding::encode(query),
            limit,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    displayed_link: String,
}

impl From<OrganicResult> for SearchResult {
    fn from(r: OrganicResult) -> Self {
        SearchResult {
            title: r.title,
            link: (!r.link.is_empty()).then_some(r.link),
            snippet: r.snippet,
            source: r.displayed_link,
        }
    }
}

fn parse_response(body: SerpResponse, limit: usize) -> Result<Vec<SearchResult>> {
    if let Some(error) = body.error {
        return Err(HeraldError::Search(error));
    }

    Ok(body
        .organic_results
        .into_iter()
        .take(limit.min(MAX_ORGANIC_RESULTS))
        .map(SearchResult::from)
        .collect())
}

#[async_trait]
impl SearchProvider for SerpApiSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(self.request_url(query, limit))
            .send()
            .await
            .map_err(|e| {
                HeraldError::Network(format!("Failed to reach SerpAPI: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            return Err(api_error("SerpAPI", response).await);
        }

        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| {
                HeraldError::Search(format!(
                    "Failed to parse SerpAPI response: {}",
                    e.without_url()
                ))
            })?;

        parse_response(body, limit)
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}

/// Deterministic stand-in results used when search is unavailable.
///
/// Always three entries templated from `topic`.
pub fn synthetic_results(topic: &str) -> Vec<SearchResult> {
    let slug = topic.replace(' ', "-");

    vec![
        SearchResult {
            title: format!("Comprehensive Guide to {}", topic),
            link: Some(format!("https://example.com/{}", slug)),
            snippet: format!(
                "In-depth analysis of {} with latest trends and insights...",
                topic
            ),
            source: "industry-authority.com".to_string(),
        },
        SearchResult {
            title: format!("Latest Trends in {} for 2024", topic),
            link: Some(format!("https://trends.com/{}-2024", slug)),
            snippet: format!(
                "Discover the emerging trends and future predictions for {}...",
                topic
            ),
            source: "trends-research.com".to_string(),
        },
        SearchResult {
            title: format!("{}: Best Practices and Case Studies", topic),
            link: Some(format!("https://casestudies.com/{}", slug)),
            snippet: format!(
                "Real-world examples and best practices for implementing {}...",
                topic
            ),
            source: "business-insights.com".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_results() {
        let results = synthetic_results("AI in marketing");
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Comprehensive Guide to AI in marketing");
        assert_eq!(
            results[0].link.as_deref(),
            Some("https://example.com/AI-in-marketing")
        );
        assert_eq!(
            results[1].link.as_deref(),
            Some("https://trends.com/AI-in-marketing-2024")
        );
        assert_eq!(results[2].source, "business-insights.com");
    }

    #[tokio::test]
    async fn test_network_error_hides_api_key() {
        let search = SerpApiSearch::with_base_url("secret-serp-key", "http://127.0.0.1:9/search.json");
        let err = search.search("rust", 5).await.unwrap_err();

        assert!(matches!(err, HeraldError::Network(_)));
        assert!(!err.to_string().contains("secret-serp-key"));
    }

    #[test]
    fn test_parse_response_truncates_and_maps() {
        let organic: Vec<serde_json::Value> = (0..15)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Result {}", i),
                    "link": if i == 1 { String::new() } else { format!("https://site{}.com", i) },
                    "snippet": "snippet",
                    "displayed_link": format!("site{}.com", i),
                })
            })
            .collect();
        let body: SerpResponse =
            serde_json::from_value(serde_json::json!({ "organic_results": organic })).unwrap();

        let results = parse_response(body, 25).unwrap();
        assert_eq!(results.len(), MAX_ORGANIC_RESULTS);
        assert_eq!(results[0].source, "site0.com");
        assert!(results[1].link.is_none());
    }

    #[test]
    fn test_parse_response_error_field() {
        let body: SerpResponse =
            serde_json::from_value(serde_json::json!({ "error": "Invalid API key." })).unwrap();
        assert!(matches!(parse_response(body, 10), Err(HeraldError::Search(_))));
    }

    #[test]
    fn test_request_url_encodes_query() {
        let search = SerpApiSearch::new("secret");
        let url = search.request_url("AI & marketing", 5);
        assert!(url.contains("q=AI%20%26%20marketing"));
        assert!(url.contains("num=5"));
    }
}

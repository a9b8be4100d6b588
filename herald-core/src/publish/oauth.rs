//! LinkedIn OAuth 2.0 authorization-code flow

use serde::Deserialize;
use std::time::Duration;

use crate::config::LinkedInConfig;
use crate::error::{HeraldError, Result};
use crate::llm::api_error;

const AUTHORIZATION_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const SCOPES: &str = "r_liteprofile r_emailaddress w_member_social";

/// Access token issued by LinkedIn
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

pub struct LinkedInOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    timeout: Duration,
}

impl LinkedInOAuth {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            token_url: TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// # Errors
    ///
    /// Returns a configuration error when the client id or secret is missing.
    pub fn from_config(config: &LinkedInConfig, timeout: Duration) -> Result<Self> {
        let missing = |name: &str| {
            HeraldError::Configuration(format!(
                "linkedin.{} (or LINKEDIN_{}) is required for OAuth",
                name,
                name.to_uppercase()
            ))
        };
        let client_id = config.client_id.clone().ok_or_else(|| missing("client_id"))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or_else(|| missing("client_secret"))?;

        let mut oauth = Self::new(client_id, client_secret, config.redirect_uri.clone());
        oauth.timeout = timeout;
        Ok(oauth)
    }

    /// URL the user opens to grant the app access.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
            AUTHORIZATION_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES)
        )
    }

    /// Trade an authorization code for an access token.
    ///
    /// Codes are single-use, so the exchange is attempted once.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let request = self.client.post(&self.token_url).form(&params).send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| HeraldError::Timeout(self.timeout))??;

        if !response.status().is_success() {
            return Err(api_error("LinkedIn OAuth", response).await);
        }

        response
            .json::<AccessToken>()
            .await
            .map_err(|e| HeraldError::Publish(format!("Token response had no access_token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let oauth = LinkedInOAuth::new("client-123", "secret", "http://localhost:5000/linkedin/callback");
        let url = oauth.authorization_url();

        assert!(url.starts_with("https://www.linkedin.com/oauth/v2/authorization?response_type=code"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Flinkedin%2Fcallback"));
        assert!(url.ends_with("scope=r_liteprofile%20r_emailaddress%20w_member_social"));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut config = LinkedInConfig::default();
        assert!(LinkedInOAuth::from_config(&config, Duration::from_secs(1)).is_err());

        config.client_id = Some("id".to_string());
        config.client_secret = Some("secret".to_string());
        assert!(LinkedInOAuth::from_config(&config, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_token_parsing() {
        let token: AccessToken =
            serde_json::from_str(r#"{"access_token":"AQX","expires_in":5184000}"#).unwrap();
        assert_eq!(token.access_token, "AQX");
        assert_eq!(token.expires_in, Some(5184000));
    }
}

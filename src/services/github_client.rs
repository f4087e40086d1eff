//! GitHub review client for ReviewBadge.
//!
//! One read-only call: list the reviews of a pull request, first page of 100.
//! The [`ReviewSource`] trait is the seam the resolver depends on, so tests and
//! alternative hosts can supply reviews without HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};

use crate::types::errors::GitHubError;
use crate::types::pull_request::PrReference;
use crate::types::review::ReviewEvent;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const GITHUB_JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Anything that can list the reviews of a pull request.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn list_reviews(&self, pr: &PrReference) -> Result<Vec<ReviewEvent>, GitHubError>;
}

/// GitHub client configuration.
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// API root without trailing slash, e.g. `https://api.github.com`.
    pub base_url: String,
    /// Personal access token. Empty sends no `Authorization` header.
    pub token: String,
    pub timeout_secs: u64,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// reqwest-backed GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubClientConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubClientConfig) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .default_headers(Self::default_headers(&config.token)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GitHubError::ClientError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Headers sent on every request.
    pub fn default_headers(token: &str) -> Result<header::HeaderMap, GitHubError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(GITHUB_JSON_MEDIA_TYPE),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("reviewbadge/", env!("CARGO_PKG_VERSION"))),
        );
        if !token.is_empty() {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GitHubError::ClientError("Token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GETs `path` and decodes a JSON body. Anything but 200 is an error.
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let url = self.api_url(path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GitHubError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GitHubError::ApiError {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GitHubError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ReviewSource for GitHubClient {
    async fn list_reviews(&self, pr: &PrReference) -> Result<Vec<ReviewEvent>, GitHubError> {
        self.get_json(&pr.reviews_path()).await
    }
}

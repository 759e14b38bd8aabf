//! Tool registry client
//!
//! Fetches the scan tool's registry entry: its README (which documents the
//! rules) and the download URL of the packaged tool. No caching or retries
//! here; the generator owns the fallback policy.

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeneratorConfig;
use crate::error::RegistryError;

/// Registry entry fields consumed by rule generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolMetadata {
    /// README of the tool, Markdown
    #[serde(default)]
    pub readme: String,

    /// Download location of the packaged tool archive
    #[serde(rename = "balaURL")]
    pub bala_url: String,
}

impl ToolMetadata {
    /// Parse a registry response body
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Build the HTTP client shared by registry and archive requests
pub fn http_client(config: &GeneratorConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
    if let Some(secs) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// Client for the tool registry endpoint
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    url: String,
}

impl RegistryClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the tool's README and archive URL
    pub async fn fetch_tool_metadata(&self) -> Result<ToolMetadata, RegistryError> {
        tracing::debug!("Fetching scan tool metadata from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| RegistryError::Transport {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let content = response
            .text()
            .await
            .map_err(|source| RegistryError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let metadata =
            ToolMetadata::from_json(&content).map_err(|source| RegistryError::Malformed {
                url: self.url.clone(),
                source,
            })?;

        tracing::debug!(
            "Scan tool archive at {} (README: {} bytes)",
            metadata.bala_url,
            metadata.readme.len()
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn test_parse_metadata() {
        let body = r###"{
            "organization": "ballerina",
            "name": "scan",
            "version": "0.5.0",
            "readme": "## Rules\n",
            "balaURL": "https://fileserver.example.com/scan-0.5.0.bala"
        }"###;
        let metadata = ToolMetadata::from_json(body).unwrap();
        assert_eq!(metadata.readme, "## Rules\n");
        assert_eq!(
            metadata.bala_url,
            "https://fileserver.example.com/scan-0.5.0.bala"
        );
    }

    #[test]
    fn test_missing_url_is_error() {
        assert!(ToolMetadata::from_json(r#"{"readme": "docs"}"#).is_err());
    }

    #[test]
    fn test_missing_readme_defaults_empty() {
        let metadata = ToolMetadata::from_json(r#"{"balaURL": "http://x/a.bala"}"#).unwrap();
        assert!(metadata.readme.is_empty());
    }

    #[test]
    fn test_client_honors_config() {
        let config = GeneratorConfig {
            timeout_seconds: Some(5),
            ..Default::default()
        };
        let client = RegistryClient::new(http_client(&config).unwrap(), &config.registry_url);
        assert_eq!(client.url(), crate::config::DEFAULT_REGISTRY_URL);
    }
}

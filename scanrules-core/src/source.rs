//! Network seam of the generator
//!
//! [`ToolSource`] is everything the generator needs from the outside world.
//! [`HttpToolSource`] talks to the real registry; tests plug in fakes.

use async_trait::async_trait;

use crate::archive::ArchiveExtractor;
use crate::config::GeneratorConfig;
use crate::error::{ArchiveError, RegistryError, SetupError};
use crate::registry::{http_client, RegistryClient, ToolMetadata};
use crate::rules::RawRuleRecord;

/// Where tool metadata and rule descriptors come from
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// README and archive location of the tool
    async fn fetch_tool_metadata(&self) -> Result<ToolMetadata, RegistryError>;

    /// Rule descriptors shipped in the archive at `archive_url`
    async fn extract_rule_info(
        &self,
        archive_url: &str,
    ) -> Result<Vec<RawRuleRecord>, ArchiveError>;
}

/// Registry + archive download over HTTP
#[derive(Debug, Clone)]
pub struct HttpToolSource {
    registry: RegistryClient,
    extractor: ArchiveExtractor,
}

impl HttpToolSource {
    pub fn new(config: &GeneratorConfig) -> Result<Self, SetupError> {
        let client = http_client(config).map_err(|source| SetupError::Client { source })?;

        Ok(Self::from_parts(
            RegistryClient::new(client.clone(), config.registry_url.as_str()),
            ArchiveExtractor::new(client, config.rule_info_entry.as_str()),
        ))
    }

    pub fn from_parts(registry: RegistryClient, extractor: ArchiveExtractor) -> Self {
        Self {
            registry,
            extractor,
        }
    }
}

#[async_trait]
impl ToolSource for HttpToolSource {
    async fn fetch_tool_metadata(&self) -> Result<ToolMetadata, RegistryError> {
        self.registry.fetch_tool_metadata().await
    }

    async fn extract_rule_info(
        &self,
        archive_url: &str,
    ) -> Result<Vec<RawRuleRecord>, ArchiveError> {
        self.extractor.extract_rule_info(archive_url).await
    }
}

//! Generator configuration
//!
//! Every field has a default matching the public registry, so a missing
//! config file is not an error. An optional `config.yaml` in the per-user
//! config directory overrides individual fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default registry endpoint for the scan tool
pub const DEFAULT_REGISTRY_URL: &str = "https://api.central.ballerina.io/2.0/registry/tools/scan/";

/// Archive entry holding the rule descriptors
pub const DEFAULT_RULE_INFO_ENTRY: &str = "resources/rule-info.json";

/// Cache location relative to the user's home directory
const DEFAULT_CACHE_DIR: &str = ".sonar-ballerina";
const DEFAULT_CACHE_FILE: &str = "rule-cache.json";

const CONFIG_FILE: &str = "config.yaml";

/// Settings for one rule generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Registry endpoint returning the tool metadata
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Path of the rule descriptor entry inside the tool archive
    #[serde(default = "default_rule_info_entry")]
    pub rule_info_entry: String,

    /// Where the catalog snapshot lives; `None` resolves under the home directory
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Overall request timeout; the transport default applies when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            rule_info_entry: default_rule_info_entry(),
            cache_path: None,
            user_agent: default_user_agent(),
            timeout_seconds: None,
        }
    }
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_rule_info_entry() -> String {
    DEFAULT_RULE_INFO_ENTRY.to_string()
}

fn default_user_agent() -> String {
    concat!("scanrules/", env!("CARGO_PKG_VERSION")).to_string()
}

impl GeneratorConfig {
    /// Load from the default per-user location, falling back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        // An empty file deserializes to unit, not to an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content)
    }

    /// Default config file path (`<config dir>/scanrules/config.yaml`)
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "ballerina", "scanrules")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("scanrules")))
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Effective cache path: the configured one, or `~/.sonar-ballerina/rule-cache.json`
    pub fn resolved_cache_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.cache_path {
            return Ok(path.clone());
        }

        dirs::home_dir()
            .map(|home| home.join(DEFAULT_CACHE_DIR).join(DEFAULT_CACHE_FILE))
            .ok_or(ConfigError::NoHomeDir)
    }
}

/// Names under which the rules are published to the host platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformSettings {
    pub language_key: String,
    pub language_name: String,
    pub repository_key: String,
    pub repository_name: String,
    pub profile_name: String,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            language_key: "ballerina".to_string(),
            language_name: "Ballerina".to_string(),
            repository_key: "ballerina".to_string(),
            repository_name: "BallerinaAnalyzer".to_string(),
            profile_name: "Ballerina way".to_string(),
        }
    }
}

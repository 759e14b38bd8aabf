//! Platform-facing views of the catalog
//!
//! The host platform registers rules through a repository definition and
//! ships a built-in quality profile that activates every generated rule.

use serde::Serialize;

use crate::config::PlatformSettings;
use crate::rules::Catalog;

/// A rule as registered with the host platform
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub key: String,
    pub name: String,
    pub html_description: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub severity: String,
    pub tags: Vec<String>,
}

/// Rule repository for the analyzed language
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDefinition {
    pub key: String,
    pub name: String,
    pub language: String,
    pub rules: Vec<RuleDefinition>,
}

impl RepositoryDefinition {
    pub fn from_catalog(catalog: &Catalog, settings: &PlatformSettings) -> Self {
        let rules = catalog
            .iter()
            .map(|rule| RuleDefinition {
                key: rule.id.clone(),
                name: rule.name.clone(),
                html_description: rule.description.clone(),
                rule_type: rule.rule_type.clone(),
                severity: rule.severity.clone(),
                tags: rule.tags.clone(),
            })
            .collect();

        Self {
            key: settings.repository_key.clone(),
            name: settings.repository_name.clone(),
            language: settings.language_key.clone(),
            rules,
        }
    }

    pub fn rule(&self, key: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.key == key)
    }
}

/// One activated rule in a quality profile
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRule {
    pub repository_key: String,
    pub rule_key: String,
}

/// Built-in quality profile
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    pub name: String,
    pub language: String,
    pub active_rules: Vec<ActiveRule>,
}

impl QualityProfile {
    /// Default profile with every catalog rule activated
    pub fn activate_all(catalog: &Catalog, settings: &PlatformSettings) -> Self {
        Self {
            name: settings.profile_name.clone(),
            language: settings.language_key.clone(),
            active_rules: catalog
                .ids()
                .map(|id| ActiveRule {
                    repository_key: settings.repository_key.clone(),
                    rule_key: id.to_string(),
                })
                .collect(),
        }
    }

    pub fn is_active(&self, rule_key: &str) -> bool {
        self.active_rules.iter().any(|r| r.rule_key == rule_key)
    }
}

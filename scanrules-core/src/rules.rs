//! Rule records and the merged rule catalog
//!
//! `RawRuleRecord` is what the scan tool ships inside its archive;
//! `RuleMetadata` is what gets published. The catalog joins the two
//! halves (structured records and rendered documentation) by rule id.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Well-known rule types
pub const RULE_TYPE_BUG: &str = "BUG";
pub const RULE_TYPE_VULNERABILITY: &str = "VULNERABILITY";
pub const RULE_TYPE_CODE_SMELL: &str = "CODE_SMELL";

/// One rule descriptor from the archive's rule-info entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawRuleRecord {
    /// Unique rule key
    #[serde(rename = "sqKey")]
    pub key: String,

    /// Display title
    pub title: String,

    /// Rule type, uppercased (`BUG`, `VULNERABILITY`, `CODE_SMELL`)
    #[serde(rename = "type", deserialize_with = "uppercase")]
    pub rule_type: String,

    /// Default severity, uppercased
    #[serde(deserialize_with = "uppercase")]
    pub default_severity: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub remediation: Option<Remediation>,

    #[serde(default)]
    pub rule_specification: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default)]
    pub quickfix: Option<String>,
}

/// Remediation cost model attached to a rule
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    #[serde(default)]
    pub func: Option<String>,

    #[serde(default)]
    pub constant_cost: Option<String>,
}

/// The published taxonomy is case-sensitive, so normalize while parsing
fn uppercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.to_uppercase())
}

/// A complete rule as published to the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    /// Rendered HTML; empty when the documentation has no section for the rule
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub severity: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RuleMetadata {
    /// Join a raw record with its rendered description
    pub fn from_record(record: RawRuleRecord, description: Option<&str>) -> Self {
        Self {
            id: record.key,
            name: record.title,
            description: description.unwrap_or_default().to_string(),
            rule_type: record.rule_type,
            severity: record.default_severity,
            tags: record.tags,
        }
    }
}

/// Rules keyed by id, in order of first discovery
///
/// Serializes as a plain JSON array of [`RuleMetadata`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RuleMetadata>", into = "Vec<RuleMetadata>")]
pub struct Catalog {
    rules: IndexMap<String, RuleMetadata>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, replacing (in place) any earlier rule with the same id
    pub fn insert(&mut self, rule: RuleMetadata) -> Option<RuleMetadata> {
        let replaced = self.rules.insert(rule.id.clone(), rule);
        if let Some(old) = &replaced {
            tracing::debug!("Duplicate rule id '{}', keeping the last definition", old.id);
        }
        replaced
    }

    pub fn get(&self, id: &str) -> Option<&RuleMetadata> {
        self.rules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleMetadata> {
        self.rules.values()
    }

    /// Rule ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl From<Vec<RuleMetadata>> for Catalog {
    fn from(rules: Vec<RuleMetadata>) -> Self {
        let mut catalog = Catalog::new();
        for rule in rules {
            catalog.insert(rule);
        }
        catalog
    }
}

impl From<Catalog> for Vec<RuleMetadata> {
    fn from(catalog: Catalog) -> Self {
        catalog.rules.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a RuleMetadata;
    type IntoIter = indexmap::map::Values<'a, String, RuleMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.values()
    }
}

/// Merge archive records with rendered documentation
///
/// Every record yields exactly one rule. Later records with an id seen
/// before overwrite the earlier one.
pub fn build_catalog(records: Vec<RawRuleRecord>, docs: &BTreeMap<String, String>) -> Catalog {
    let mut catalog = Catalog::new();
    for record in records {
        let description = docs.get(&record.key).map(String::as_str);
        catalog.insert(RuleMetadata::from_record(record, description));
    }
    catalog
}

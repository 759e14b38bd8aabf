//! scanrules - rule catalog generation for an external static analysis tool
//!
//! Builds the rule metadata the code-quality platform publishes for the
//! scan tool, from two halves fetched at runtime:
//!
//! - the rule descriptors packaged in the tool archive (id, title, type,
//!   severity, tags), and
//! - the per-rule prose in the tool's README, rendered to HTML.
//!
//! # Architecture
//!
//! ```text
//! Tool registry (HTTPS)
//!     │
//!     ├── readme   ──► docs::scrape_rule_docs ──► docs::render_all ──┐
//!     └── balaURL  ──► archive (ZIP stream) ──► RawRuleRecord ──────┤
//!                                                                    ▼
//!                                                      rules::build_catalog
//!                                                                    │
//!                          ~/.sonar-ballerina/rule-cache.json ◄──────┤
//!                                 (fallback on failure)              ▼
//!                                                     definitions (repository,
//!                                                      default quality profile)
//! ```

pub mod archive;
pub mod cache;
pub mod config;
pub mod definitions;
pub mod docs;
pub mod error;
pub mod generator;
pub mod registry;
pub mod rules;
pub mod source;

pub use cache::RuleCache;
pub use config::{GeneratorConfig, PlatformSettings, DEFAULT_REGISTRY_URL};
pub use definitions::{QualityProfile, RepositoryDefinition};
pub use error::{ArchiveError, CacheError, ConfigError, GenerationError, RegistryError, SetupError};
pub use generator::RuleGenerator;
pub use registry::ToolMetadata;
pub use rules::{build_catalog, Catalog, RawRuleRecord, RuleMetadata};
pub use source::{HttpToolSource, ToolSource};

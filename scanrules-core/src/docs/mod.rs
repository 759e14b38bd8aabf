//! Rule documentation extraction
//!
//! ```text
//! README (Markdown)
//!     │  tree::parse
//!     ▼
//! Vec<Node>
//!     │  sections::RuleSectionParser
//!     ▼
//! rule id -> Markdown fragment
//!     │  render::render_all
//!     ▼
//! rule id -> HTML description
//! ```

pub mod render;
pub mod sections;
pub mod tree;

use std::collections::BTreeMap;

pub use render::{render, render_all};
pub use sections::{scrape_rule_docs, RuleSectionParser, RULES_SECTION_TITLE};

/// README -> rule id -> HTML description
pub fn rule_descriptions(readme: &str) -> BTreeMap<String, String> {
    render_all(&scrape_rule_docs(readme))
}

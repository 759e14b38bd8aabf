//! Rule section extraction
//!
//! The tool README documents its rules under a `## Rules` heading, one
//! `### <id> - <title>` heading per rule. [`RuleSectionParser`] walks the
//! document tree once and collects the Markdown under each rule heading.

use std::collections::BTreeMap;

use super::tree::Node;

/// Exact text of the level-2 heading that opens the rules section
pub const RULES_SECTION_TITLE: &str = "Rules";

/// State machine over the document tree
#[derive(Debug, Default)]
pub struct RuleSectionParser {
    in_rules_section: bool,
    current_id: Option<String>,
    buffer: String,
    docs: BTreeMap<String, String>,
}

impl RuleSectionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk all nodes and return rule id -> Markdown fragment
    pub fn parse(mut self, nodes: &[Node]) -> BTreeMap<String, String> {
        for node in nodes {
            self.visit(node);
        }
        // No closing heading at end of document
        self.flush();
        self.docs
    }

    fn visit(&mut self, node: &Node) {
        match node {
            Node::Heading { level, .. } => self.visit_heading(*level, &node.plain_text()),
            _ if !self.in_rules_section => self.descend(node),
            Node::Paragraph(_) => self.append(&node.inline_markdown()),
            Node::CodeBlock { info, literal } => {
                self.append(&format!("```{info}\n{literal}```"));
            }
            Node::BlockQuote(_) => self.append(&format!("> {}", node.inline_markdown())),
            Node::BulletList(items) => {
                let lines = items
                    .iter()
                    .map(|item| format!("- {}", item.inline_markdown()))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.append(&lines);
            }
            Node::Code(code) => self.append(&format!("`{}`", code.trim())),
            _ => self.descend(node),
        }
    }

    /// Containers without their own rendering may still hold headings or blocks
    fn descend(&mut self, node: &Node) {
        match node {
            Node::OrderedList(children) | Node::Item(children) | Node::Container(children) => {
                for child in children {
                    self.visit(child);
                }
            }
            _ => {}
        }
    }

    fn visit_heading(&mut self, level: u8, text: &str) {
        if !self.in_rules_section {
            if level == 2 && text == RULES_SECTION_TITLE {
                self.in_rules_section = true;
            }
            return;
        }

        match level {
            2 => {
                self.flush();
                self.current_id = None;
                self.in_rules_section = false;
            }
            3 => {
                self.flush();
                self.current_id = rule_id_from_heading(text);
                if self.current_id.is_none() {
                    tracing::debug!("Skipping rule heading without an id separator: {text}");
                }
            }
            level if level > 3 => {
                let depth = usize::from(level - 2);
                self.append(&format!("{} {text}", "#".repeat(depth)));
            }
            _ => {}
        }
    }

    fn append(&mut self, markdown: &str) {
        self.buffer.push_str(markdown);
        self.buffer.push_str("\n\n");
    }

    /// Hand the buffer to the open rule, if any, and start a fresh one
    fn flush(&mut self) {
        if let Some(id) = &self.current_id {
            if !self.buffer.is_empty() {
                self.docs.insert(id.clone(), self.buffer.clone());
            }
        }
        self.buffer.clear();
    }
}

/// `"R1 - Title"` -> `Some("R1")`; headings without `-` carry no id
fn rule_id_from_heading(text: &str) -> Option<String> {
    let (id, _) = text.split_once('-')?;
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Extract the per-rule Markdown fragments from a README
pub fn scrape_rule_docs(readme: &str) -> BTreeMap<String, String> {
    let nodes = super::tree::parse(readme);
    RuleSectionParser::new().parse(&nodes)
}

//! Owned document tree built from pulldown-cmark events
//!
//! pulldown-cmark hands out a flat event stream; the section parser needs
//! to look at whole blocks (a heading's full text, a list's items), so the
//! events are folded into a small tree first.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

/// A node of the parsed documentation
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading { level: u8, children: Vec<Node> },
    Paragraph(Vec<Node>),
    BlockQuote(Vec<Node>),
    BulletList(Vec<Node>),
    OrderedList(Vec<Node>),
    Item(Vec<Node>),
    CodeBlock { info: String, literal: String },
    /// Inline code span
    Code(String),
    Text(String),
    SoftBreak,
    HardBreak,
    /// Any other container (emphasis, links, tables, ...)
    Container(Vec<Node>),
}

impl Node {
    fn is_inline(&self) -> bool {
        matches!(
            self,
            Node::Code(_) | Node::Text(_) | Node::SoftBreak | Node::HardBreak | Node::Container(_)
        )
    }

    /// Concatenated literal text of the node, breaks as single spaces, trimmed
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, false);
        out.trim().to_string()
    }

    /// Like [`Node::plain_text`], but inline code keeps its backticks
    pub fn inline_markdown(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, true);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String, keep_code: bool) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Code(code) if keep_code => {
                out.push('`');
                out.push_str(code);
                out.push('`');
            }
            Node::Code(code) => out.push_str(code),
            Node::SoftBreak | Node::HardBreak => out.push(' '),
            Node::CodeBlock { literal, .. } => out.push_str(literal),
            Node::Heading { children, .. }
            | Node::Paragraph(children)
            | Node::BlockQuote(children)
            | Node::BulletList(children)
            | Node::OrderedList(children)
            | Node::Item(children)
            | Node::Container(children) => {
                for child in children {
                    child.collect_text(out, keep_code);
                }
            }
        }
    }
}

/// Frame on the builder stack while a tag is open
enum Frame {
    Heading(u8),
    Paragraph,
    BlockQuote,
    BulletList,
    OrderedList,
    Item,
    CodeBlock { info: String, fenced: bool },
    Container,
}

/// Parse Markdown into top-level block nodes
pub fn parse(markdown: &str) -> Vec<Node> {
    let mut stack: Vec<(Frame, Vec<Node>)> = Vec::new();
    let mut root: Vec<Node> = Vec::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(tag) => {
                let frame = match tag {
                    Tag::Heading { level, .. } => Frame::Heading(level as u8),
                    Tag::Paragraph => Frame::Paragraph,
                    Tag::BlockQuote(_) => Frame::BlockQuote,
                    Tag::List(None) => Frame::BulletList,
                    Tag::List(Some(_)) => Frame::OrderedList,
                    Tag::Item => Frame::Item,
                    Tag::CodeBlock(CodeBlockKind::Fenced(info)) => Frame::CodeBlock {
                        info: info.to_string(),
                        fenced: true,
                    },
                    Tag::CodeBlock(CodeBlockKind::Indented) => Frame::CodeBlock {
                        info: String::new(),
                        fenced: false,
                    },
                    _ => Frame::Container,
                };
                stack.push((frame, Vec::new()));
            }
            Event::End(_) => {
                let Some((frame, children)) = stack.pop() else {
                    continue;
                };
                let node = match frame {
                    Frame::Heading(level) => Some(Node::Heading { level, children }),
                    Frame::Paragraph => Some(Node::Paragraph(children)),
                    Frame::BlockQuote => Some(Node::BlockQuote(children)),
                    Frame::BulletList => Some(Node::BulletList(children)),
                    Frame::OrderedList => Some(Node::OrderedList(children)),
                    Frame::Item => Some(Node::Item(wrap_loose_inlines(children))),
                    Frame::CodeBlock { info, fenced } => {
                        let literal = children
                            .iter()
                            .map(|child| match child {
                                Node::Text(text) => text.as_str(),
                                _ => "",
                            })
                            .collect::<String>();
                        // Indented code has no fence to re-emit; the section parser skips it
                        fenced.then(|| Node::CodeBlock { info, literal })
                    }
                    Frame::Container => Some(Node::Container(children)),
                };
                if let Some(node) = node {
                    push(&mut stack, &mut root, node);
                }
            }
            Event::Text(text) => push(&mut stack, &mut root, Node::Text(text.to_string())),
            Event::Code(code) => push(&mut stack, &mut root, Node::Code(code.to_string())),
            Event::SoftBreak => push(&mut stack, &mut root, Node::SoftBreak),
            Event::HardBreak => push(&mut stack, &mut root, Node::HardBreak),
            // Raw HTML, rules, footnote refs, task markers carry no rule prose
            _ => {}
        }
    }

    root
}

fn push(stack: &mut [(Frame, Vec<Node>)], root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some((_, children)) => children.push(node),
        None => root.push(node),
    }
}

/// Tight list items carry inline nodes directly; group them into paragraphs
fn wrap_loose_inlines(children: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut inlines = Vec::new();

    for child in children {
        if child.is_inline() {
            inlines.push(child);
        } else {
            if !inlines.is_empty() {
                blocks.push(Node::Paragraph(std::mem::take(&mut inlines)));
            }
            blocks.push(child);
        }
    }
    if !inlines.is_empty() {
        blocks.push(Node::Paragraph(inlines));
    }

    blocks
}

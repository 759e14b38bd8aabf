//! Markdown to HTML rendering for rule descriptions

use pulldown_cmark::{html, Parser};
use std::collections::BTreeMap;

/// Render one Markdown fragment to HTML
pub fn render(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(markdown));
    out
}

/// Render every extracted fragment exactly once
pub fn render_all(fragments: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    fragments
        .iter()
        .map(|(id, markdown)| (id.clone(), render(markdown)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_renders_empty() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_paragraph_and_code() {
        assert_eq!(render("Do X\n\n"), "<p>Do X</p>\n");
        assert_eq!(
            render("```ballerina\nint x = 1;\n```\n\n"),
            "<pre><code class=\"language-ballerina\">int x = 1;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_render_all_keeps_ids() {
        let mut fragments = BTreeMap::new();
        fragments.insert("R1".to_string(), "## Example\n\n".to_string());

        let rendered = render_all(&fragments);
        assert_eq!(rendered["R1"], "<h2>Example</h2>\n");
    }
}

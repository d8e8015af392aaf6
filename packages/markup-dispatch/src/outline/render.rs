//! Indented tree rendering of an outline.

use console::style;
use textwrap::{wrap, Options};

use super::builder::OutlineNode;

const INDENT: &str = "  ";

/// Render `nodes` as an indented tree.
///
/// Elements are printed as `<name>` on their own line, text leaves are
/// quoted and wrapped to `width` columns (indentation included).
#[must_use]
pub fn render_tree(nodes: &[OutlineNode], width: usize) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, 0, width, &mut out);
    }
    out
}

fn render_node(node: &OutlineNode, depth: usize, width: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);
    match node {
        OutlineNode::Element { name, children } => {
            out.push_str(&format!("{indent}{}\n", style(format!("<{name}>")).cyan()));
            for child in children {
                render_node(child, depth + 1, width, out);
            }
        }
        OutlineNode::Text { text } => {
            let options = Options::new(width.max(indent.len() + 8))
                .initial_indent(&indent)
                .subsequent_indent(&indent);
            for line in wrap(&format!("\"{text}\""), options) {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
}

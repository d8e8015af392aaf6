//! Outline product and the flavor that builds it.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::flavor::ParserFlavor;

/// Whitespace runs collapsed to a single space in text leaves.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A node in the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutlineNode {
    /// A run of text, whitespace collapsed.
    Text { text: String },
    /// A recorded element with its children in source order.
    Element {
        name: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<OutlineNode>,
    },
}

impl OutlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn element(name: impl Into<String>, children: Vec<OutlineNode>) -> Self {
        Self::Element {
            name: name.into(),
            children,
        }
    }

    /// All text below this node, joined with single spaces.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        match self {
            Self::Text { text } => parts.push(text),
            Self::Element { children, .. } => {
                for child in children {
                    child.collect_text(parts);
                }
            }
        }
    }
}

/// Flavor producing a `Vec<OutlineNode>`.
///
/// Handlers open and close elements around their recursion; text runs are
/// appended to the innermost open element. Runs that are only whitespace
/// are dropped.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    roots: Vec<OutlineNode>,
    open: Vec<(String, Vec<OutlineNode>)>,
}

impl OutlineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new element nested in the current one.
    pub fn open_element(&mut self, name: impl Into<String>) {
        self.open.push((name.into(), Vec::new()));
    }

    /// Finish the innermost open element.
    ///
    /// Returns `false` if no element was open.
    pub fn close_element(&mut self) -> bool {
        let Some((name, children)) = self.open.pop() else {
            return false;
        };
        self.append(OutlineNode::element(name, children));
        true
    }

    /// Number of currently open elements.
    #[must_use]
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    fn append(&mut self, node: OutlineNode) {
        match self.open.last_mut() {
            Some((_, children)) => children.push(node),
            None => self.roots.push(node),
        }
    }
}

impl ParserFlavor for OutlineBuilder {
    type Product = Vec<OutlineNode>;

    fn reset(&mut self) {
        self.roots.clear();
        self.open.clear();
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        let collapsed = WHITESPACE_RUN.replace_all(text.trim(), " ");
        if !collapsed.is_empty() {
            self.append(OutlineNode::text(collapsed));
        }
        Ok(())
    }

    fn product(&mut self) -> Self::Product {
        while self.close_element() {}
        std::mem::take(&mut self.roots)
    }
}

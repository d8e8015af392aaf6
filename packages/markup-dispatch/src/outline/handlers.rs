//! Reusable handlers for the outline flavor.
//!
//! None of these attach meaning to a particular tag name; which names they
//! serve is decided when they are constructed.

use crate::config::split_tag_names;
use crate::error::{DispatchError, Result};
use crate::flavor::ParserFlavor;
use crate::parser::Parser;
use crate::registry::{Binding, HandlerBinding, TagHandler};
use crate::tag::Tag;

use super::builder::OutlineBuilder;

/// Record `tag` as an element named `name`, scanning its content inside it.
fn record_element(
    name: String,
    tag: &Tag,
    parser: &mut Parser<OutlineBuilder>,
    scan: impl FnOnce(&mut Parser<OutlineBuilder>) -> Result<bool>,
) -> Result<bool> {
    parser.flavor_mut().open_element(name);
    let result = if tag.has_ending() {
        scan(parser)
    } else {
        Ok(false)
    };
    parser.flavor_mut().close_element();
    result
}

/// Records every supported tag as an element.
///
/// The element is named after the tag (lower-cased) unless a label is set.
#[derive(Debug, Clone)]
pub struct ElementHandler {
    tags: String,
    label: Option<String>,
}

impl ElementHandler {
    /// Handle the comma-separated `tags`.
    pub fn new(tags: impl Into<String>) -> Self {
        Self {
            tags: tags.into(),
            label: None,
        }
    }

    /// Name every recorded element `label` instead of the tag name.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl TagHandler<OutlineBuilder> for ElementHandler {
    fn supported_tags(&self) -> &str {
        &self.tags
    }

    fn handle(&self, tag: &Tag, parser: &mut Parser<OutlineBuilder>) -> Result<bool> {
        let name = self
            .label
            .clone()
            .unwrap_or_else(|| tag.name().to_ascii_lowercase());
        record_element(name, tag, parser, |p| p.parse_inner(tag))
    }
}

/// A container that reinterprets other tag names inside its content.
///
/// Container tags are recorded as elements. While a container's content is
/// scanned, the `claims` names are bound to this handler and recorded as
/// elements named `label`; outside any container they go to whatever
/// handler is normally registered for them (or nowhere).
#[derive(Debug)]
pub struct ScopeHandler {
    containers: String,
    container_names: Vec<String>,
    claims: String,
    label: String,
    binding: HandlerBinding,
}

impl ScopeHandler {
    /// Create a scope for the comma-separated `containers` claiming the
    /// comma-separated `claims`.
    pub fn new(containers: &str, claims: &str, label: impl Into<String>) -> Result<Self> {
        let container_names = split_tag_names(containers)?;
        split_tag_names(claims)?;
        Ok(Self {
            containers: containers.to_string(),
            container_names,
            claims: claims.to_string(),
            label: label.into(),
            binding: HandlerBinding::new(),
        })
    }

    fn is_container(&self, tag: &Tag) -> bool {
        self.container_names.iter().any(|name| name == tag.name())
    }
}

impl TagHandler<OutlineBuilder> for ScopeHandler {
    fn supported_tags(&self) -> &str {
        &self.containers
    }

    fn handle(&self, tag: &Tag, parser: &mut Parser<OutlineBuilder>) -> Result<bool> {
        if !self.is_container(tag) {
            return record_element(self.label.clone(), tag, parser, |p| p.parse_inner(tag));
        }

        let own_id = self.binding.handler_id(tag)?;
        record_element(tag.name().to_ascii_lowercase(), tag, parser, |p| {
            p.with_override(own_id, &self.claims, |p| p.parse_inner(tag))
        })
    }

    fn bind(&self, binding: Binding) -> Result<()> {
        self.binding.bind(binding)
    }
}

/// Replaces a tag with the text of the resource its content names.
///
/// `<include>parts/intro.txt</include>` fetches `parts/intro.txt` through
/// the parser's resolver and emits it as text. The fetched text is not
/// scanned for tags.
#[derive(Debug, Clone)]
pub struct IncludeHandler {
    tags: String,
}

impl IncludeHandler {
    pub fn new(tags: impl Into<String>) -> Self {
        Self { tags: tags.into() }
    }
}

impl<F: ParserFlavor> TagHandler<F> for IncludeHandler {
    fn supported_tags(&self) -> &str {
        &self.tags
    }

    fn handle(&self, tag: &Tag, parser: &mut Parser<F>) -> Result<bool> {
        if !tag.has_ending() {
            tracing::debug!(tag = tag.name(), offset = tag.start(), "Include without location");
            return Ok(false);
        }

        let location = parser.source()[tag.content()].trim().to_string();
        let resolver = parser.resolver().ok_or(DispatchError::NoResolver)?;
        let text = resolver.fetch(&location)?;

        tracing::debug!(location = %location, len = text.len(), "Including resource");
        if !text.is_empty() {
            parser.flavor_mut().emit_text(&text)?;
        }
        Ok(false)
    }
}

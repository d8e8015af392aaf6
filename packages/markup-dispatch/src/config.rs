//! Configuration constants, tag-name helpers, and runtime configuration.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{DispatchError, Result};

/// Default limit on nested `run` calls.
///
/// Recursion depth follows markup nesting depth. 256 levels is far beyond
/// any legitimate document while keeping the call stack well within bounds.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Maximum size of a source file read by the command-line tool (16 MB).
pub const MAX_SOURCE_SIZE: u64 = 16 * 1024 * 1024;

/// Default wrap width for text leaves in tree output.
pub const TEXT_WRAP_WIDTH: usize = 80;

/// Tag name pattern: ASCII letters, digits and `:_.-`, optionally prefixed
/// with `/` (end tags), `!` or `?` (declarations).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TAG_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[/!?]?[A-Z0-9:_.\-]+$|^!--$").expect("valid regex"));

/// Normalize a tag name for table lookup (trimmed, ASCII upper-case).
///
/// # Examples
/// ```
/// use markup_dispatch::config::normalize_tag_name;
///
/// assert_eq!(normalize_tag_name(" font "), "FONT");
/// ```
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Validate a normalized tag name.
///
/// # Examples
/// ```
/// use markup_dispatch::config::validate_tag_name;
///
/// assert!(validate_tag_name("FONT").is_ok());
/// assert!(validate_tag_name("LI.NR").is_ok());
/// assert!(validate_tag_name("TWO WORDS").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<()> {
    if TAG_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(DispatchError::InvalidTagName(name.to_string()))
    }
}

/// Split a comma-separated tag list such as `"I,B,FONT"` into normalized
/// names.
///
/// Empty entries (e.g. from a trailing comma) are ignored; every remaining
/// entry must be a valid tag name.
///
/// # Examples
/// ```
/// use markup_dispatch::config::split_tag_names;
///
/// let names = split_tag_names("i, b,font,").unwrap();
/// assert_eq!(names, vec!["I", "B", "FONT"]);
/// ```
pub fn split_tag_names(list: &str) -> Result<Vec<String>> {
    list.split(',')
        .map(normalize_tag_name)
        .filter(|name| !name.is_empty())
        .map(|name| validate_tag_name(&name).map(|()| name))
        .collect()
}

/// Runtime limits for a single parser instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of `run` calls before `DepthExceeded` is returned.
    pub max_depth: usize,
}

impl ParserConfig {
    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A container tag that reinterprets other tag names inside its content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScopeRule {
    /// Comma-separated container tag names, e.g. `"MYITEMS"`.
    pub container: String,
    /// Comma-separated names claimed inside the container, e.g. `"IT"`.
    pub claims: String,
    /// Element name recorded for claimed tags.
    pub label: String,
}

/// Declarative configuration for the outline parser.
///
/// Loaded from YAML by the command-line tool:
///
/// ```yaml
/// max_depth: 64
/// elements: [B, I, P]
/// include_tags: [INCLUDE]
/// scopes:
///   - container: MYITEMS
///     claims: IT
///     label: item
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Nesting limit for the parser.
    pub max_depth: usize,
    /// Tag names recorded as plain elements.
    pub elements: Vec<String>,
    /// Tag names whose content is a location to include.
    pub include_tags: Vec<String>,
    /// Scoped reinterpretation rules.
    pub scopes: Vec<ScopeRule>,
}

impl DispatchConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parser limits derived from this configuration.
    #[must_use]
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default().with_max_depth(self.max_depth)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            elements: Vec::new(),
            include_tags: Vec::new(),
            scopes: Vec::new(),
        }
    }
}

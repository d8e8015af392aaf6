//! Error types for the dispatch engine.
//!
//! Contract violations (bad ranges, unbalanced overrides, use before `init`)
//! are reported through the same enum as handler and I/O failures, so a
//! caller always gets a loud `Err` and never a silently clamped result.

use thiserror::Error;

use crate::registry::HandlerId;

/// Main error type for the dispatch library.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `run` was called with offsets outside the source or off a char boundary.
    #[error("Invalid parse range {begin}..{end} for source of length {len}")]
    InvalidRange { begin: usize, end: usize, len: usize },

    /// `run` was called before `init`.
    #[error("Parser used before init() was called")]
    NotInitialized,

    /// `pop_handler` was called without a matching `push_handler`.
    #[error("pop_handler() called with an empty override stack")]
    EmptyOverrideStack,

    /// Override frames left on the stack when they should have been popped.
    #[error("Unbalanced handler overrides: {depth} frame(s) still pushed")]
    UnbalancedOverrides { depth: usize },

    /// Nested `run` calls exceeded the configured limit.
    #[error("Maximum nesting depth of {limit} exceeded")]
    DepthExceeded { limit: usize },

    /// A tag name in a handler's tag list is empty or malformed.
    #[error("Invalid tag name: '{0}'")]
    InvalidTagName(String),

    /// A handler id that this parser never issued.
    #[error("Unknown handler id {0}")]
    UnknownHandler(HandlerId),

    /// A handler instance was offered to a second parser.
    #[error("Handler is already bound to parser {parser}")]
    AlreadyBound { parser: u64 },

    /// A handler needed the resource resolver but none was set.
    #[error("No resource resolver set on the parser")]
    NoResolver,

    /// A resource location tried to leave the resolver's root.
    #[error("Resource location escapes resolver root: {0}")]
    ResourceOutsideRoot(String),

    /// A handler failed while processing a tag.
    #[error("Handler for <{tag}> failed: {message}")]
    HandlerFailed { tag: String, message: String },

    /// Input larger than the configured limit.
    #[error("Source is {size} bytes, larger than the limit of {limit} bytes")]
    SourceTooLarge { size: u64, limit: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration or output error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl DispatchError {
    /// Convenience constructor for handler failures.
    pub fn handler(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerFailed {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

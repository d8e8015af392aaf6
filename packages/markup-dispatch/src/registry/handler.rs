//! Tag handler trait definition.

use std::cell::OnceCell;
use std::fmt;

use crate::error::{DispatchError, Result};
use crate::flavor::ParserFlavor;
use crate::parser::{Parser, ParserId};
use crate::tag::Tag;

/// Identifier of a distinct handler instance within one parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(usize);

impl HandlerId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a handler learns when it is added to a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// The parser the handler now belongs to.
    pub parser: ParserId,
    /// The handler's own id in that parser, usable with `push_handler`.
    pub handler: HandlerId,
}

/// Trait for tag handlers.
///
/// Handling a tag happens in three steps:
/// 1. the handler changes parser state (through the `&mut Parser` it gets),
/// 2. the parser scans the content between the start and end tag
///    ([`Parser::parse_inner`]),
/// 3. the handler restores the state it changed.
///
/// The parser restores nothing on the handler's behalf. Use
/// [`Parser::with_override`] to make step 3 automatic for handler overrides.
pub trait TagHandler<F: ParserFlavor> {
    /// Comma-separated list of upper-case tag names, e.g. `"I,B,FONT,P"`.
    fn supported_tags(&self) -> &str;

    /// Process `tag`.
    ///
    /// Returns `true` if the handler scanned the tag's content through
    /// [`Parser::parse_inner`], `false` otherwise. Either way the parser
    /// continues after the tag's `unit_end`.
    fn handle(&self, tag: &Tag, parser: &mut Parser<F>) -> Result<bool>;

    /// Called once when the handler is first added to a parser.
    ///
    /// Default implementation ignores the binding.
    fn bind(&self, _binding: Binding) -> Result<()> {
        Ok(())
    }
}

/// Reusable cell for handlers that need to remember their binding.
///
/// Rejects a second binding to a different parser, since a handler
/// instance must only ever be driven by one parser.
#[derive(Debug, Default)]
pub struct HandlerBinding {
    cell: OnceCell<Binding>,
}

impl HandlerBinding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `binding`, or check it against the stored one.
    pub fn bind(&self, binding: Binding) -> Result<()> {
        match self.cell.get() {
            Some(existing) if existing.parser != binding.parser => Err(DispatchError::AlreadyBound {
                parser: existing.parser.get(),
            }),
            Some(_) => Ok(()),
            None => {
                let _ = self.cell.set(binding);
                Ok(())
            }
        }
    }

    /// The stored binding, if any.
    #[must_use]
    pub fn get(&self) -> Option<Binding> {
        self.cell.get().copied()
    }

    /// The handler's own id; fails if the handler was never added to a parser.
    pub fn handler_id(&self, tag: &Tag) -> Result<HandlerId> {
        self.get()
            .map(|binding| binding.handler)
            .ok_or_else(|| DispatchError::handler(tag.name(), "handler is not bound to a parser"))
    }
}

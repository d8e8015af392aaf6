//! Handler registry mapping tag names to handlers, with an override stack.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::handler::{HandlerId, TagHandler};
use crate::config::split_tag_names;
use crate::error::{DispatchError, Result};
use crate::flavor::ParserFlavor;

/// Identity of one pushed override frame, unique within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

/// One `push` worth of undo records.
#[derive(Debug)]
struct OverrideFrame {
    id: FrameId,
    handler: HandlerId,
    saved: Vec<(String, Option<HandlerId>)>,
}

/// Registry mapping tag names to handler instances.
///
/// Several names may map to the same handler. Each distinct handler
/// instance is stored once and addressed by its [`HandlerId`].
pub struct HandlerRegistry<F: ParserFlavor> {
    handlers: Vec<Rc<dyn TagHandler<F>>>,
    by_name: HashMap<String, HandlerId>,
    overrides: Vec<OverrideFrame>,
    next_frame: u64,
}

impl<F: ParserFlavor> HandlerRegistry<F> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            by_name: HashMap::new(),
            overrides: Vec::new(),
            next_frame: 0,
        }
    }

    /// Register a handler under all of its supported tag names.
    ///
    /// Returns the handler's id and whether the instance is new to this
    /// registry. Adding the same instance twice reuses its id.
    pub fn register(&mut self, handler: Rc<dyn TagHandler<F>>) -> Result<(HandlerId, bool)> {
        let names = split_tag_names(handler.supported_tags())?;

        let (id, is_new) = match self.find(&handler) {
            Some(id) => (id, false),
            None => {
                self.handlers.push(handler);
                (HandlerId::new(self.handlers.len() - 1), true)
            }
        };

        for name in names {
            self.by_name.insert(name, id);
        }
        Ok((id, is_new))
    }

    /// Find the id of an already registered handler instance.
    #[must_use]
    pub fn find(&self, handler: &Rc<dyn TagHandler<F>>) -> Option<HandlerId> {
        self.handlers
            .iter()
            .position(|h| std::ptr::addr_eq(Rc::as_ptr(h), Rc::as_ptr(handler)))
            .map(HandlerId::new)
    }

    /// Id the next new handler instance will receive.
    #[must_use]
    pub fn next_id(&self) -> HandlerId {
        HandlerId::new(self.handlers.len())
    }

    /// Look up the handler id bound to a normalized tag name.
    #[must_use]
    pub fn lookup(&self, tag_name: &str) -> Option<HandlerId> {
        self.by_name.get(tag_name).copied()
    }

    /// Get the handler instance for an id.
    #[must_use]
    pub fn get(&self, id: HandlerId) -> Option<&Rc<dyn TagHandler<F>>> {
        self.handlers.get(id.index())
    }

    /// Get the handler instance currently bound to a tag name.
    #[must_use]
    pub fn handler_for(&self, tag_name: &str) -> Option<Rc<dyn TagHandler<F>>> {
        self.lookup(tag_name).and_then(|id| self.get(id)).cloned()
    }

    /// Check if a handler is bound to a tag.
    #[must_use]
    pub fn has_handler(&self, tag_name: &str) -> bool {
        self.by_name.contains_key(tag_name)
    }

    /// Number of distinct handler instances.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// All tag names that currently have a handler, sorted.
    #[must_use]
    pub fn registered_tags(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Temporarily bind `tags` (comma-separated) to `handler`.
    ///
    /// The previous binding of each name, including "no binding", is
    /// saved so [`pop`](Self::pop) can restore it exactly.
    pub fn push(&mut self, handler: HandlerId, tags: &str) -> Result<FrameId> {
        if self.get(handler).is_none() {
            return Err(DispatchError::UnknownHandler(handler));
        }
        let names = split_tag_names(tags)?;

        let mut saved = Vec::with_capacity(names.len());
        for name in names {
            let previous = self.by_name.insert(name.clone(), handler);
            saved.push((name, previous));
        }
        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        self.overrides.push(OverrideFrame { id, handler, saved });
        Ok(id)
    }

    /// Undo the most recent [`push`](Self::push).
    ///
    /// Returns the id of the handler that pushed the frame.
    pub fn pop(&mut self) -> Result<HandlerId> {
        let frame = self
            .overrides
            .pop()
            .ok_or(DispatchError::EmptyOverrideStack)?;

        // Reverse order so a name listed twice ends up at its original binding.
        for (name, previous) in frame.saved.into_iter().rev() {
            match previous {
                Some(id) => {
                    self.by_name.insert(name, id);
                }
                None => {
                    self.by_name.remove(&name);
                }
            }
        }
        Ok(frame.handler)
    }

    /// Number of override frames currently pushed.
    #[must_use]
    pub fn override_depth(&self) -> usize {
        self.overrides.len()
    }

    /// Stack position of `frame`, if it is still pushed.
    #[must_use]
    pub fn frame_position(&self, frame: FrameId) -> Option<usize> {
        self.overrides.iter().rposition(|f| f.id == frame)
    }

    /// Pop frames until only `depth` remain, returning how many were popped.
    pub fn unwind_to(&mut self, depth: usize) -> usize {
        let mut popped = 0;
        while self.overrides.len() > depth && self.pop().is_ok() {
            popped += 1;
        }
        popped
    }

    /// Pop every remaining override frame, returning how many there were.
    pub fn unwind(&mut self) -> usize {
        self.unwind_to(0)
    }
}

impl<F: ParserFlavor> Default for HandlerRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ParserFlavor> fmt::Debug for HandlerRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .field("by_name", &self.by_name)
            .field("overrides", &self.overrides)
            .finish()
    }
}

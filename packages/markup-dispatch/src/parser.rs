//! The scan-and-dispatch engine.
//!
//! A [`Parser`] divides a source into text runs and tags. Text runs go to
//! the flavor's `emit_text` hook; tags go to the handler registered for
//! their name. A handler may call back into [`Parser::run`] (usually via
//! [`Parser::parse_inner`]) to scan the tag's content, which is where the
//! recursion happens. Each `run` frame keeps its own cursor, so inner and
//! outer scans never share position state.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::{TagCache, TagSource};
use crate::config::{normalize_tag_name, split_tag_names, ParserConfig};
use crate::error::{DispatchError, Result};
use crate::flavor::ParserFlavor;
use crate::registry::{Binding, FrameId, HandlerId, HandlerRegistry, TagHandler};
use crate::resolver::ResourceResolver;
use crate::tag::Tag;

static NEXT_PARSER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a parser instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserId(u64);

impl ParserId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PARSER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Markup parser driving a flavor `F` through registered tag handlers.
pub struct Parser<F: ParserFlavor> {
    id: ParserId,
    config: ParserConfig,
    flavor: F,
    tags: Box<dyn TagSource>,
    registry: HandlerRegistry<F>,
    resolver: Option<Rc<dyn ResourceResolver>>,
    source: String,
    initialized: bool,
    depth: usize,
}

impl<F: ParserFlavor> Parser<F> {
    /// Create a parser with default limits and the default tag cache.
    #[must_use]
    pub fn new(flavor: F) -> Self {
        Self::with_config(flavor, ParserConfig::default())
    }

    /// Create a parser with explicit limits.
    #[must_use]
    pub fn with_config(flavor: F, config: ParserConfig) -> Self {
        Self {
            id: ParserId::next(),
            config,
            flavor,
            tags: Box::new(TagCache::new()),
            registry: HandlerRegistry::new(),
            resolver: None,
            source: String::new(),
            initialized: false,
            depth: 0,
        }
    }

    /// Replace the tag source (tokenizer).
    #[must_use]
    pub fn with_tag_source(mut self, tags: impl TagSource + 'static) -> Self {
        self.tags = Box::new(tags);
        self
    }

    #[must_use]
    pub fn id(&self) -> ParserId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[must_use]
    pub fn flavor(&self) -> &F {
        &self.flavor
    }

    pub fn flavor_mut(&mut self) -> &mut F {
        &mut self.flavor
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry<F> {
        &self.registry
    }

    /// The source of the current pass (empty outside a pass).
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Set the resolver handlers use for external references.
    pub fn set_resolver(&mut self, resolver: Rc<dyn ResourceResolver>) {
        self.resolver = Some(resolver);
    }

    /// The resolver set with [`set_resolver`](Self::set_resolver), if any.
    #[must_use]
    pub fn resolver(&self) -> Option<Rc<dyn ResourceResolver>> {
        self.resolver.clone()
    }

    /// Handler currently bound to `tag_name` (any case).
    #[must_use]
    pub fn handler_for(&self, tag_name: &str) -> Option<HandlerId> {
        self.registry.lookup(&normalize_tag_name(tag_name))
    }

    /// Number of handler overrides currently pushed.
    #[must_use]
    pub fn override_depth(&self) -> usize {
        self.registry.override_depth()
    }

    /// Add a handler under every tag name it supports.
    pub fn add_handler(&mut self, handler: impl TagHandler<F> + 'static) -> Result<HandlerId> {
        self.add_shared_handler(Rc::new(handler))
    }

    /// Add a shared handler instance under every tag name it supports.
    ///
    /// The handler is bound to this parser the first time it is added.
    /// Adding the same instance again re-registers its names without
    /// binding it a second time.
    pub fn add_shared_handler(&mut self, handler: Rc<dyn TagHandler<F>>) -> Result<HandlerId> {
        split_tag_names(handler.supported_tags())?;

        if self.registry.find(&handler).is_none() {
            handler.bind(Binding {
                parser: self.id,
                handler: self.registry.next_id(),
            })?;
        }
        let supported = handler.supported_tags().to_string();
        let (id, _) = self.registry.register(handler)?;

        tracing::debug!(parser = %self.id, handler = %id, tags = %supported, "Added tag handler");
        Ok(id)
    }

    /// Temporarily bind `tags` (comma-separated) to `handler`.
    ///
    /// Use this when a handler must claim tag names it does not support
    /// natively, e.g. a list container intercepting its items. Must be
    /// matched by [`pop_handler`](Self::pop_handler).
    pub fn push_handler(&mut self, handler: HandlerId, tags: &str) -> Result<()> {
        self.push_frame(handler, tags).map(|_| ())
    }

    fn push_frame(&mut self, handler: HandlerId, tags: &str) -> Result<FrameId> {
        let frame = self.registry.push(handler, tags)?;
        tracing::debug!(
            handler = %handler,
            tags,
            depth = self.registry.override_depth(),
            "Pushed handler override"
        );
        Ok(frame)
    }

    /// Restore the bindings replaced by the most recent push.
    pub fn pop_handler(&mut self) -> Result<HandlerId> {
        let handler = self.registry.pop()?;
        tracing::debug!(
            handler = %handler,
            depth = self.registry.override_depth(),
            "Popped handler override"
        );
        Ok(handler)
    }

    /// Run `f` with `tags` bound to `handler`, restoring the bindings
    /// afterwards even if `f` fails.
    ///
    /// Overrides pushed by `f` and not popped are unwound and reported
    /// as [`DispatchError::UnbalancedOverrides`]. If `f` pops this frame,
    /// whatever `f` left above the starting depth is unwound and the
    /// mismatch is reported too.
    pub fn with_override<R>(
        &mut self,
        handler: HandlerId,
        tags: &str,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let base = self.registry.override_depth();
        let frame = self.push_frame(handler, tags)?;

        let result = f(self);

        let Some(position) = self.registry.frame_position(frame) else {
            let stray = self.registry.unwind_to(base);
            tracing::warn!(handler = %handler, stray, "Override frame popped by its own scope");
            result?;
            return Err(if stray == 0 {
                DispatchError::EmptyOverrideStack
            } else {
                DispatchError::UnbalancedOverrides { depth: stray }
            });
        };

        let extra = self.registry.unwind_to(position) - 1;
        tracing::debug!(handler = %handler, depth = position, "Popped handler override");
        let value = result?;
        if extra > 0 {
            return Err(DispatchError::UnbalancedOverrides { depth: extra });
        }
        Ok(value)
    }

    /// Start a new pass over `source`.
    ///
    /// Resets the tag source, the flavor's per-pass state and the nesting
    /// counter. The handler table is left alone.
    pub fn init(&mut self, source: impl Into<String>) {
        let stale = self.registry.unwind();
        if stale > 0 {
            tracing::warn!(frames = stale, "Discarded handler overrides from an earlier pass");
        }

        self.source = source.into();
        self.tags.reset(&self.source);
        self.flavor.reset();
        self.depth = 0;
        self.initialized = true;

        tracing::debug!(parser = %self.id, len = self.source.len(), "Initialized parser");
    }

    /// End the current pass.
    ///
    /// Fails with [`DispatchError::UnbalancedOverrides`] if handlers left
    /// overrides pushed; the bindings are restored either way.
    pub fn done(&mut self) -> Result<()> {
        self.clear_pass();

        let depth = self.registry.unwind();
        if depth > 0 {
            tracing::warn!(depth, "Handler overrides still pushed at end of pass");
            return Err(DispatchError::UnbalancedOverrides { depth });
        }
        Ok(())
    }

    /// Parse a complete document and return the flavor's product.
    ///
    /// This calls [`init`](Self::init), [`run_all`](Self::run_all),
    /// `ParserFlavor::product` and [`done`](Self::done). On failure the
    /// pass is discarded and no product is returned.
    pub fn parse(&mut self, source: impl Into<String>) -> Result<F::Product> {
        self.init(source);

        if let Err(err) = self.run_all() {
            let unwound = self.registry.unwind();
            self.clear_pass();
            tracing::debug!(error = %err, unwound, "Parse aborted");
            return Err(err);
        }

        let product = self.flavor.product();
        self.done()?;
        Ok(product)
    }

    /// Scan the whole source of the current pass.
    pub fn run_all(&mut self) -> Result<()> {
        self.run(0, self.source.len())
    }

    /// Scan the content of `tag` and return `Ok(true)`.
    ///
    /// Meant as the tail of a handler's `handle`.
    pub fn parse_inner(&mut self, tag: &Tag) -> Result<bool> {
        let content = tag.content();
        self.run(content.start, content.end)?;
        Ok(true)
    }

    /// Scan `source[begin..end]`, emitting text and dispatching tags.
    ///
    /// Re-entrant: handlers call this (directly or through
    /// [`parse_inner`](Self::parse_inner)) for nested content.
    pub fn run(&mut self, begin: usize, end: usize) -> Result<()> {
        if !self.initialized {
            return Err(DispatchError::NotInitialized);
        }
        let len = self.source.len();
        if begin > end
            || end > len
            || !self.source.is_char_boundary(begin)
            || !self.source.is_char_boundary(end)
        {
            return Err(DispatchError::InvalidRange { begin, end, len });
        }
        if self.depth >= self.config.max_depth {
            return Err(DispatchError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        self.depth += 1;
        let result = self.scan(begin, end);
        self.depth -= 1;
        result
    }

    fn scan(&mut self, begin: usize, end: usize) -> Result<()> {
        let mut cursor = begin;

        while cursor < end {
            let Some(tag) = self.tags.next_tag(cursor, end) else {
                self.emit(cursor, end)?;
                break;
            };

            let tag = tag.clamped(end);
            if tag.start() < cursor
                || tag.unit_end() <= cursor
                || !self.source.is_char_boundary(tag.start())
                || !self.source.is_char_boundary(tag.unit_end())
            {
                return Err(DispatchError::InvalidRange {
                    begin: tag.start(),
                    end: tag.unit_end(),
                    len: self.source.len(),
                });
            }

            self.emit(cursor, tag.start())?;
            F::dispatch_tag(self, &tag)?;
            cursor = tag.unit_end();
        }

        Ok(())
    }

    fn emit(&mut self, from: usize, to: usize) -> Result<()> {
        if from < to {
            self.flavor.emit_text(&self.source[from..to])?;
        }
        Ok(())
    }

    /// Default tag dispatch: hand `tag` to the handler bound to its name.
    ///
    /// Returns `None` if no handler is bound (the tag is dropped),
    /// otherwise whether the handler scanned the tag's content.
    pub fn dispatch_registered(&mut self, tag: &Tag) -> Result<Option<bool>> {
        let Some(handler) = self.registry.handler_for(tag.name()) else {
            tracing::trace!(tag = tag.name(), offset = tag.start(), "No handler, dropping tag");
            return Ok(None);
        };

        tracing::trace!(tag = tag.name(), offset = tag.start(), depth = self.depth, "Dispatching tag");
        handler.handle(tag, self).map(Some)
    }

    fn clear_pass(&mut self) {
        self.source.clear();
        self.tags.reset("");
        self.initialized = false;
        self.depth = 0;
    }
}

impl<F: ParserFlavor + fmt::Debug> fmt::Debug for Parser<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("flavor", &self.flavor)
            .field("registry", &self.registry)
            .field("has_resolver", &self.resolver.is_some())
            .field("source_len", &self.source.len())
            .field("initialized", &self.initialized)
            .field("depth", &self.depth)
            .finish()
    }
}

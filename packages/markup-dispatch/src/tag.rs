//! Tags as produced by a tag source and consumed by the parser.

use std::ops::Range;

/// Syntactic form of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Opening tag, `<name ...>`.
    Start,
    /// Closing tag, `</name>`.
    End,
    /// Self-closing tag, `<name ... />`.
    Empty,
    /// Comment, declaration or processing instruction (`<!-- -->`, `<!...>`, `<?...?>`).
    Markup,
}

/// A structural unit found in the source.
///
/// All offsets are byte offsets into the source the tag was scanned from:
///
/// ```text
/// a<b x="1">c</b>d
///  ^        ^^   ^
///  start    ||   unit_end
///           |content_end
///           content_start
/// ```
///
/// For tags without a matching closing tag `content_end` is the end of the
/// source and `unit_end` equals `content_start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    kind: TagKind,
    params: String,
    start: usize,
    content_start: usize,
    content_end: usize,
    unit_end: usize,
    has_ending: bool,
}

impl Tag {
    /// Create a tag with no matching closing tag.
    ///
    /// `name` is normalized to upper case. `content_end` is set to
    /// `source_len` and `unit_end` to `content_start`.
    #[must_use]
    pub fn new(
        name: &str,
        kind: TagKind,
        params: impl Into<String>,
        start: usize,
        content_start: usize,
        source_len: usize,
    ) -> Self {
        debug_assert!(start < content_start, "tag must span at least one byte");
        Self {
            name: name.to_ascii_uppercase(),
            kind,
            params: params.into(),
            start,
            content_start,
            content_end: source_len,
            unit_end: content_start,
            has_ending: false,
        }
    }

    /// Record the matching closing tag occupying `close`.
    #[must_use]
    pub fn with_ending(mut self, close: Range<usize>) -> Self {
        self.set_ending(close);
        self
    }

    pub(crate) fn set_ending(&mut self, close: Range<usize>) {
        debug_assert!(close.start >= self.content_start);
        self.content_end = close.start;
        self.unit_end = close.end;
        self.has_ending = true;
    }

    /// Limit every offset to `limit`, the end of the range being scanned.
    #[must_use]
    pub fn clamped(mut self, limit: usize) -> Self {
        self.content_start = self.content_start.min(limit);
        self.content_end = self.content_end.min(limit);
        self.unit_end = self.unit_end.min(limit);
        self
    }

    /// Normalized (upper-case) tag name; end tags carry a leading `/`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// Raw, unparsed parameter text between the name and `>`.
    #[must_use]
    pub fn params(&self) -> &str {
        &self.params
    }

    /// Offset of the opening `<`.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset just after the opening tag.
    #[must_use]
    pub fn content_start(&self) -> usize {
        self.content_start
    }

    /// Offset where the matching closing tag begins (end of source if none).
    #[must_use]
    pub fn content_end(&self) -> usize {
        self.content_end
    }

    /// Offset where scanning resumes after this tag.
    #[must_use]
    pub fn unit_end(&self) -> usize {
        self.unit_end
    }

    /// Whether a matching closing tag was found.
    #[must_use]
    pub fn has_ending(&self) -> bool {
        self.has_ending
    }

    /// Range of the tag's inner content.
    #[must_use]
    pub fn content(&self) -> Range<usize> {
        self.content_start..self.content_end.max(self.content_start)
    }
}

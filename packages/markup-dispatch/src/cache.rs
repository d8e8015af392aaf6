//! Tag sources: the tokenizer contract and the default tag cache.
//!
//! The parser never looks at raw markup itself. It asks a [`TagSource`]
//! for the next tag inside the range it is scanning and treats everything
//! in between as text. [`TagCache`] is the default source: it scans the
//! whole document once on [`TagSource::reset`], pairs end tags with their
//! start tags, and answers queries with a binary search.

use memchr::memchr;

use crate::tag::{Tag, TagKind};

const COMMENT_OPEN: &str = "!--";
const COMMENT_CLOSE: &str = "-->";

/// Producer of tags for a source text.
pub trait TagSource {
    /// Prepare for scanning `source`. Called by `Parser::init`.
    fn reset(&mut self, source: &str);

    /// Return the first tag whose start lies in `[cursor, limit)`.
    fn next_tag(&mut self, cursor: usize, limit: usize) -> Option<Tag>;
}

/// Default tag source backed by a pre-scanned, offset-ordered tag list.
#[derive(Debug, Clone, Default)]
pub struct TagCache {
    tags: Vec<Tag>,
}

impl TagCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache already populated for `source`.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        Self {
            tags: scan_tags(source),
        }
    }

    /// All tags in source order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

impl TagSource for TagCache {
    fn reset(&mut self, source: &str) {
        self.tags = scan_tags(source);
        tracing::debug!(tags = self.tags.len(), "Scanned tag cache");
    }

    fn next_tag(&mut self, cursor: usize, limit: usize) -> Option<Tag> {
        let idx = self.tags.partition_point(|tag| tag.start() < cursor);
        self.tags
            .get(idx)
            .filter(|tag| tag.start() < limit)
            .cloned()
    }
}

/// Markup recognized at a single `<`.
struct RawTag<'s> {
    name: &'s str,
    kind: TagKind,
    params: &'s str,
    end: usize,
}

/// Outcome of looking at one `<`.
enum Read<'s> {
    Tag(RawTag<'s>),
    /// The `<` does not open a tag and is ordinary text.
    Text,
    /// No `>` follows, so neither this nor any later `<` opens a tag.
    Exhausted,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'.' | b'-')
}

/// Single forward pass over a source.
struct Scanner<'s> {
    source: &'s str,
    bytes: &'s [u8],
    /// Cleared once a quote-aware search ran off the end of the source.
    /// Later searches take the first `>`, which keeps the scan linear.
    honor_quotes: bool,
}

impl<'s> Scanner<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            honor_quotes: true,
        }
    }

    /// Offset of the `>` closing a tag whose parameters start at `from`.
    ///
    /// Quoted parameter values may contain `>`. An unterminated quote falls
    /// back to the first `>` after it.
    fn find_close(&mut self, from: usize) -> Option<usize> {
        let next_gt = from + memchr(b'>', &self.bytes[from..])?;
        if !self.honor_quotes {
            return Some(next_gt);
        }

        let mut quote: Option<(u8, usize)> = None;
        for (offset, &b) in self.bytes[from..].iter().enumerate() {
            match quote {
                Some((q, _)) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some((b, from + offset)),
                None if b == b'>' => return Some(from + offset),
                None => {}
            }
        }

        self.honor_quotes = false;
        let after_quote = quote.and_then(|(_, opened)| {
            memchr(b'>', &self.bytes[opened..]).map(|rel| opened + rel)
        });
        Some(after_quote.unwrap_or(next_gt))
    }

    /// Recognize the markup starting at `start` (which must hold `<`).
    fn read_tag(&mut self, start: usize) -> Read<'s> {
        let source = self.source;
        let bytes = self.bytes;
        let len = bytes.len();
        let mut i = start + 1;

        if source[i..].starts_with(COMMENT_OPEN) {
            let body_start = i + COMMENT_OPEN.len();
            let (body_end, end) = match source[body_start..].find(COMMENT_CLOSE) {
                Some(rel) => (body_start + rel, body_start + rel + COMMENT_CLOSE.len()),
                None => (len, len),
            };
            return Read::Tag(RawTag {
                name: COMMENT_OPEN,
                kind: TagKind::Markup,
                params: &source[body_start..body_end],
                end,
            });
        }

        let mut kind = match bytes.get(i) {
            Some(b'/') => {
                i += 1;
                TagKind::End
            }
            Some(b'!' | b'?') => TagKind::Markup,
            _ => TagKind::Start,
        };

        let name_start = i;
        if kind == TagKind::Markup {
            i += 1;
        }
        let ident_start = i;
        while i < len && is_name_byte(bytes[i]) {
            i += 1;
        }
        if i == ident_start {
            return Read::Text;
        }
        let name = &source[name_start..i];

        let params_start = i;
        let Some(close) = self.find_close(params_start) else {
            return Read::Exhausted;
        };

        let mut params = source[params_start..close].trim();
        if kind == TagKind::Start {
            if let Some(stripped) = params.strip_suffix('/') {
                kind = TagKind::Empty;
                params = stripped.trim_end();
            }
        } else if kind == TagKind::Markup {
            params = params.strip_suffix('?').unwrap_or(params).trim_end();
        }

        Read::Tag(RawTag {
            name,
            kind,
            params,
            end: close + 1,
        })
    }
}

/// Scan `source` into an offset-ordered list of tags.
///
/// End tags are matched against the most recent unmatched start tag with
/// the same name. Start tags skipped over by such a match stay open and may
/// still be closed later. End tags remain in the list as inert tags named
/// `/NAME`.
///
/// Runs in time linear in the length of `source`.
#[must_use]
pub fn scan_tags(source: &str) -> Vec<Tag> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut scanner = Scanner::new(source);
    let mut tags: Vec<Tag> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut pos = 0;

    while let Some(rel) = memchr(b'<', &bytes[pos..]) {
        let start = pos + rel;
        let raw = match scanner.read_tag(start) {
            Read::Tag(raw) => raw,
            Read::Text => {
                pos = start + 1;
                continue;
            }
            Read::Exhausted => break,
        };
        pos = raw.end;

        match raw.kind {
            TagKind::Start => {
                open.push(tags.len());
                tags.push(Tag::new(raw.name, raw.kind, raw.params, start, raw.end, len));
            }
            TagKind::End => {
                if let Some(slot) = open
                    .iter()
                    .rposition(|&idx| tags[idx].name().eq_ignore_ascii_case(raw.name))
                {
                    let idx = open.remove(slot);
                    tags[idx].set_ending(start..raw.end);
                }
                let name = format!("/{}", raw.name);
                tags.push(Tag::new(&name, raw.kind, "", start, raw.end, len));
            }
            TagKind::Empty | TagKind::Markup => {
                tags.push(Tag::new(raw.name, raw.kind, raw.params, start, raw.end, len));
            }
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(Tag::name).collect()
    }

    #[test]
    fn test_scan_matched_pair() {
        let source = "a<b>c</b>d";
        let tags = scan_tags(source);
        assert_eq!(names(&tags), ["B", "/B"]);

        let b = &tags[0];
        assert!(b.has_ending());
        assert_eq!(b.start(), 1);
        assert_eq!(&source[b.content()], "c");
        assert_eq!(b.unit_end(), 9);
    }

    #[test]
    fn test_scan_unmatched_start_tag() {
        let source = "x<br>y";
        let tags = scan_tags(source);
        let br = &tags[0];
        assert!(!br.has_ending());
        assert_eq!(br.content_end(), source.len());
        assert_eq!(br.unit_end(), 5);
    }

    #[test]
    fn test_scan_nested_same_name() {
        let source = "<b>1<b>2</b>3</b>";
        let tags = scan_tags(source);
        assert_eq!(&source[tags[0].content()], "1<b>2</b>3");
        assert_eq!(&source[tags[1].content()], "2");
    }

    #[test]
    fn test_scan_misnested_tags() {
        let source = "<b><i>x</b></i>";
        let tags = scan_tags(source);
        assert_eq!(names(&tags), ["B", "I", "/B", "/I"]);
        assert_eq!(&source[tags[0].content()], "<i>x");
        // <i> skipped by </b> stays open and is closed by </i>
        assert_eq!(&source[tags[1].content()], "x</b>");
    }

    #[test]
    fn test_scan_params_and_empty_tag() {
        let source = r#"<img src="a>b.png" alt='x' /><font color=red>t</font>"#;
        let tags = scan_tags(source);
        assert_eq!(tags[0].name(), "IMG");
        assert_eq!(tags[0].kind(), TagKind::Empty);
        assert_eq!(tags[0].params(), r#"src="a>b.png" alt='x'"#);
        assert_eq!(tags[1].name(), "FONT");
        assert_eq!(tags[1].params(), "color=red");
    }

    #[test]
    fn test_scan_comments_and_declarations() {
        let source = "<!DOCTYPE html><!-- <b> -->t<?xml version=\"1.0\"?>";
        let tags = scan_tags(source);
        assert_eq!(names(&tags), ["!DOCTYPE", "!--", "?XML"]);
        assert_eq!(tags[1].params(), " <b> ");
        assert_eq!(tags[1].unit_end(), source.find("-->").unwrap() + 3);
        assert_eq!(tags[2].params(), "version=\"1.0\"");
    }

    #[test]
    fn test_scan_lone_angle_bracket_is_text() {
        assert!(scan_tags("a < b and c <").is_empty());
        assert!(scan_tags("<b unterminated").is_empty());
    }

    #[test]
    fn test_unterminated_quote_falls_back_to_next_close() {
        let source = r#"<a title="oops>text</a> <b>x</b>"#;
        let tags = scan_tags(source);
        assert_eq!(names(&tags), ["A", "/A", "B", "/B"]);
        assert_eq!(tags[0].params(), r#"title="oops"#);
        assert_eq!(&source[tags[0].content()], "text");
        assert_eq!(&source[tags[2].content()], "x");
    }

    #[test]
    fn test_unclosed_tags_scan_in_linear_time() {
        let inputs = [
            "<a".repeat(200_000),
            "<a x=\"".repeat(100_000),
            format!("{}>", "<a '".repeat(100_000)),
        ];

        for source in &inputs {
            let started = std::time::Instant::now();
            let cache = TagCache::from_source(source);
            assert!(cache.tags().len() <= 1);
            assert!(
                started.elapsed() < std::time::Duration::from_secs(2),
                "scanning {} bytes took {:?}",
                source.len(),
                started.elapsed()
            );
        }
    }

    #[test]
    fn test_stray_end_tag() {
        let tags = scan_tags("x</p>y");
        assert_eq!(names(&tags), ["/P"]);
        assert_eq!(tags[0].kind(), TagKind::End);
        assert_eq!(tags[0].unit_end(), 5);
    }

    #[test]
    fn test_next_tag_window() {
        let mut cache = TagCache::new();
        cache.reset("<a>1</a><b>2</b>");

        let first = cache.next_tag(0, 16).unwrap();
        assert_eq!(first.name(), "A");

        let second = cache.next_tag(first.unit_end(), 16).unwrap();
        assert_eq!(second.name(), "B");

        assert!(cache.next_tag(second.unit_end(), 16).is_none());
        assert!(cache.next_tag(1, 8).unwrap().name() == "/A");
        assert!(cache.next_tag(0, 0).is_none());
    }

    #[test]
    fn test_multibyte_text() {
        let source = "héllo <b>wörld</b> ✓";
        let cache = TagCache::from_source(source);
        let b = &cache.tags()[0];
        assert_eq!(&source[b.content()], "wörld");
    }
}

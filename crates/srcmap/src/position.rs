//! Source identities and offset to line/column resolution.
//!
//! A code generator refers to original code through [`SourceRef`]s: an opaque
//! [`SourceId`] plus a half-open character range. Turning an offset into a
//! `(line, column)` pair needs a [`LineIndex`] for that source, which is built
//! once per identity by a [`SourceLookup`] and memoized in a [`PositionCache`].

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Opaque identity of one original source unit (usually a module).
///
/// Cloning is cheap; equality and hashing compare the identity text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Create a new source identity
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identity text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// A half-open `[begin, end)` character range within one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRef {
    /// Source unit the range belongs to
    pub source: SourceId,
    /// First character offset (inclusive)
    pub begin: usize,
    /// Last character offset (exclusive)
    pub end: usize,
}

impl SourceRef {
    /// Create a new source reference
    pub fn new(source: impl Into<SourceId>, begin: usize, end: usize) -> Self {
        Self {
            source: source.into(),
            begin,
            end,
        }
    }

    /// Length of the range in characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Whether the range covers no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{})", self.source, self.begin, self.end)
    }
}

/// Which boundary of a [`SourceRef`] an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Output for the range is about to be written
    Start,
    /// Output for the range is complete
    End,
}

/// Zero-based line and column within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineColumn {
    /// Zero-based line
    pub line: u32,
    /// Zero-based column, in characters
    pub column: u32,
}

/// Character offset to line/column index for one source text.
///
/// Lines break after every `\n`. Offsets count `char`s, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Character offset at which each line starts. Always starts with 0.
    line_starts: Vec<usize>,
    /// Total length of the text in characters
    len: usize,
}

impl LineIndex {
    /// Build the index for a source text
    pub fn from_source(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for ch in text.chars() {
            len += 1;
            if ch == '\n' {
                line_starts.push(len);
            }
        }
        Self { line_starts, len }
    }

    /// Number of lines, counting a trailing empty line after a final `\n`
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the indexed text in characters
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the indexed text is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolve a character offset. Offsets past the end land on the last line.
    pub fn line_column(&self, offset: usize) -> LineColumn {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line];
        LineColumn {
            line: saturate(line),
            column: saturate(column),
        }
    }
}

fn saturate(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// What a [`SourceLookup`] knows about one source identity.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// Path written to the map's `sources` list
    pub path: String,
    /// Line index for the source text
    pub positions: LineIndex,
}

impl ResolvedSource {
    /// Create a resolved source from its path and full text
    pub fn from_text(path: impl Into<String>, text: &str) -> Self {
        Self {
            path: path.into(),
            positions: LineIndex::from_source(text),
        }
    }
}

/// Collaborator that turns a source identity into a path and line index.
///
/// Returning `None` means the identity has no file on record; output
/// attributed to it is treated as unmapped.
pub trait SourceLookup {
    /// Resolve one source identity
    fn lookup(&self, source: &SourceId) -> Option<ResolvedSource>;
}

impl<F> SourceLookup for F
where
    F: Fn(&SourceId) -> Option<ResolvedSource>,
{
    fn lookup(&self, source: &SourceId) -> Option<ResolvedSource> {
        self(source)
    }
}

/// Memoized [`SourceLookup`] results keyed by source identity.
///
/// The cache may be shared between builders (and threads) through an `Arc`;
/// the lookup runs at most once per identity, under the map's shard lock.
#[derive(Debug, Default)]
pub struct PositionCache {
    entries: DashMap<SourceId, Option<Arc<ResolvedSource>>>,
}

impl PositionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `source`, consulting `lookup` only on first use
    pub fn resolve(
        &self,
        source: &SourceId,
        lookup: &impl SourceLookup,
    ) -> Option<Arc<ResolvedSource>> {
        if let Some(hit) = self.entries.get(source) {
            return hit.value().clone();
        }
        self.entries
            .entry(source.clone())
            .or_insert_with(|| {
                let resolved = lookup.lookup(source).map(Arc::new);
                trace!(
                    source = %source,
                    lines = resolved.as_ref().map(|r| r.positions.line_count()),
                    "built line index"
                );
                resolved
            })
            .value()
            .clone()
    }

    /// Number of identities looked up so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been looked up yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

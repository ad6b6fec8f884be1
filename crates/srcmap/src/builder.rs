//! Incremental source map builder.
//!
//! A code generator drives one [`SourceMapBuilder`] per output file, telling
//! it which source range the next characters come from and how many
//! characters it wrote. The builder keeps the generated cursor, a stack of
//! open attributions, and the segments of the line being written; finished
//! lines are frozen into [`LineGroup`]s.
//!
//! ```
//! use srcmap::{ResolvedSource, SourceId, SourceMapBuilder, SourceRef};
//!
//! let text = "let answer = 42;\n";
//! let mut builder = SourceMapBuilder::new("main.js", |id: &SourceId| {
//!     (id.as_str() == "main").then(|| ResolvedSource::from_text("src/main.tm", text))
//! });
//!
//! let stmt = SourceRef::new("main", 0, 16);
//! let ident = SourceRef::new("main", 4, 10);
//! builder.begin_attribution(&stmt)?;
//! builder.wrote_chars("const ".len())?;
//! builder.begin_attribution(&ident)?;
//! builder.wrote_name("answer".len(), "answer")?;
//! builder.end_attribution(&ident)?;
//! builder.wrote_chars(" = 42;".len())?;
//! builder.end_attribution(&stmt)?;
//! builder.line_ended()?;
//!
//! let map = builder.finalize(|_| Some(text.to_string()))?;
//! assert_eq!(map.mappings(), "AAAA,MAAIA,MAAJ");
//! # Ok::<(), srcmap::SourceMapError>(())
//! ```

use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::SourceMapConfig;
use crate::error::{SourceMapError, SourceMapResult};
use crate::intern::InternTable;
use crate::model::{Attribution, LineGroup, Segment, SourceMap};
use crate::position::{Edge, PositionCache, SourceId, SourceLookup, SourceRef};

/// Position in the generated output where the next character will land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneratedCursor {
    /// Zero-based generated line
    pub line: u32,
    /// Zero-based generated column
    pub column: u32,
}

/// An open attribution and the range that opened it.
#[derive(Debug, Clone)]
struct Frame {
    source_ref: SourceRef,
    attribution: Attribution,
}

/// Builds a [`SourceMap`] from a code generator's event stream.
///
/// Events must arrive in generation order. After [`finalize`](Self::finalize)
/// every further event fails with [`SourceMapError::AlreadyFinalized`].
pub struct SourceMapBuilder<L> {
    file: String,
    config: SourceMapConfig,
    lookup: L,
    cache: Arc<PositionCache>,
    sources: InternTable,
    /// First identity seen for each entry of `sources`
    source_ids: Vec<SourceId>,
    names: InternTable,
    stack: Vec<Frame>,
    lines: Vec<LineGroup>,
    current: Vec<Segment>,
    cursor: GeneratedCursor,
    finalized: bool,
}

impl<L: SourceLookup> SourceMapBuilder<L> {
    /// Create a builder for the generated file `file`
    pub fn new(file: impl Into<String>, lookup: L) -> Self {
        Self {
            file: file.into(),
            config: SourceMapConfig::default(),
            lookup,
            cache: Arc::new(PositionCache::new()),
            sources: InternTable::new(),
            source_ids: Vec::new(),
            names: InternTable::new(),
            stack: Vec::new(),
            lines: Vec::new(),
            current: Vec::new(),
            cursor: GeneratedCursor::default(),
            finalized: false,
        }
    }

    /// Use the given settings
    pub fn with_config(mut self, config: SourceMapConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a position cache with other builders
    pub fn with_cache(mut self, cache: Arc<PositionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Generated file path
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Active settings
    pub fn config(&self) -> &SourceMapConfig {
        &self.config
    }

    /// Where the next written character will land
    pub fn cursor(&self) -> GeneratedCursor {
        self.cursor
    }

    /// Number of open attributions
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether [`finalize`](Self::finalize) has been called
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Attribution applied to the next written characters
    pub fn current_attribution(&self) -> Attribution {
        self.stack
            .last()
            .map(|frame| frame.attribution)
            .unwrap_or_default()
    }

    /// Dispatch an edge event to [`begin_attribution`](Self::begin_attribution)
    /// or [`end_attribution`](Self::end_attribution).
    pub fn mark(&mut self, source_ref: &SourceRef, edge: Edge) -> SourceMapResult<()> {
        match edge {
            Edge::Start => self.begin_attribution(source_ref),
            Edge::End => self.end_attribution(source_ref),
        }
    }

    /// Attribute following output to the start of `source_ref`.
    ///
    /// Sources the lookup does not know resolve to an unmapped attribution.
    pub fn begin_attribution(&mut self, source_ref: &SourceRef) -> SourceMapResult<()> {
        self.ensure_open()?;

        let attribution = match self.cache.resolve(&source_ref.source, &self.lookup) {
            Some(resolved) => {
                let pos = resolved.positions.line_column(source_ref.begin);
                let source = self.intern_source(&resolved.path, &source_ref.source);
                Attribution::mapped(source, pos.line, pos.column)
            }
            None => Attribution::Unmapped,
        };

        self.stack.push(Frame {
            source_ref: source_ref.clone(),
            attribution,
        });
        Ok(())
    }

    /// Close the innermost attribution, which must have been opened by `source_ref`.
    pub fn end_attribution(&mut self, source_ref: &SourceRef) -> SourceMapResult<()> {
        self.ensure_open()?;

        let Some(top) = self.stack.last() else {
            return Err(SourceMapError::unbalanced(format!(
                "end of {source_ref} with no open attribution"
            )));
        };
        if top.source_ref != *source_ref {
            return Err(SourceMapError::unbalanced(format!(
                "end of {source_ref} while {} is innermost",
                top.source_ref
            )));
        }
        self.stack.pop();
        Ok(())
    }

    /// Record that `length` characters were written with the current attribution
    pub fn wrote_chars(&mut self, length: usize) -> SourceMapResult<()> {
        self.record(length, None)
    }

    /// Record that `length` characters were written for the source identifier `name`
    pub fn wrote_name(&mut self, length: usize, name: &str) -> SourceMapResult<()> {
        self.record(length, Some(name))
    }

    /// Freeze the current line and move the cursor to the start of the next one
    pub fn line_ended(&mut self) -> SourceMapResult<()> {
        self.ensure_open()?;
        self.flush_line();
        self.cursor.line += 1;
        self.cursor.column = 0;
        Ok(())
    }

    /// Produce the finished map.
    ///
    /// An unterminated last line is flushed; an empty one is dropped.
    /// `content_for` is asked for the text of each source (once per entry of
    /// `sources`) unless embedding is disabled in the config.
    ///
    /// # Errors
    ///
    /// - [`SourceMapError::AlreadyFinalized`] on a second call
    /// - [`SourceMapError::UnbalancedAttribution`] if attributions are still open
    pub fn finalize<F>(&mut self, mut content_for: F) -> SourceMapResult<SourceMap>
    where
        F: FnMut(&SourceId) -> Option<String>,
    {
        self.ensure_open()?;
        self.finalized = true;

        if let Some(top) = self.stack.last() {
            return Err(SourceMapError::unbalanced(format!(
                "{} attribution(s) still open at finalize, innermost {}",
                self.stack.len(),
                top.source_ref
            )));
        }
        if !self.current.is_empty() {
            self.flush_line();
        }

        let sources_content = if self.config.include_sources_content {
            Some(
                self.source_ids
                    .iter()
                    .map(&mut content_for)
                    .collect::<Vec<_>>(),
            )
        } else {
            None
        };

        let map = SourceMap::from_parts(
            std::mem::take(&mut self.file),
            std::mem::take(&mut self.sources).into_vec(),
            std::mem::take(&mut self.names).into_vec(),
            std::mem::take(&mut self.lines),
        );
        let mut map = match sources_content {
            Some(content) => map.with_sources_content(content)?,
            None => map,
        };
        map = map.with_source_root(self.config.source_root.clone());
        if self.config.infer_source_root {
            map = map.with_inferred_source_root();
        }

        debug!(
            file = map.file(),
            lines = map.lines().len(),
            sources = map.sources().len(),
            names = map.names().len(),
            segments = map.segment_count(),
            "finalized source map"
        );
        Ok(map)
    }

    /// Like [`finalize`](Self::finalize), but a failure is logged and yields `None`.
    ///
    /// Map generation is a side channel: a broken map is dropped rather than
    /// written, and the generated output itself is left alone.
    pub fn finalize_or_skip<F>(&mut self, content_for: F) -> Option<SourceMap>
    where
        F: FnMut(&SourceId) -> Option<String>,
    {
        let file = self.file.clone();
        match self.finalize(content_for) {
            Ok(map) => Some(map),
            Err(error) => {
                warn!(file = %file, error = %error, "dropping source map");
                None
            }
        }
    }

    fn ensure_open(&self) -> SourceMapResult<()> {
        if self.finalized {
            return Err(SourceMapError::AlreadyFinalized);
        }
        Ok(())
    }

    fn intern_source(&mut self, path: &str, id: &SourceId) -> u32 {
        let idx = self.sources.intern(path);
        if idx as usize == self.source_ids.len() {
            self.source_ids.push(id.clone());
        }
        idx
    }

    fn record(&mut self, length: usize, name: Option<&str>) -> SourceMapResult<()> {
        self.ensure_open()?;

        let column = self.cursor.column;
        let end = u32::try_from(length)
            .ok()
            .and_then(|length| column.checked_add(length))
            .ok_or(SourceMapError::InvalidLength { length, column })?;
        if length == 0 {
            return Ok(());
        }
        self.cursor.column = end;

        let mut attribution = self.current_attribution();
        if let Some(name) = name {
            // Interned either way; an unmapped segment has no field to carry it.
            attribution = attribution.with_name(self.names.intern(name));
        }

        if self.config.merge_segments
            && self
                .current
                .last()
                .is_some_and(|last| last.attribution == attribution)
        {
            return Ok(());
        }
        self.current.push(Segment::new(column, attribution));
        Ok(())
    }

    fn flush_line(&mut self) {
        let segments = std::mem::take(&mut self.current);
        trace!(
            line = self.cursor.line,
            segments = segments.len(),
            "line ended"
        );
        self.lines.push(LineGroup::new(segments));
    }
}

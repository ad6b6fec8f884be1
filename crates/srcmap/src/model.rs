//! Immutable source map model
//!
//! A [`SourceMap`] is produced once by [`crate::SourceMapBuilder::finalize`]
//! (or assembled by hand through [`SourceMap::new`]) and never changes
//! afterwards. Source and name references inside segments are indices into
//! the map's `sources` and `names` lists.

use std::path::{Path, PathBuf};

use crate::error::{SourceMapError, SourceMapResult};

/// Source Map format revision written to the `version` field
pub const SOURCE_MAP_VERSION: u32 = 3;

/// Where a span of generated output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Attribution {
    /// Output with no original source, e.g. generated boilerplate
    #[default]
    Unmapped,
    /// Output produced from a known source position
    Mapped {
        /// Index into [`SourceMap::sources`]
        source: u32,
        /// Zero-based line in the original source
        line: u32,
        /// Zero-based column in the original source
        column: u32,
        /// Index into [`SourceMap::names`] for renamed or removed identifiers
        name: Option<u32>,
    },
}

impl Attribution {
    /// Create a mapped attribution without a name
    pub fn mapped(source: u32, line: u32, column: u32) -> Self {
        Self::Mapped {
            source,
            line,
            column,
            name: None,
        }
    }

    /// Attach a name index. Unmapped attributions cannot carry names and are returned unchanged.
    pub fn with_name(self, name: u32) -> Self {
        match self {
            Self::Mapped {
                source,
                line,
                column,
                ..
            } => Self::Mapped {
                source,
                line,
                column,
                name: Some(name),
            },
            Self::Unmapped => Self::Unmapped,
        }
    }

    /// Check if this is unmapped
    #[inline]
    pub fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped)
    }
}

/// One mapping entry: the generated column where an attribution starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Zero-based generated column where the span begins
    pub generated_column: u32,
    /// Attribution for the span
    pub attribution: Attribution,
}

impl Segment {
    /// Create a segment
    pub fn new(generated_column: u32, attribution: Attribution) -> Self {
        Self {
            generated_column,
            attribution,
        }
    }

    /// Create an unmapped segment
    pub fn unmapped(generated_column: u32) -> Self {
        Self::new(generated_column, Attribution::Unmapped)
    }

    /// Create a mapped segment without a name
    pub fn mapped(generated_column: u32, source: u32, line: u32, column: u32) -> Self {
        Self::new(generated_column, Attribution::mapped(source, line, column))
    }

    /// Attach a name index
    pub fn with_name(mut self, name: u32) -> Self {
        self.attribution = self.attribution.with_name(name);
        self
    }
}

/// Segments for one generated line, in ascending column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineGroup {
    segments: Vec<Segment>,
}

impl LineGroup {
    /// Create a line group from its segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Segments in column order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the line has no mappings
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<Vec<Segment>> for LineGroup {
    fn from(segments: Vec<Segment>) -> Self {
        Self::new(segments)
    }
}

/// A complete mapping from one generated file back to its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    file: String,
    source_root: Option<String>,
    sources: Vec<String>,
    sources_content: Option<Vec<Option<String>>>,
    names: Vec<String>,
    lines: Vec<LineGroup>,
}

impl SourceMap {
    /// MIME type of the serialized document
    pub const MIME_TYPE: &'static str = "application/json";

    /// File extension appended to a generated file's name for its map
    pub const EXTENSION: &'static str = ".map";

    /// Assemble a map from parts, checking every table reference.
    ///
    /// # Errors
    ///
    /// [`SourceMapError::InvalidMapping`] if a segment references a source or
    /// name index outside the tables, or if columns within a line are not
    /// strictly increasing.
    pub fn new(
        file: impl Into<String>,
        sources: Vec<String>,
        names: Vec<String>,
        lines: Vec<LineGroup>,
    ) -> SourceMapResult<Self> {
        for (line_no, group) in lines.iter().enumerate() {
            let mut prev_column: Option<u32> = None;
            for segment in group.segments() {
                if prev_column.is_some_and(|prev| segment.generated_column <= prev) {
                    return Err(SourceMapError::invalid_mapping(format!(
                        "line {line_no}: column {} does not follow column {}",
                        segment.generated_column,
                        prev_column.unwrap_or_default(),
                    )));
                }
                prev_column = Some(segment.generated_column);

                if let Attribution::Mapped { source, name, .. } = segment.attribution {
                    if source as usize >= sources.len() {
                        return Err(SourceMapError::invalid_mapping(format!(
                            "line {line_no}: source index {source} out of range ({} sources)",
                            sources.len(),
                        )));
                    }
                    if let Some(name) = name.filter(|&n| n as usize >= names.len()) {
                        return Err(SourceMapError::invalid_mapping(format!(
                            "line {line_no}: name index {name} out of range ({} names)",
                            names.len(),
                        )));
                    }
                }
            }
        }
        Ok(Self::from_parts(file.into(), sources, names, lines))
    }

    /// Assemble a map whose invariants the caller already upholds
    pub(crate) fn from_parts(
        file: String,
        sources: Vec<String>,
        names: Vec<String>,
        lines: Vec<LineGroup>,
    ) -> Self {
        Self {
            file,
            source_root: None,
            sources,
            sources_content: None,
            names,
            lines,
        }
    }

    /// Set the `sourceRoot` prefix
    pub fn with_source_root(mut self, source_root: Option<String>) -> Self {
        self.source_root = source_root;
        self
    }

    /// Attach source texts, aligned with [`SourceMap::sources`].
    ///
    /// If no entry has text, the `sourcesContent` field is left out entirely.
    ///
    /// # Errors
    ///
    /// [`SourceMapError::InvalidMapping`] if `content` is not the same length as `sources`.
    pub fn with_sources_content(mut self, content: Vec<Option<String>>) -> SourceMapResult<Self> {
        if content.len() != self.sources.len() {
            return Err(SourceMapError::invalid_mapping(format!(
                "{} content entries for {} sources",
                content.len(),
                self.sources.len(),
            )));
        }
        self.sources_content = content.iter().any(Option::is_some).then_some(content);
        Ok(self)
    }

    /// Move the longest shared directory prefix of `sources` into `sourceRoot`.
    ///
    /// Does nothing for fewer than two sources, when there is no shared
    /// directory, or when a `sourceRoot` is already set.
    pub fn with_inferred_source_root(mut self) -> Self {
        if self.source_root.is_some() {
            return self;
        }
        if let Some((root, trimmed)) = split_common_root(&self.sources) {
            self.source_root = Some(root);
            self.sources = trimmed;
        }
        self
    }

    /// Path of the generated file this map describes
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Prefix prepended to every entry of [`SourceMap::sources`]
    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    /// Source paths in first-reference order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Source texts aligned with [`SourceMap::sources`], if any were supplied
    pub fn sources_content(&self) -> Option<&[Option<String>]> {
        self.sources_content.as_deref()
    }

    /// Names in first-reference order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// One group per generated line
    pub fn lines(&self) -> &[LineGroup] {
        &self.lines
    }

    /// Total number of segments across all lines
    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(LineGroup::len).sum()
    }
}

/// Path of the map file written next to `output`: `out/app.js` becomes `out/app.js.map`.
pub fn map_path_for(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(SourceMap::EXTENSION);
    PathBuf::from(name)
}

/// Split the shared leading directories off a list of `/`-separated paths.
///
/// The prefix is always a strict directory prefix: if it would swallow a
/// whole path, the last segment is given back.
fn split_common_root(sources: &[String]) -> Option<(String, Vec<String>)> {
    if sources.len() < 2 {
        return None;
    }
    let split: Vec<Vec<&str>> = sources.iter().map(|s| s.split('/').collect()).collect();

    let mut shared = split[0].len();
    for segments in &split[1..] {
        shared = shared.min(
            split[0]
                .iter()
                .zip(segments)
                .take_while(|(a, b)| a == b)
                .count(),
        );
    }
    if split.iter().any(|segments| segments.len() == shared) {
        shared = shared.saturating_sub(1);
    }
    if shared == 0 {
        return None;
    }

    let root = format!("{}/", split[0][..shared].join("/"));
    let trimmed = split
        .iter()
        .map(|segments| segments[shared..].join("/"))
        .collect();
    Some((root, trimmed))
}

//! Source map generation settings.
//!
//! A host toolchain usually embeds these in its own configuration file, so
//! every field has a serde default and a missing table means "defaults".

use serde::Deserialize;

/// Controls what [`crate::SourceMapBuilder`] records and emits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceMapConfig {
    /// Explicit `sourceRoot` written to the map.
    /// Default: None
    pub source_root: Option<String>,

    /// Move the longest shared directory of all sources into `sourceRoot`.
    /// Ignored when `source_root` is set.
    /// Default: false
    pub infer_source_root: bool,

    /// Embed original source texts as `sourcesContent`.
    /// Default: true
    pub include_sources_content: bool,

    /// Fold consecutive writes with identical attribution into one segment.
    /// Default: true
    pub merge_segments: bool,
}

impl Default for SourceMapConfig {
    fn default() -> Self {
        Self {
            source_root: None,
            infer_source_root: false,
            include_sources_content: true,
            merge_segments: true,
        }
    }
}

impl SourceMapConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the smallest useful config: no embedded sources, merged segments.
    pub fn compact() -> Self {
        Self {
            include_sources_content: false,
            ..Default::default()
        }
    }

    /// Set an explicit source root.
    pub fn source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    /// Enable or disable source root inference.
    pub fn infer_source_root(mut self, enabled: bool) -> Self {
        self.infer_source_root = enabled;
        self
    }

    /// Enable or disable embedding of source texts.
    pub fn include_sources_content(mut self, enabled: bool) -> Self {
        self.include_sources_content = enabled;
        self
    }

    /// Enable or disable segment merging.
    pub fn merge_segments(mut self, enabled: bool) -> Self {
        self.merge_segments = enabled;
        self
    }

    /// Merge another config into this one (other takes precedence for set values).
    pub fn merge(mut self, other: Self) -> Self {
        if other.source_root.is_some() {
            self.source_root = other.source_root;
        }
        self.infer_source_root = other.infer_source_root;
        self.include_sources_content = other.include_sources_content;
        self.merge_segments = other.merge_segments;
        self
    }
}

//! Output writer that feeds a [`SourceMapBuilder`] as text is written.
//!
//! Code generators write text through [`MappedWriter`] (it implements
//! [`std::fmt::Write`]), which counts characters and turns every `\n` into a
//! line-ended event. Map errors never stop the output: the first one is kept,
//! further map events are skipped, and it is reported by
//! [`MappedWriter::finish`].

use std::fmt;

use crate::builder::SourceMapBuilder;
use crate::error::{SourceMapError, SourceMapResult};
use crate::model::SourceMap;
use crate::position::{Edge, SourceId, SourceLookup, SourceRef};

/// Generated text plus the source map being built for it.
pub struct MappedWriter<L> {
    output: String,
    builder: SourceMapBuilder<L>,
    error: Option<SourceMapError>,
}

impl<L: SourceLookup> MappedWriter<L> {
    /// Wrap a builder; output starts empty
    pub fn new(builder: SourceMapBuilder<L>) -> Self {
        Self {
            output: String::new(),
            builder,
            error: None,
        }
    }

    /// Text written so far
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The underlying builder
    pub fn builder(&self) -> &SourceMapBuilder<L> {
        &self.builder
    }

    /// First map error, if any
    pub fn error(&self) -> Option<&SourceMapError> {
        self.error.as_ref()
    }

    /// Attribute following text to `source_ref`
    pub fn begin(&mut self, source_ref: &SourceRef) {
        self.map_event(|b| b.begin_attribution(source_ref));
    }

    /// Close the attribution opened by `source_ref`
    pub fn end(&mut self, source_ref: &SourceRef) {
        self.map_event(|b| b.end_attribution(source_ref));
    }

    /// Forward an edge event
    pub fn mark(&mut self, source_ref: &SourceRef, edge: Edge) {
        self.map_event(|b| b.mark(source_ref, edge));
    }

    /// Write text and, for text without newlines, record it as the identifier `name`.
    pub fn write_name(&mut self, text: &str, name: &str) {
        if text.contains('\n') {
            self.push_text(text);
            return;
        }
        self.output.push_str(text);
        let length = text.chars().count();
        self.map_event(|b| b.wrote_name(length, name));
    }

    /// Write text, splitting it into per-line events
    pub fn push_text(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.push_line_piece(first);
        }
        for piece in lines {
            self.output.push('\n');
            self.map_event(|b| b.line_ended());
            self.push_line_piece(piece);
        }
    }

    /// Finish the map, returning the output alongside the map result.
    pub fn finish<F>(mut self, content_for: F) -> (String, SourceMapResult<SourceMap>)
    where
        F: FnMut(&SourceId) -> Option<String>,
    {
        let map = match self.error.take() {
            Some(error) => Err(error),
            None => self.builder.finalize(content_for),
        };
        (self.output, map)
    }

    /// Finish the map, logging and dropping it on failure.
    pub fn finish_or_skip<F>(mut self, content_for: F) -> (String, Option<SourceMap>)
    where
        F: FnMut(&SourceId) -> Option<String>,
    {
        let map = match self.error.take() {
            Some(error) => {
                tracing::warn!(file = self.builder.file(), error = %error, "dropping source map");
                None
            }
            None => self.builder.finalize_or_skip(content_for),
        };
        (self.output, map)
    }

    fn push_line_piece(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        self.output.push_str(piece);
        let length = piece.chars().count();
        self.map_event(|b| b.wrote_chars(length));
    }

    fn map_event(&mut self, event: impl FnOnce(&mut SourceMapBuilder<L>) -> SourceMapResult<()>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = event(&mut self.builder) {
            self.error = Some(error);
        }
    }
}

impl<L: SourceLookup> fmt::Write for MappedWriter<L> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_text(s);
        Ok(())
    }
}

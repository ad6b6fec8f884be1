//! # srcmap
//!
//! Source map generation for code generators that translate one source
//! language into several target languages.
//!
//! A backend drives a [`SourceMapBuilder`] while it writes an output file:
//! it opens and closes attributions for source ranges, reports how many
//! characters it wrote, and ends lines. Finalizing the builder yields an
//! immutable [`SourceMap`], which serializes to a Source Map v3 document.
//!
//! ## Pipeline
//!
//! ```text
//! generator events ──► SourceMapBuilder ──► SourceMap ──► JSON document
//!                       │         │                        (encode + vlq)
//!                PositionCache  InternTable
//! ```
//!
//! - [`vlq`]: Base64 VLQ codec
//! - [`position`]: source identities, line indexes, and the lookup cache
//! - [`intern`]: first-use ordered `sources`/`names` tables
//! - [`builder`]: the incremental builder
//! - [`model`]: the finished, immutable map
//! - [`encode`] / [`decode`]: `mappings` serialization and its verification inverse
//! - [`writer`]: a `fmt::Write` adapter that emits builder events for text

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod intern;
pub mod model;
pub mod position;
pub mod vlq;
pub mod writer;

pub use builder::{GeneratedCursor, SourceMapBuilder};
pub use config::SourceMapConfig;
pub use decode::{RawSourceMap, decode_mappings};
pub use encode::encode_mappings;
pub use error::{SourceMapError, SourceMapResult};
pub use intern::InternTable;
pub use model::{Attribution, LineGroup, SOURCE_MAP_VERSION, Segment, SourceMap, map_path_for};
pub use position::{
    Edge, LineColumn, LineIndex, PositionCache, ResolvedSource, SourceId, SourceLookup, SourceRef,
};
pub use writer::MappedWriter;

//! Inspect command - decode a source map and list its segments.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Value, json};
use srcmap::{Attribution, LineGroup, RawSourceMap};
use std::fmt::{self, Write as _};
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectCommand {
    /// Source map file (`*.map`)
    pub file: PathBuf,

    /// Print decoded segments as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub fn run(&self) -> Result<()> {
        let text = std::fs::read_to_string(&self.file)
            .with_context(|| format!("reading {}", self.file.display()))?;
        let raw = RawSourceMap::from_json(&text)
            .with_context(|| format!("parsing {}", self.file.display()))?;
        let lines = raw.decode()?;
        tracing::debug!(
            file = %raw.file,
            lines = lines.len(),
            sources = raw.sources.len(),
            names = raw.names.len(),
            "decoded source map"
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&to_json(&raw, &lines))?);
        } else {
            print!("{}", render(&raw, &lines)?);
        }
        Ok(())
    }
}

fn source_path(raw: &RawSourceMap, index: u32) -> String {
    let source = raw
        .sources
        .get(index as usize)
        .map_or("<unknown source>", String::as_str);
    match &raw.source_root {
        Some(root) => format!("{root}{source}"),
        None => source.to_string(),
    }
}

fn name(raw: &RawSourceMap, index: u32) -> &str {
    raw.names
        .get(index as usize)
        .map_or("<unknown name>", String::as_str)
}

fn render(raw: &RawSourceMap, lines: &[LineGroup]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{} (version {}, {} sources, {} names)",
        raw.file,
        raw.version,
        raw.sources.len(),
        raw.names.len()
    )?;
    for (line_number, line) in lines.iter().enumerate() {
        writeln!(out, "line {line_number}:")?;
        for segment in line.segments() {
            match segment.attribution {
                Attribution::Unmapped => {
                    writeln!(out, "  {:>5}  unmapped", segment.generated_column)?;
                }
                Attribution::Mapped {
                    source,
                    line,
                    column,
                    name: name_index,
                } => {
                    write!(
                        out,
                        "  {:>5}  {}:{line}:{column}",
                        segment.generated_column,
                        source_path(raw, source)
                    )?;
                    if let Some(index) = name_index {
                        write!(out, " ({})", name(raw, index))?;
                    }
                    out.push('\n');
                }
            }
        }
    }
    Ok(out)
}

fn to_json(raw: &RawSourceMap, lines: &[LineGroup]) -> Value {
    let lines: Vec<Value> = lines
        .iter()
        .map(|line| {
            line.segments()
                .iter()
                .map(|segment| match segment.attribution {
                    Attribution::Unmapped => json!({ "column": segment.generated_column }),
                    Attribution::Mapped {
                        source,
                        line,
                        column,
                        name: name_index,
                    } => json!({
                        "column": segment.generated_column,
                        "source": source_path(raw, source),
                        "line": line,
                        "sourceColumn": column,
                        "name": name_index.map(|index| name(raw, index)),
                    }),
                })
                .collect()
        })
        .collect();
    json!({ "file": raw.file, "lines": lines })
}

//! Output for the chain graph
//!
//! Supports multiple output formats:
//! - `png` / `svg` - images drawn by Graphviz `dot`
//! - `dot` - Graphviz source, no external tool needed
//! - `json` - Machine-readable JSON

pub mod dot;
pub mod graphviz;
pub mod json;

pub use graphviz::GraphvizRenderer;

use crate::error::ChainResult;
use crate::graph::Graph;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Dot,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "dot" | "gv" => Ok(OutputFormat::Dot),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: png, svg, dot, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", file_extension(*self))
    }
}

impl OutputFormat {
    /// Whether this format needs the Graphviz binary
    pub fn needs_graphviz(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Svg)
    }

    /// Guess the format from an output file's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

/// Get the recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Png => "png",
        OutputFormat::Svg => "svg",
        OutputFormat::Dot => "dot",
        OutputFormat::Json => "json",
    }
}

/// `commit-graph.<ext>` in the current directory
pub fn default_output_path(format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("commit-graph.{}", file_extension(format)))
}

/// Render the graph in text form (DOT or JSON)
pub fn render_text(graph: &Graph, format: OutputFormat) -> ChainResult<Option<String>> {
    match format {
        OutputFormat::Dot => Ok(Some(dot::render(graph))),
        OutputFormat::Json => Ok(Some(json::render(graph)?)),
        OutputFormat::Png | OutputFormat::Svg => Ok(None),
    }
}

/// Write the graph to `output` in `format`
pub fn write_graph(
    graph: &Graph,
    format: OutputFormat,
    output: &Path,
    renderer: &GraphvizRenderer,
) -> ChainResult<()> {
    match render_text(graph, format)? {
        Some(text) => std::fs::write(output, text)?,
        None => renderer.render(graph, file_extension(format), output)?,
    }
    Ok(())
}

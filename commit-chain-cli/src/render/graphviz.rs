//! Image output through the Graphviz `dot` binary

use super::dot;
use crate::error::ChainResult;
use crate::git::ExternalTool;
use crate::graph::Graph;
use std::path::Path;
use tracing::info;

/// Pipes DOT source into `dot -T<format> -o <output>`
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    dot: ExternalTool,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new(ExternalTool::new("dot"))
    }
}

impl GraphvizRenderer {
    pub fn new(dot: ExternalTool) -> Self {
        Self { dot }
    }

    pub fn is_available(&self) -> bool {
        // `dot -V` prints its version; `--version` is not supported by every release
        self.dot.run(&["-V"], None).map(|o| o.success()).unwrap_or(false)
    }

    /// Render `graph` into `output` using a Graphviz output format (`png`, `svg`, ...)
    pub fn render(&self, graph: &Graph, format: &str, output: &Path) -> ChainResult<()> {
        let source = dot::render(graph);
        let format_arg = format!("-T{}", format);
        let output_arg = output.to_string_lossy();

        self.dot.run_with_stdin(
            &[format_arg.as_str(), "-o", output_arg.as_ref()],
            None,
            source.as_bytes(),
        )?;

        info!("Rendered {} nodes to {}", graph.node_count(), output.display());
        Ok(())
    }
}

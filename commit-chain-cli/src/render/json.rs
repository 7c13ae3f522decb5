//! JSON serializer
//!
//! Outputs the chain graph as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::error::ChainResult;
use crate::graph::Graph;
use crate::models::{GraphEdge, GraphNode, RankDir};
use serde::Serialize;

#[derive(Serialize)]
struct GraphDocument<'a> {
    rankdir: RankDir,
    nodes: Vec<&'a GraphNode>,
    edges: Vec<GraphEdge>,
}

impl<'a> From<&'a Graph> for GraphDocument<'a> {
    fn from(graph: &'a Graph) -> Self {
        Self {
            rankdir: graph.rankdir(),
            nodes: graph.nodes().collect(),
            edges: graph.edges(),
        }
    }
}

/// Render graph as JSON
pub fn render(graph: &Graph) -> ChainResult<String> {
    Ok(serde_json::to_string_pretty(&GraphDocument::from(graph))?)
}

//! Commit chain graph
//!
//! An in-memory petgraph `DiGraph` with a lookup from commit hash to node
//! index. A [`Graph`] can only be assembled by [`GraphBuilder`]; once built it
//! is read-only and handed to a renderer.

pub mod builder;

pub use builder::{build_graph, GraphBuilder};

use crate::models::{GraphEdge, GraphNode, RankDir};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// Nodes and edges of a commit chain, plus its layout direction
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<GraphNode, ()>,
    /// Node lookup by commit hash
    node_index: HashMap<String, NodeIndex>,
    rankdir: RankDir,
}

impl Graph {
    pub(crate) fn with_rankdir(rankdir: RankDir) -> Self {
        Self {
            rankdir,
            ..Default::default()
        }
    }

    /// Insert a node; the caller guarantees the id is new.
    pub(crate) fn push_node(&mut self, node: GraphNode) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        idx
    }

    pub(crate) fn push_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
    }

    pub fn rankdir(&self) -> RankDir {
        self.rankdir
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in insertion (log) order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Edges in insertion order, as (from hash, to hash) pairs
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| {
                GraphEdge::new(
                    self.graph[e.source()].id.clone(),
                    self.graph[e.target()].id.clone(),
                )
            })
            .collect()
    }

    /// Get node by commit hash
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&idx| &self.graph[idx])
    }

    /// The newest commit: the node nothing points to
    pub fn head(&self) -> Option<&GraphNode> {
        self.graph
            .node_indices()
            .find(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx])
    }

    /// The node the chain continues to from `id`, if any
    pub fn next(&self, id: &str) -> Option<&GraphNode> {
        let idx = *self.node_index.get(id)?;
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .map(|n| &self.graph[n])
    }

    /// True when no node has more than one incoming or outgoing edge
    pub fn is_chain(&self) -> bool {
        self.graph.node_indices().all(|idx| {
            self.graph.neighbors_directed(idx, Direction::Incoming).count() <= 1
                && self.graph.neighbors_directed(idx, Direction::Outgoing).count() <= 1
        })
    }
}

/// Structural equality: same nodes in the same order, same edges, same layout.
impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.rankdir == other.rankdir
            && self.nodes().eq(other.nodes())
            && self.edges() == other.edges()
    }
}

impl Eq for Graph {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommitRecord;

    fn node(hash: &str) -> GraphNode {
        GraphNode::for_commit(&CommitRecord::new(hash, "msg"), &[])
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::default();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.edges().is_empty());
        assert!(graph.is_chain());
        assert!(graph.head().is_none());
        assert_eq!(graph.rankdir(), RankDir::LeftToRight);
    }

    #[test]
    fn test_lookup_and_navigation() {
        let mut graph = Graph::with_rankdir(RankDir::TopToBottom);
        let a = graph.push_node(node("aaa"));
        let b = graph.push_node(node("bbb"));
        graph.push_edge(a, b);

        assert_eq!(graph.node("bbb").map(|n| n.id.as_str()), Some("bbb"));
        assert!(graph.node("ccc").is_none());
        assert_eq!(graph.next("aaa").map(|n| n.id.as_str()), Some("bbb"));
        assert!(graph.next("bbb").is_none());
        assert_eq!(graph.head().map(|n| n.id.as_str()), Some("aaa"));
        assert_eq!(graph.edges(), vec![GraphEdge::new("aaa", "bbb")]);
        assert_eq!(graph.rankdir(), RankDir::TopToBottom);
    }

    #[test]
    fn test_branching_is_not_a_chain() {
        let mut graph = Graph::default();
        let a = graph.push_node(node("a"));
        let b = graph.push_node(node("b"));
        let c = graph.push_node(node("c"));
        graph.push_edge(a, b);
        graph.push_edge(a, c);
        assert!(!graph.is_chain());
    }
}

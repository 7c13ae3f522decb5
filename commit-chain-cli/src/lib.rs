//! commit-chain - render a repository's history as a chain of commits
//!
//! Each commit becomes a node labeled with its short hash, summary and
//! changed files. Consecutive log entries are joined by an edge, so the
//! result is a single path in log order (newest first).

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod graph;
pub mod models;
pub mod render;

pub use error::{ChainError, ChainResult};
pub use git::{Backend, HistorySource};
pub use graph::{build_graph, Graph, GraphBuilder};
pub use models::{ChangeSet, CommitRecord, GraphEdge, GraphNode, RankDir};
pub use render::OutputFormat;

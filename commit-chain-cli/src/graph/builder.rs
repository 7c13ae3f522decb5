//! Chain graph construction
//!
//! One node per commit, one edge per pair of consecutive log entries. Edges
//! follow position in the log, not parentage, so merges still yield a chain.

use super::Graph;
use crate::error::{ChainError, ChainResult};
use crate::git::HistorySource;
use crate::models::{ChangeSet, CommitRecord, GraphNode, RankDir};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Called with (resolved, total) after each change-set lookup
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Builds a [`Graph`] from a commit sequence and a [`HistorySource`].
pub struct GraphBuilder<S> {
    source: S,
    workers: usize,
    rankdir: RankDir,
    progress_callback: Option<ProgressCallback>,
}

impl<S: HistorySource> GraphBuilder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            workers: 1,
            rankdir: RankDir::default(),
            progress_callback: None,
        }
    }

    /// Resolve change-sets on `n` threads (1 = sequential)
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    pub fn rankdir(mut self, rankdir: RankDir) -> Self {
        self.rankdir = rankdir;
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Read the full history from the source and build its graph.
    pub fn build_from_history(&self) -> ChainResult<Graph> {
        let commits = self.source.read_history()?;
        self.build(&commits)
    }

    /// Build the chain graph for `commits` (log order).
    ///
    /// Fails without returning a partial graph if a hash repeats or any
    /// change-set lookup fails.
    pub fn build(&self, commits: &[CommitRecord]) -> ChainResult<Graph> {
        reject_duplicates(commits)?;

        let change_sets = self.resolve_all(commits)?;

        let mut graph = Graph::with_rankdir(self.rankdir);
        let mut previous = None;
        for (commit, files) in commits.iter().zip(&change_sets) {
            let idx = graph.push_node(GraphNode::for_commit(commit, files));
            if let Some(prev) = previous {
                graph.push_edge(prev, idx);
            }
            previous = Some(idx);
        }

        info!(
            "Built chain graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn resolve_all(&self, commits: &[CommitRecord]) -> ChainResult<Vec<ChangeSet>> {
        let total = commits.len();
        let completed = AtomicUsize::new(0);

        let resolve = |commit: &CommitRecord| {
            let files = self.source.resolve_files(&commit.hash);
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(ref callback) = self.progress_callback {
                callback(done, total);
            }
            if let Ok(ref files) = files {
                debug!("{}: {} files", commit.short_hash(), files.len());
            }
            files
        };

        if self.workers == 1 || total <= 1 {
            return commits.iter().map(resolve).collect();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        // Collected in index order; the first error by position wins
        let results: Vec<ChainResult<ChangeSet>> =
            pool.install(|| commits.par_iter().map(resolve).collect());
        results.into_iter().collect()
    }
}

/// Build the chain graph for `commits` with change-sets from `source`.
pub fn build_graph<S: HistorySource>(commits: &[CommitRecord], source: &S) -> ChainResult<Graph> {
    GraphBuilder::new(source).build(commits)
}

fn reject_duplicates(commits: &[CommitRecord]) -> ChainResult<()> {
    let mut seen = HashSet::with_capacity(commits.len());
    for commit in commits {
        if !seen.insert(commit.hash.as_str()) {
            return Err(ChainError::DuplicateNode(commit.hash.clone()));
        }
    }
    Ok(())
}

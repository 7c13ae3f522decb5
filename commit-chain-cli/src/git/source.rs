//! History source port
//!
//! The graph builder only needs two reads from version control. Keeping them
//! behind a trait lets the builder run against git, libgit2 or a fixed
//! in-memory history.

use crate::error::{ChainError, ChainResult};
use crate::models::{ChangeSet, CommitRecord};
use std::collections::HashMap;

/// Read access to one repository's commit log.
///
/// Implementations are bound to a repository location when constructed.
pub trait HistorySource: Send + Sync {
    /// Commits in log order, newest first. An empty repository yields `[]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read (tool missing,
    /// location is not a repository).
    fn read_history(&self) -> ChainResult<Vec<CommitRecord>>;

    /// Files touched by `commit_hash`, in reported order.
    ///
    /// # Errors
    ///
    /// Returns an error if the change-set cannot be computed, including
    /// when the hash is unknown.
    fn resolve_files(&self, commit_hash: &str) -> ChainResult<ChangeSet>;
}

impl<T: HistorySource + ?Sized> HistorySource for Box<T> {
    fn read_history(&self) -> ChainResult<Vec<CommitRecord>> {
        (**self).read_history()
    }

    fn resolve_files(&self, commit_hash: &str) -> ChainResult<ChangeSet> {
        (**self).resolve_files(commit_hash)
    }
}

impl<T: HistorySource + ?Sized> HistorySource for &T {
    fn read_history(&self) -> ChainResult<Vec<CommitRecord>> {
        (**self).read_history()
    }

    fn resolve_files(&self, commit_hash: &str) -> ChainResult<ChangeSet> {
        (**self).resolve_files(commit_hash)
    }
}

/// A fixed history held in memory.
///
/// Hashes without a registered change-set resolve to a `ToolFailed` error,
/// mirroring what `git show` does for an unknown revision.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    commits: Vec<CommitRecord>,
    files: HashMap<String, ChangeSet>,
}

impl StaticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit (log order) together with its change-set
    pub fn with_commit(
        mut self,
        hash: &str,
        message: &str,
        files: &[&str],
    ) -> Self {
        self.commits.push(CommitRecord::new(hash, message));
        self.files.insert(
            hash.to_string(),
            files.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    /// Append a commit whose change-set lookup will fail
    pub fn with_unresolvable(mut self, hash: &str, message: &str) -> Self {
        self.commits.push(CommitRecord::new(hash, message));
        self
    }
}

impl HistorySource for StaticHistory {
    fn read_history(&self) -> ChainResult<Vec<CommitRecord>> {
        Ok(self.commits.clone())
    }

    fn resolve_files(&self, commit_hash: &str) -> ChainResult<ChangeSet> {
        self.files.get(commit_hash).cloned().ok_or_else(|| {
            ChainError::tool_failed(
                "git",
                128,
                &format!("fatal: bad object {}", commit_hash),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_history_order_and_files() {
        let history = StaticHistory::new()
            .with_commit("h2", "second", &["b.rs"])
            .with_commit("h1", "first", &[]);

        let commits = history.read_history().unwrap();
        assert_eq!(commits[0].hash, "h2");
        assert_eq!(commits[1].hash, "h1");
        assert_eq!(history.resolve_files("h2").unwrap(), vec!["b.rs"]);
        assert!(history.resolve_files("h1").unwrap().is_empty());
    }

    #[test]
    fn test_static_history_unknown_hash_fails() {
        let history = StaticHistory::new().with_unresolvable("dead", "broken");
        let err = history.resolve_files("dead").unwrap_err();
        assert!(err.is_external_tool());
    }

    #[test]
    fn test_boxed_source_delegates() {
        let boxed: Box<dyn HistorySource> =
            Box::new(StaticHistory::new().with_commit("a", "m", &["f"]));
        assert_eq!(boxed.read_history().unwrap().len(), 1);
        assert_eq!(boxed.resolve_files("a").unwrap(), vec!["f"]);
    }
}

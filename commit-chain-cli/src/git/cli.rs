//! History source backed by the `git` binary
//!
//! - history: `git log --pretty=format:%H %s`
//! - change-sets: `git -c core.quotePath=false show --name-only --pretty=format: <hash>`

use super::source::HistorySource;
use super::tool::ExternalTool;
use crate::error::ChainResult;
use crate::models::{ChangeSet, CommitRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads history by spawning `git` inside a checked-out repository.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    git: ExternalTool,
    max_commits: Option<usize>,
}

impl GitCli {
    pub fn new(repo: &Path) -> Self {
        Self::with_tool(repo, ExternalTool::new("git"))
    }

    /// Use a specific git binary and timeout
    pub fn with_tool(repo: &Path, git: ExternalTool) -> Self {
        Self {
            repo: repo.to_path_buf(),
            git,
            max_commits: None,
        }
    }

    /// Only read the newest `limit` commits
    pub fn max_commits(mut self, limit: Option<usize>) -> Self {
        self.max_commits = limit.filter(|n| *n > 0);
        self
    }

    /// `git rev-parse --verify --quiet HEAD` exits 1 on an unborn branch.
    fn has_commits(&self) -> ChainResult<bool> {
        // Fails with the tool's own message when this is not a repository
        self.git
            .run_checked(&["rev-parse", "--git-dir"], Some(&self.repo))?;

        let head = self
            .git
            .run(&["rev-parse", "--verify", "--quiet", "HEAD"], Some(&self.repo))?;
        Ok(head.success())
    }
}

impl HistorySource for GitCli {
    fn read_history(&self) -> ChainResult<Vec<CommitRecord>> {
        if !self.has_commits()? {
            debug!("{} has no commits yet", self.repo.display());
            return Ok(Vec::new());
        }

        let limit = self.max_commits.map(|n| format!("-n{}", n));
        let mut args = vec!["log", "--pretty=format:%H %s"];
        if let Some(ref limit) = limit {
            args.push(limit);
        }

        let stdout = self.git.run_checked(&args, Some(&self.repo))?;
        let commits = parse_log(&stdout);
        debug!("Read {} commits from {}", commits.len(), self.repo.display());
        Ok(commits)
    }

    fn resolve_files(&self, commit_hash: &str) -> ChainResult<ChangeSet> {
        // Unquoted paths, so non-ASCII names come back as written
        let stdout = self.git.run_checked(
            &[
                "-c",
                "core.quotePath=false",
                "show",
                "--name-only",
                "--pretty=format:",
                commit_hash,
            ],
            Some(&self.repo),
        )?;
        Ok(parse_name_only(&stdout))
    }
}

/// Parse `git log --pretty=format:%H %s` output, one commit per line.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output.lines().filter_map(parse_log_line).collect()
}

/// Split a log line on its first whitespace run: hash, then message.
pub fn parse_log_line(line: &str) -> Option<CommitRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (hash, message) = match line.split_once(char::is_whitespace) {
        Some((hash, rest)) => (hash, rest.trim()),
        None => (line, ""),
    };
    Some(CommitRecord::new(hash, message))
}

/// Parse `--name-only` output: trimmed paths, blank lines dropped.
pub fn parse_name_only(output: &str) -> ChangeSet {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

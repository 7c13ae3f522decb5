//! Git access
//!
//! Provides the two reads the chain graph needs (commit log and per-commit
//! change-sets) behind the [`HistorySource`] trait, with two backends:
//!
//! - [`GitCli`] spawns the `git` binary
//! - [`LibGit`] reads the object database through libgit2
//!
//! # Example
//!
//! ```no_run
//! use commit_chain::git::{GitCli, HistorySource};
//! use std::path::Path;
//!
//! let source = GitCli::new(Path::new("/path/to/repo"));
//! let commits = source.read_history().unwrap();
//! let files = source.resolve_files(&commits[0].hash).unwrap();
//! ```

pub mod cli;
pub mod clone;
pub mod libgit;
pub mod source;
pub mod tool;

pub use cli::GitCli;
pub use clone::RepoHandle;
pub use libgit::LibGit;
pub use source::{HistorySource, StaticHistory};
pub use tool::{ExternalTool, ToolOutput};

use crate::error::ChainResult;
use std::path::Path;
use std::str::FromStr;

/// Which implementation reads the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Spawn the `git` binary
    #[default]
    Git,
    /// Read through libgit2, no processes
    LibGit2,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" | "cli" => Ok(Backend::Git),
            "libgit2" | "git2" => Ok(Backend::LibGit2),
            _ => Err(anyhow::anyhow!(
                "Unknown backend '{}'. Valid backends: git, libgit2",
                s
            )),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Git => write!(f, "git"),
            Backend::LibGit2 => write!(f, "libgit2"),
        }
    }
}

impl Backend {
    /// Open a history source for the repository at `repo`
    pub fn open(
        self,
        repo: &Path,
        git: &ExternalTool,
        max_commits: Option<usize>,
    ) -> ChainResult<Box<dyn HistorySource>> {
        let source: Box<dyn HistorySource> = match self {
            Backend::Git => Box::new(GitCli::with_tool(repo, git.clone()).max_commits(max_commits)),
            Backend::LibGit2 => Box::new(LibGit::open(repo)?.max_commits(max_commits)),
        };
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use std::process::Command;

    /// Run git with a fixed identity and both dates set to `secs`
    fn git_at(dir: &Path, secs: u64, args: &[&str]) {
        let date = format!("{} +0000", secs);
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "Test User")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "Test User")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn commit_file(dir: &Path, secs: u64, name: &str) {
        std::fs::write(dir.join(name), name).unwrap();
        git_at(dir, secs, &["add", "-A"]);
        git_at(dir, secs, &["commit", "-q", "-m", name.trim_end_matches(".txt")]);
    }

    /// root, then side1 / main1 / side2 interleaved in time, then a --no-ff merge
    fn branchy_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path();
        git_at(path, 0, &["init", "-q"]);
        commit_file(path, 1_700_000_100, "root.txt");
        git_at(path, 0, &["checkout", "-q", "-b", "side"]);
        commit_file(path, 1_700_000_200, "side1.txt");
        git_at(path, 0, &["checkout", "-q", "-"]);
        commit_file(path, 1_700_000_300, "main1.txt");
        git_at(path, 0, &["checkout", "-q", "side"]);
        commit_file(path, 1_700_000_400, "side2.txt");
        git_at(path, 0, &["checkout", "-q", "-"]);
        git_at(
            path,
            1_700_000_500,
            &["merge", "-q", "--no-ff", "--no-edit", "-m", "merge", "side"],
        );
        dir
    }

    #[test]
    fn test_backends_agree_on_branchy_history() {
        let git = ExternalTool::new("git");
        if !git.is_installed() {
            return;
        }
        let repo = branchy_repo();

        for backend in [Backend::Git, Backend::LibGit2] {
            let source = backend.open(repo.path(), &git, None).unwrap();
            let commits = source.read_history().unwrap();
            let messages: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
            assert_eq!(
                messages,
                vec!["merge", "side2", "main1", "side1", "root"],
                "{} backend",
                backend
            );

            assert!(source.resolve_files(&commits[0].hash).unwrap().is_empty());
            assert_eq!(source.resolve_files(&commits[1].hash).unwrap(), vec!["side2.txt"]);

            let graph = GraphBuilder::new(source).build(&commits).unwrap();
            assert!(graph.is_chain());
            assert_eq!(graph.node_count(), 5);
            assert_eq!(graph.edge_count(), 4);
        }
    }

    #[test]
    fn test_backends_agree_on_non_ascii_paths() {
        let git = ExternalTool::new("git");
        if !git.is_installed() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        git_at(dir.path(), 0, &["init", "-q"]);
        commit_file(dir.path(), 1_700_000_100, "café.txt");
        commit_file(dir.path(), 1_700_000_200, "naïve résumé.txt");

        let cli = Backend::Git.open(dir.path(), &git, None).unwrap();
        let lib = Backend::LibGit2.open(dir.path(), &git, None).unwrap();
        let commits = cli.read_history().unwrap();
        assert_eq!(commits, lib.read_history().unwrap());

        for commit in &commits {
            assert_eq!(
                cli.resolve_files(&commit.hash).unwrap(),
                lib.resolve_files(&commit.hash).unwrap()
            );
        }
        assert_eq!(cli.resolve_files(&commits[1].hash).unwrap(), vec!["café.txt"]);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("git".parse::<Backend>().unwrap(), Backend::Git);
        assert_eq!("LibGit2".parse::<Backend>().unwrap(), Backend::LibGit2);
        assert!("svn".parse::<Backend>().is_err());
        assert_eq!(Backend::default().to_string(), "git");
    }

    #[test]
    fn test_libgit2_backend_requires_repository() {
        let dir = tempfile::tempdir().unwrap();
        if !LibGit::is_git_repo(dir.path()) {
            let opened = Backend::LibGit2.open(dir.path(), &ExternalTool::new("git"), None);
            assert!(opened.is_err());
        }
    }
}

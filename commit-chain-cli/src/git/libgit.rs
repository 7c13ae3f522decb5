//! History source backed by libgit2
//!
//! Reads the same log and change-sets as [`GitCli`](super::GitCli) without
//! spawning processes, using the git2 crate (Rust bindings to libgit2).

use super::source::HistorySource;
use crate::error::ChainResult;
use crate::models::{ChangeSet, CommitRecord};
use git2::{Commit, Diff, ErrorCode, Oid, Repository, Sort, Tree};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// libgit2 repository handle.
///
/// `Repository` is not `Sync`, so access is serialized through a mutex.
pub struct LibGit {
    repo: Mutex<Repository>,
    max_commits: Option<usize>,
}

impl LibGit {
    /// Open a git repository.
    ///
    /// # Arguments
    /// * `path` - Path to the repository (or any subdirectory)
    pub fn open(path: &Path) -> ChainResult<Self> {
        let repo = Repository::discover(path)?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self {
            repo: Mutex::new(repo),
            max_commits: None,
        })
    }

    /// Only read the newest `limit` commits
    pub fn max_commits(mut self, limit: Option<usize>) -> Self {
        self.max_commits = limit.filter(|n| *n > 0);
        self
    }

    /// Check if a path is inside a git repository.
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    fn with_repo<T>(&self, f: impl FnOnce(&Repository) -> ChainResult<T>) -> ChainResult<T> {
        // A poisoned lock only means another reader panicked mid-walk
        let repo = self.repo.lock().unwrap_or_else(|e| e.into_inner());
        f(&repo)
    }
}

impl HistorySource for LibGit {
    fn read_history(&self) -> ChainResult<Vec<CommitRecord>> {
        self.with_repo(|repo| {
            let mut revwalk = repo.revwalk()?;
            revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

            match revwalk.push_head() {
                Ok(()) => {}
                Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                    debug!("Repository has no commits yet");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e.into()),
            }

            let limit = self.max_commits.unwrap_or(usize::MAX);
            let mut commits = Vec::new();
            for oid_result in revwalk.take(limit) {
                let oid = oid_result?;
                let commit = repo.find_commit(oid)?;
                commits.push(CommitRecord::new(
                    oid.to_string(),
                    commit.summary().unwrap_or("").trim(),
                ));
            }

            Ok(commits)
        })
    }

    fn resolve_files(&self, commit_hash: &str) -> ChainResult<ChangeSet> {
        self.with_repo(|repo| {
            let oid = Oid::from_str(commit_hash)?;
            let commit = repo.find_commit(oid)?;
            changed_paths(repo, &commit)
        })
    }
}

/// Paths changed by `commit`.
///
/// Root commits list every file; merges list only paths that differ from
/// every parent, like git's combined diff.
fn changed_paths(repo: &Repository, commit: &Commit) -> ChainResult<ChangeSet> {
    let tree = commit.tree()?;

    if commit.parent_count() == 0 {
        let diff = repo.diff_tree_to_tree(None, Some(&tree), None)?;
        return Ok(delta_paths(&diff)?.into_iter().collect());
    }

    let mut common: Option<BTreeSet<String>> = None;
    for parent in commit.parents() {
        let paths = paths_against(repo, &parent.tree()?, &tree)?;
        common = Some(match common {
            None => paths,
            Some(acc) => acc.intersection(&paths).cloned().collect(),
        });
    }

    Ok(common.unwrap_or_default().into_iter().collect())
}

fn paths_against(repo: &Repository, old: &Tree, new: &Tree) -> ChainResult<BTreeSet<String>> {
    let diff = repo.diff_tree_to_tree(Some(old), Some(new), None)?;
    delta_paths(&diff)
}

fn delta_paths(diff: &Diff) -> ChainResult<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    diff.foreach(
        &mut |delta, _| {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                files.insert(path.to_string_lossy().to_string());
            }
            true
        },
        None,
        None,
        None,
    )?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChainError;
    use git2::{Signature, Time};
    use tempfile::tempdir;

    fn commit_files(
        repo: &Repository,
        dir: &Path,
        files: &[(&str, &str)],
        message: &str,
        parents: &[&Commit],
    ) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let mut index = repo.index().unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
            index.add_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, parents)
            .unwrap()
    }

    #[test]
    fn test_history_and_change_sets() -> ChainResult<()> {
        let dir = tempdir()?;
        let repo = Repository::init(dir.path())?;

        let first = commit_files(&repo, dir.path(), &[("readme.txt", "hi")], "Init", &[]);
        let first_commit = repo.find_commit(first)?;
        let second = commit_files(
            &repo,
            dir.path(),
            &[("feature.go", "a"), ("feature_test.go", "b")],
            "Add feature\n\nLonger body",
            &[&first_commit],
        );

        let source = LibGit::open(dir.path())?;
        let commits = source.read_history()?;
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, second.to_string());
        assert_eq!(commits[0].message, "Add feature");
        assert_eq!(commits[1].hash, first.to_string());

        assert_eq!(
            source.resolve_files(&second.to_string())?,
            vec!["feature.go", "feature_test.go"]
        );
        assert_eq!(source.resolve_files(&first.to_string())?, vec!["readme.txt"]);

        let limited = LibGit::open(dir.path())?.max_commits(Some(1));
        assert_eq!(limited.read_history()?.len(), 1);
        Ok(())
    }

    /// Commit a tree of `files` at `secs` without moving any ref
    fn commit_tree(
        repo: &Repository,
        files: &[(&str, &str)],
        message: &str,
        secs: i64,
        parents: &[Oid],
    ) -> Oid {
        let mut builder = repo.treebuilder(None).unwrap();
        for (name, content) in files {
            let blob = repo.blob(content.as_bytes()).unwrap();
            builder.insert(*name, blob, 0o100644).unwrap();
        }
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();
        let sig = Signature::new("Test User", "test@example.com", &Time::new(secs, 0)).unwrap();
        let parents: Vec<Commit> = parents.iter().map(|id| repo.find_commit(*id).unwrap()).collect();
        let parent_refs: Vec<&Commit> = parents.iter().collect();
        repo.commit(None, &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_merge_lists_paths_changed_against_every_parent() -> ChainResult<()> {
        let dir = tempdir()?;
        let repo = Repository::init(dir.path())?;

        let root = commit_tree(&repo, &[("a.txt", "base")], "root", 1_000, &[]);
        let side = commit_tree(&repo, &[("a.txt", "base"), ("side.txt", "s")], "side", 2_000, &[root]);
        let main = commit_tree(&repo, &[("a.txt", "base"), ("main.txt", "m")], "main", 3_000, &[root]);
        // a.txt resolved to content neither parent had
        let merge = commit_tree(
            &repo,
            &[("a.txt", "resolved"), ("main.txt", "m"), ("side.txt", "s")],
            "merge",
            4_000,
            &[main, side],
        );
        repo.set_head_detached(merge)?;

        let source = LibGit::open(dir.path())?;
        let messages: Vec<String> = source
            .read_history()?
            .into_iter()
            .map(|c| c.message)
            .collect();
        assert_eq!(messages, vec!["merge", "main", "side", "root"]);

        assert_eq!(source.resolve_files(&merge.to_string())?, vec!["a.txt"]);
        assert_eq!(source.resolve_files(&side.to_string())?, vec!["side.txt"]);
        assert_eq!(source.resolve_files(&root.to_string())?, vec!["a.txt"]);
        Ok(())
    }

    #[test]
    fn test_clean_merge_has_empty_change_set() -> ChainResult<()> {
        let dir = tempdir()?;
        let repo = Repository::init(dir.path())?;

        let root = commit_tree(&repo, &[("a.txt", "a")], "root", 1_000, &[]);
        let side = commit_tree(&repo, &[("a.txt", "a"), ("b.txt", "b")], "side", 2_000, &[root]);
        let main = commit_tree(&repo, &[("a.txt", "a"), ("c.txt", "c")], "main", 3_000, &[root]);
        let merge = commit_tree(
            &repo,
            &[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")],
            "merge",
            4_000,
            &[main, side],
        );
        repo.set_head_detached(merge)?;

        let source = LibGit::open(dir.path())?;
        assert!(source.resolve_files(&merge.to_string())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_repository() -> ChainResult<()> {
        let dir = tempdir()?;
        Repository::init(dir.path())?;
        let source = LibGit::open(dir.path())?;
        assert!(source.read_history()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_hash_is_error() -> ChainResult<()> {
        let dir = tempdir()?;
        let repo = Repository::init(dir.path())?;
        commit_files(&repo, dir.path(), &[("a.txt", "a")], "a", &[]);

        let source = LibGit::open(dir.path())?;
        let err = source
            .resolve_files("0123456789abcdef0123456789abcdef01234567")
            .unwrap_err();
        assert!(matches!(err, ChainError::Git(_)));
        Ok(())
    }

    #[test]
    fn test_not_a_repository() {
        let dir = tempdir().unwrap();
        if !LibGit::is_git_repo(dir.path()) {
            assert!(matches!(LibGit::open(dir.path()), Err(ChainError::Git(_))));
        }
    }
}

//! Repository provider: use a local checkout or clone a URL into a temp dir

use super::tool::ExternalTool;
use crate::error::ChainResult;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// A materialized repository location.
///
/// Cloned repositories live in a temporary directory that is removed when
/// the handle is dropped.
#[derive(Debug)]
pub struct RepoHandle {
    path: PathBuf,
    _temp: Option<TempDir>,
}

impl RepoHandle {
    /// Use `source` in place if it is an existing directory, otherwise clone it.
    pub fn acquire(source: &str, git: &ExternalTool) -> ChainResult<Self> {
        let local = Path::new(source);
        if local.is_dir() {
            return Ok(Self::local(local));
        }
        Self::clone_url(source, git)
    }

    pub fn local(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            _temp: None,
        }
    }

    /// `git clone -- <url> <tempdir>`
    pub fn clone_url(url: &str, git: &ExternalTool) -> ChainResult<Self> {
        let temp = tempfile::Builder::new().prefix("commit-chain-").tempdir()?;
        let target = temp.path().to_string_lossy().to_string();

        info!("Cloning {} into {}", url, target);
        git.run_checked(&["clone", "--quiet", "--", url, &target], None)?;

        Ok(Self {
            path: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the repository was cloned and will be cleaned up on drop
    pub fn is_temporary(&self) -> bool {
        self._temp.is_some()
    }
}

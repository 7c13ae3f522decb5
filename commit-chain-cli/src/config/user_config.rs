//! User-level configuration for commit-chain
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/commit-chain/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct GitConfig {
    /// History backend: "git" (default) or "libgit2"
    pub backend: Option<String>,

    /// git binary to invoke (default: git)
    pub binary: Option<String>,

    /// Kill git after this many seconds (default: 0 = never)
    pub timeout_secs: Option<u64>,

    /// Only graph the newest N commits
    pub max_commits: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Graphviz binary to invoke (default: dot)
    pub dot_binary: Option<String>,

    /// Output format: png, svg, dot, json
    pub format: Option<String>,

    /// Output file
    pub output: Option<PathBuf>,

    /// Layout direction: LR, RL, TB, BT
    pub rankdir: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/commit-chain/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            match Self::load_from(&path) {
                Ok(user_config) => config.merge(user_config),
                Err(e) => warn!("Ignoring {}: {:#}", path.display(), e),
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("commit-chain").join("config.toml"))
    }

    /// Apply `COMMIT_CHAIN_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(git) = lookup("COMMIT_CHAIN_GIT") {
            self.git.binary = Some(git);
        }
        if let Some(dot) = lookup("COMMIT_CHAIN_DOT") {
            self.render.dot_binary = Some(dot);
        }
        if let Some(timeout) = lookup("COMMIT_CHAIN_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.git.timeout_secs = Some(secs),
                Err(_) => warn!("COMMIT_CHAIN_TIMEOUT is not a number: {}", timeout),
            }
        }
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.git.backend.is_some() {
            self.git.backend = other.git.backend;
        }
        if other.git.binary.is_some() {
            self.git.binary = other.git.binary;
        }
        if other.git.timeout_secs.is_some() {
            self.git.timeout_secs = other.git.timeout_secs;
        }
        if other.git.max_commits.is_some() {
            self.git.max_commits = other.git.max_commits;
        }
        if other.render.dot_binary.is_some() {
            self.render.dot_binary = other.render.dot_binary;
        }
        if other.render.format.is_some() {
            self.render.format = other.render.format;
        }
        if other.render.output.is_some() {
            self.render.output = other.render.output;
        }
        if other.render.rankdir.is_some() {
            self.render.rankdir = other.render.rankdir;
        }
    }

    pub fn backend(&self) -> &str {
        self.git.backend.as_deref().unwrap_or("git")
    }

    pub fn git_binary(&self) -> &str {
        self.git.binary.as_deref().unwrap_or("git")
    }

    pub fn dot_binary(&self) -> &str {
        self.render.dot_binary.as_deref().unwrap_or("dot")
    }

    pub fn timeout_secs(&self) -> u64 {
        self.git.timeout_secs.unwrap_or(0)
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, EXAMPLE_CONFIG)?;
        }

        Ok(config_path)
    }
}

const EXAMPLE_CONFIG: &str = r#"# commit-chain user configuration

[git]
# History backend: "git" (spawns the git binary) or "libgit2" (in-process)
# backend = "git"
# binary = "git"
# timeout_secs = 0      # 0 = no timeout
# max_commits = 500     # only graph the newest N commits

[render]
# dot_binary = "dot"
# format = "png"        # png, svg, dot, json
# output = "commit-graph.png"
# rankdir = "LR"        # LR, RL, TB, BT
"#;

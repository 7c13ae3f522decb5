//! Error taxonomy for history reading and graph construction

use thiserror::Error;

/// Errors raised while reading history, resolving change-sets or building the graph
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("{tool} not found. Please install it first.")]
    ToolNotFound { tool: String },

    #[error("{tool} exited with status {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("{tool} timed out after {secs}s")]
    ToolTimeout { tool: String, secs: u64 },

    #[error("Duplicate commit hash in history: {0}")]
    DuplicateNode(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize graph: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ChainError {
    /// True for failures of an external process (spawn, exit status, timeout)
    pub fn is_external_tool(&self) -> bool {
        matches!(
            self,
            ChainError::ToolNotFound { .. }
                | ChainError::ToolFailed { .. }
                | ChainError::ToolTimeout { .. }
        )
    }

    pub(crate) fn tool_failed(tool: &str, code: i32, stderr: &str) -> Self {
        ChainError::ToolFailed {
            tool: tool.to_string(),
            code,
            stderr: stderr.trim().to_string(),
        }
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

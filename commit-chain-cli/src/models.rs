//! Core data models for commit-chain
//!
//! Commit records come out of the history reader, change-sets out of the
//! resolver, and nodes/edges make up the chain graph handed to a renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of hex characters shown for a commit in node labels.
pub const SHORT_HASH_LEN: usize = 7;

/// A single entry of the commit log, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit hash
    pub hash: String,
    /// Commit subject line
    pub message: String,
}

impl CommitRecord {
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
        }
    }

    /// First 7 characters of the hash, or the whole hash when shorter.
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

/// Files touched by one commit, in the order the VCS reported them.
pub type ChangeSet = Vec<String>;

/// Abbreviate a hash to [`SHORT_HASH_LEN`] characters.
pub fn short_hash(hash: &str) -> &str {
    match hash.char_indices().nth(SHORT_HASH_LEN) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}

/// Node shapes understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Box,
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeShape::Box => write!(f, "box"),
        }
    }
}

/// Graph layout direction, spelled the way Graphviz expects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RankDir {
    #[default]
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "RL")]
    RightToLeft,
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "BT")]
    BottomToTop,
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankDir::LeftToRight => write!(f, "LR"),
            RankDir::RightToLeft => write!(f, "RL"),
            RankDir::TopToBottom => write!(f, "TB"),
            RankDir::BottomToTop => write!(f, "BT"),
        }
    }
}

impl FromStr for RankDir {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LR" => Ok(RankDir::LeftToRight),
            "RL" => Ok(RankDir::RightToLeft),
            "TB" => Ok(RankDir::TopToBottom),
            "BT" => Ok(RankDir::BottomToTop),
            _ => Err(anyhow::anyhow!(
                "Unknown rankdir '{}'. Valid values: LR, RL, TB, BT",
                s
            )),
        }
    }
}

/// One commit in the chain graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Full commit hash
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    /// Commit subject line
    pub message: String,
    /// Files the commit touched
    pub files: ChangeSet,
}

impl GraphNode {
    /// Build the node for a commit and the files it touched.
    pub fn for_commit(commit: &CommitRecord, files: &[String]) -> Self {
        Self {
            id: commit.hash.clone(),
            label: node_label(commit, files),
            shape: NodeShape::Box,
            message: commit.message.clone(),
            files: files.to_vec(),
        }
    }

    pub fn short_hash(&self) -> &str {
        short_hash(&self.id)
    }
}

/// `<short hash>\n<message>\nFiles:\n<file>\n<file>...`
pub fn node_label(commit: &CommitRecord, files: &[String]) -> String {
    format!(
        "{}\n{}\nFiles:\n{}",
        commit.short_hash(),
        commit.message,
        files.join("\n")
    )
}

/// Directed edge between two consecutive log entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("aaaa1112222333"), "aaaa111");
        assert_eq!(short_hash("abc"), "abc");
        assert_eq!(short_hash("abcdefg"), "abcdefg");
        assert_eq!(short_hash(""), "");
    }

    #[test]
    fn test_node_label_format() {
        let commit = CommitRecord::new("bbbb2223333444", "Add feature");
        let files = vec!["feature.go".to_string(), "feature_test.go".to_string()];
        assert_eq!(
            node_label(&commit, &files),
            "bbbb222\nAdd feature\nFiles:\nfeature.go\nfeature_test.go"
        );
    }

    #[test]
    fn test_node_label_no_files() {
        let commit = CommitRecord::new("cafebabe", "Merge branch 'x'");
        assert_eq!(node_label(&commit, &[]), "cafebab\nMerge branch 'x'\nFiles:\n");
    }

    #[test]
    fn test_node_for_commit() {
        let commit = CommitRecord::new("aaaa1112222", "Init");
        let node = GraphNode::for_commit(&commit, &["readme.txt".to_string()]);
        assert_eq!(node.id, "aaaa1112222");
        assert_eq!(node.shape, NodeShape::Box);
        assert!(node.label.ends_with("Files:\nreadme.txt"));
        assert_eq!(node.short_hash(), "aaaa111");
        assert_eq!(node.message, "Init");
        assert_eq!(node.files, vec!["readme.txt"]);
    }

    #[test]
    fn test_rankdir_roundtrip() {
        for dir in ["LR", "rl", "TB", "bt"] {
            let parsed: RankDir = dir.parse().unwrap();
            assert_eq!(parsed.to_string(), dir.to_uppercase());
        }
        assert!("diagonal".parse::<RankDir>().is_err());
        assert_eq!(RankDir::default(), RankDir::LeftToRight);
    }
}

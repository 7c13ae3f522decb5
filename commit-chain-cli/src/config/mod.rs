//! Configuration module for commit-chain
//!
//! Settings come from `~/.config/commit-chain/config.toml`, overridden by
//! `COMMIT_CHAIN_*` environment variables, overridden by CLI flags.

mod user_config;

pub use user_config::{GitConfig, RenderConfig, UserConfig};

//! Doctor command - check environment

use crate::config::UserConfig;
use crate::git::ExternalTool;
use anyhow::Result;

pub fn run(config: &UserConfig) -> Result<()> {
    println!("🩺 commit-chain doctor\n");

    let git = ExternalTool::new(config.git_binary());
    let git_ok = git.is_installed();
    if git_ok {
        println!("✓ git: {}", version_line(&git, "--version"));
    } else {
        println!("✗ git: '{}' not found", git.program());
        println!("  Install git or use --backend libgit2 for local repositories");
    }

    let dot = ExternalTool::new(config.dot_binary());
    if let Some(version) = dot_version(&dot) {
        println!("✓ Graphviz: {}", version);
    } else {
        println!("○ Graphviz: '{}' not found", dot.program());
        println!("  Install Graphviz for png/svg output, or use -f dot / -f json");
    }

    match UserConfig::user_config_path() {
        Some(path) if path.exists() => println!("✓ Config: {}", path.display()),
        Some(path) => println!("○ Config: {} (not found, using defaults)", path.display()),
        None => println!("○ Config: no config directory"),
    }

    if git_ok {
        println!("\n✅ Ready to graph repositories");
        Ok(())
    } else {
        anyhow::bail!("git is required for the default backend")
    }
}

fn version_line(tool: &ExternalTool, flag: &str) -> String {
    tool.run(&[flag], None)
        .map(|out| out.stdout.lines().next().unwrap_or_default().trim().to_string())
        .unwrap_or_default()
}

/// `dot -V` prints its version on stderr
fn dot_version(dot: &ExternalTool) -> Option<String> {
    let out = dot.run(&["-V"], None).ok()?;
    if !out.success() {
        return None;
    }
    Some(out.stderr.lines().next().unwrap_or_default().trim().to_string())
}

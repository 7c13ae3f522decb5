//! CLI command definitions and handlers

mod doctor;
mod log;
mod render;

use crate::config::UserConfig;
use crate::git::{Backend, ExternalTool};
use crate::models::RankDir;
use crate::render::OutputFormat;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// commit-chain - draw a repository's history as a chain of commits
#[derive(Parser, Debug)]
#[command(name = "commit-chain")]
#[command(
    version,
    about = "Render a repository's commit history as a chain graph labeled with changed files",
    args_conflicts_with_subcommands = true,
    after_help = "\
Examples:
  commit-chain                                   Graph the current repository to commit-graph.png
  commit-chain https://github.com/org/repo.git   Clone and graph a remote repository
  commit-chain . -f svg -o history.svg           SVG output
  commit-chain . -f dot -o -                     Print Graphviz source to stdout
  commit-chain log . --files                     List the chain in the terminal
  commit-chain doctor                            Check that git and dot are installed"
)]
pub struct Cli {
    #[command(flatten)]
    pub render: RenderArgs,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers resolving change-sets (1-64)
    #[arg(long, global = true, default_value = "1", value_parser = parse_workers)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every command that reads a repository
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Repository path or URL to clone (default: current directory)
    #[arg(default_value = ".")]
    pub source: String,

    /// History backend: git (spawn the git binary) or libgit2
    #[arg(long, value_parser = ["git", "libgit2"])]
    pub backend: Option<String>,

    /// Only graph the newest N commits
    #[arg(long, short = 'n')]
    pub max_commits: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file (default: commit-graph.<format>, "-" for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output format: png, svg, dot, json
    #[arg(long, short = 'f', value_parser = ["png", "svg", "dot", "json"])]
    pub format: Option<String>,

    /// Layout direction: LR, RL, TB, BT
    #[arg(long, value_parser = ["LR", "RL", "TB", "BT"])]
    pub rankdir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the commit chain to the terminal
    Log {
        #[command(flatten)]
        source: SourceArgs,

        /// List each commit's files
        #[arg(long)]
        files: bool,
    },

    /// Check that git and Graphviz are installed
    Doctor,

    /// Manage the user config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version info
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create ~/.config/commit-chain/config.toml with example settings
    Init,
    /// Show the effective configuration
    Show,
}

/// Effective settings: config file and env, overridden by CLI flags
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub backend: Backend,
    pub git: ExternalTool,
    pub dot: ExternalTool,
    pub max_commits: Option<usize>,
    pub workers: usize,
}

impl Settings {
    fn resolve(config: &UserConfig, source: &SourceArgs, workers: usize) -> Result<Self> {
        let backend: Backend = source
            .backend
            .as_deref()
            .unwrap_or(config.backend())
            .parse()?;

        Ok(Self {
            backend,
            git: ExternalTool::new(config.git_binary()).with_timeout(config.timeout_secs()),
            dot: ExternalTool::new(config.dot_binary()).with_timeout(config.timeout_secs()),
            max_commits: source.max_commits.or(config.git.max_commits),
            workers,
        })
    }
}

/// Output choices for the render command
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OutputSettings {
    pub format: OutputFormat,
    /// `None` means stdout
    pub output: Option<PathBuf>,
    pub rankdir: RankDir,
}

impl OutputSettings {
    fn resolve(config: &UserConfig, args: &RenderArgs) -> Result<Self> {
        let output = args.output.clone().or_else(|| config.render.output.clone());
        let to_stdout = output.as_deref().is_some_and(|p| p.as_os_str() == "-");

        let format: OutputFormat = match args.format.as_deref() {
            Some(f) => f.parse()?,
            None => match output.as_deref().and_then(OutputFormat::from_path) {
                Some(f) => f,
                None => match config.render.format.as_deref() {
                    Some(f) => f.parse()?,
                    None if to_stdout => OutputFormat::Dot,
                    None => OutputFormat::default(),
                },
            },
        };

        let output = if to_stdout {
            None
        } else {
            Some(output.unwrap_or_else(|| crate::render::default_output_path(format)))
        };

        let rankdir: RankDir = match args.rankdir.as_deref().or(config.render.rankdir.as_deref()) {
            Some(dir) => dir.parse()?,
            None => RankDir::default(),
        };

        Ok(Self {
            format,
            output,
            rankdir,
        })
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = UserConfig::load()?;

    match cli.command {
        Some(Commands::Log { source, files }) => {
            let settings = Settings::resolve(&config, &source, cli.workers)?;
            log::run(&source.source, &settings, files)
        }

        Some(Commands::Doctor) => doctor::run(&config),

        Some(Commands::Config { action }) => run_config_action(action, &config),

        Some(Commands::Version) => {
            println!("commit-chain {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        None => {
            check_unknown_subcommand(&cli.render.source.source)?;
            let settings = Settings::resolve(&config, &cli.render.source, cli.workers)?;
            let output = OutputSettings::resolve(&config, &cli.render)?;
            render::run(&cli.render.source.source, &settings, &output)
        }
    }
}

/// Check if the source looks like a mistyped subcommand and bail with a helpful message
fn check_unknown_subcommand(source: &str) -> Result<()> {
    let looks_like_command = !std::path::Path::new(source).exists()
        && !source.contains('/')
        && !source.contains('\\')
        && !source.contains(':')
        && !source.starts_with('.');
    if looks_like_command {
        anyhow::bail!(
            "Unknown command or repository '{}'. Run 'commit-chain --help' for available commands.\n\nCommands: log, doctor, config, version",
            source
        );
    }
    Ok(())
}

fn run_config_action(action: ConfigAction, config: &UserConfig) -> Result<()> {
    use console::style;

    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("{} Config initialized at: {}", style("✓").green(), path.display());
            Ok(())
        }
        ConfigAction::Show => {
            if let Some(user_path) = UserConfig::user_config_path() {
                let status = if user_path.exists() { "✓" } else { "(not found)" };
                println!("Config: {} {}", user_path.display(), status);
            }
            println!();
            println!("  {:<14} {}", style("backend").cyan(), config.backend());
            println!("  {:<14} {}", style("git").cyan(), config.git_binary());
            println!("  {:<14} {}", style("dot").cyan(), config.dot_binary());
            println!("  {:<14} {}s", style("timeout").cyan(), config.timeout_secs());
            if let Some(n) = config.git.max_commits {
                println!("  {:<14} {}", style("max_commits").cyan(), n);
            }
            if let Some(ref format) = config.render.format {
                println!("  {:<14} {}", style("format").cyan(), format);
            }
            if let Some(ref output) = config.render.output {
                println!("  {:<14} {}", style("output").cyan(), output.display());
            }
            if let Some(ref rankdir) = config.render.rankdir {
                println!("  {:<14} {}", style("rankdir").cyan(), rankdir);
            }
            Ok(())
        }
    }
}

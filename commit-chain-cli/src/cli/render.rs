//! Default command: read a repository's history and write the chain graph

use super::{OutputSettings, Settings};
use crate::git::RepoHandle;
use crate::graph::GraphBuilder;
use crate::render::{self, GraphvizRenderer};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::debug;

pub(super) fn run(source: &str, settings: &Settings, output: &OutputSettings) -> Result<()> {
    let start = Instant::now();
    let renderer = GraphvizRenderer::new(settings.dot.clone());

    // Fail before cloning if the image can't be drawn
    if output.format.needs_graphviz() && !renderer.is_available() {
        anyhow::bail!(
            "Graphviz '{}' not found. Install Graphviz or use -f dot / -f json.",
            settings.dot.program()
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style());
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message(format!("Opening {}...", source));
    let repo = RepoHandle::acquire(source, &settings.git)
        .with_context(|| format!("Failed to open repository '{}'", source))?;
    debug!(
        "Reading {} ({})",
        repo.path().display(),
        if repo.is_temporary() { "clone" } else { "local" }
    );

    spinner.set_message("Reading commit history...");
    let history = settings
        .backend
        .open(repo.path(), &settings.git, settings.max_commits)?;
    let commits = history.read_history()?;
    spinner.finish_and_clear();

    let bar = ProgressBar::new(commits.len() as u64);
    bar.set_style(create_bar_style());
    bar.set_message("Resolving changed files...");
    let progress = bar.clone();

    let graph = GraphBuilder::new(history)
        .workers(settings.workers)
        .rankdir(output.rankdir)
        .on_progress(move |done, _total| progress.set_position(done as u64))
        .build(&commits)?;

    bar.finish_and_clear();

    if graph.is_empty() {
        eprintln!("{} Repository has no commits", style("!").yellow());
    }

    match output.output {
        None => {
            let text = render::render_text(&graph, output.format)?.ok_or_else(|| {
                anyhow::anyhow!("Format '{}' cannot be written to stdout", output.format)
            })?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Some(ref path) => {
            render::write_graph(&graph, output.format, path, &renderer)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} commits to {} ({:.1}s)",
                style("✓").green(),
                style(graph.node_count()).cyan(),
                style(path.display()).bold(),
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}

fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid template")
}

fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

//! Log command - print the chain in the terminal

use super::Settings;
use crate::git::RepoHandle;
use crate::graph::{Graph, GraphBuilder};
use anyhow::{Context, Result};
use console::style;

pub(super) fn run(source: &str, settings: &Settings, show_files: bool) -> Result<()> {
    let repo = RepoHandle::acquire(source, &settings.git)
        .with_context(|| format!("Failed to open repository '{}'", source))?;
    let history = settings
        .backend
        .open(repo.path(), &settings.git, settings.max_commits)?;

    let graph = GraphBuilder::new(history)
        .workers(settings.workers)
        .build_from_history()?;

    if graph.is_empty() {
        println!("{} Repository has no commits", style("!").yellow());
        return Ok(());
    }

    print!("{}", format_chain(&graph, show_files));
    Ok(())
}

/// One line per commit in chain order, with files indented below when asked
fn format_chain(graph: &Graph, show_files: bool) -> String {
    let width = graph.node_count().to_string().len();
    let mut out = String::new();

    let mut current = graph.head();
    let mut position = 1;
    while let Some(node) = current {
        out.push_str(&format!(
            "{:>width$}. {} {} {}\n",
            position,
            style(node.short_hash()).yellow(),
            node.message,
            style(format!("({} files)", node.files.len())).dim(),
            width = width
        ));
        if show_files {
            for file in &node.files {
                out.push_str(&format!("{:>width$}  {}\n", "", file, width = width + 1));
            }
        }
        current = graph.next(&node.id);
        position += 1;
    }
    out
}

//! Graphviz DOT serializer

use crate::graph::Graph;
use std::fmt::Write;

/// Render the graph as a `digraph` in DOT source form
pub fn render(graph: &Graph) -> String {
    let mut out = String::from("digraph {\n");
    let _ = writeln!(out, "\trankdir={}", graph.rankdir());

    for node in graph.nodes() {
        let _ = writeln!(
            out,
            "\t{} [label={} shape={}]",
            quote(&node.id),
            quote(&node.label),
            node.shape
        );
    }

    for edge in graph.edges() {
        let _ = writeln!(out, "\t{} -> {}", quote(&edge.from), quote(&edge.to));
    }

    out.push_str("}\n");
    out
}

/// Quote a DOT identifier, escaping `\` and `"` and encoding newlines as `\n`
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

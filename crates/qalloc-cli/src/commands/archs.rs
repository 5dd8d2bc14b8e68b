//! Archs command implementation.

use anyhow::Result;
use console::style;

use qalloc_arch::{ArchGraph, BUILTIN_ARCHITECTURES};

use super::common::load_arch;

/// Execute the archs command.
pub fn execute(show: Option<&str>) -> Result<()> {
    if let Some(name) = show {
        let graph = load_arch(name)?;
        print!("{}", graph.to_dot());
        return Ok(());
    }

    println!("{} Built-in architectures:\n", style("qalloc").cyan().bold());

    for (name, graph) in [
        ("ibmqx2", ArchGraph::ibmqx2()),
        ("ibmqx4", ArchGraph::ibmqx4()),
    ] {
        println!("  {} {}", style("●").green(), style(name).bold());
        println!("    Qubits: {}", graph.size());
        let edges: Vec<String> = graph
            .edges()
            .iter()
            .map(|(u, v)| format!("{u}->{v}"))
            .collect();
        println!("    Edges:  {}", edges.join(", "));
        println!();
    }

    let families: Vec<&str> = BUILTIN_ARCHITECTURES
        .iter()
        .copied()
        .filter(|name| name.contains('<'))
        .collect();
    println!("  Sized families: {}", families.join(", "));
    println!("  Example: {}", style("qalloc archs --show ring6").dim());

    Ok(())
}

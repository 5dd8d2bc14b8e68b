//! Swaps command implementation.

use anyhow::{Context, Result};
use console::style;

use qalloc_arch::{ExhaustiveTokenSwapFinder, TokenSwapFinder};

use super::common::{load_arch, parse_placement};

/// Execute the swaps command.
pub fn execute(arch: &str, from: &str, to: &str) -> Result<()> {
    let graph = load_arch(arch)?;
    let from = parse_placement(from)?;
    let to = parse_placement(to)?;

    println!(
        "{} Token swapping on {} ({} qubits)",
        style("→").cyan().bold(),
        style(arch).yellow(),
        graph.size()
    );

    let finder = ExhaustiveTokenSwapFinder::new(&graph)
        .with_context(|| format!("Cannot preprocess '{arch}' for exact token swapping"))?;
    let swaps = finder.find(&from, &to)?;

    println!(
        "{} {} swaps: {:?} -> {:?}",
        style("✓").green().bold(),
        style(swaps.len()).yellow().bold(),
        from,
        to
    );

    let mut tokens = from;
    for (i, swap) in swaps.iter().enumerate() {
        tokens.swap(swap.u as usize, swap.v as usize);
        println!("  {:>3}. swap({}, {})  {:?}", i + 1, swap.u, swap.v, tokens);
    }

    Ok(())
}

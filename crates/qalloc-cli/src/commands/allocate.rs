//! Allocate command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use qalloc_compile::{AllocConfig, Allocation, AllocatorBuilder, AllocatorKind, MappingFinderKind};

use super::common::{Input, load_arch, load_input};

/// Arguments of the allocate command.
#[derive(Args, Debug)]
pub struct AllocateArgs {
    /// Built-in architecture name or architecture file
    #[arg(short, long)]
    pub arch: String,

    /// Input file (JSON program or plain-text dependency list)
    #[arg(short, long)]
    pub input: String,

    /// Allocation strategy (dynprog, greedy, path-guided, direct)
    #[arg(long)]
    pub allocator: Option<String>,

    /// Initial mapping finder for greedy, path-guided and direct (weighted, identity)
    #[arg(long)]
    pub mapping: Option<String>,

    /// Cost of one swap
    #[arg(long)]
    pub swap_cost: Option<u32>,

    /// Cost of a CNOT against an edge
    #[arg(long)]
    pub rev_cost: Option<u32>,

    /// Cost of a bridged CNOT
    #[arg(long)]
    pub lcx_cost: Option<u32>,

    /// YAML configuration file
    #[arg(short, long, env = "QALLOC_CONFIG")]
    pub config: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Skip replay verification
    #[arg(long)]
    pub no_verify: bool,
}

impl AllocateArgs {
    /// Resolve the configuration: file, then environment, then flags.
    pub fn resolve_config(&self) -> Result<AllocConfig> {
        let mut config = match &self.config {
            Some(path) => AllocConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration: {path}"))?,
            None => AllocConfig::default(),
        };
        config.apply_env()?;

        if let Some(allocator) = &self.allocator {
            config.allocator = allocator.parse::<AllocatorKind>()?;
        }
        if let Some(mapping) = &self.mapping {
            config.mapping = mapping.parse::<MappingFinderKind>()?;
        }
        if let Some(swap) = self.swap_cost {
            config.costs.swap = swap;
        }
        if let Some(reverse) = self.rev_cost {
            config.costs.reverse = reverse;
        }
        if let Some(long_cnot) = self.lcx_cost {
            config.costs.long_cnot = long_cnot;
        }
        if self.no_verify {
            config.verify = false;
        }

        config.validate()?;
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}

/// Execute the allocate command.
pub fn execute(args: &AllocateArgs) -> Result<()> {
    let json = match args.format.to_lowercase().as_str() {
        "json" => true,
        "table" => false,
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    };

    let config = args.resolve_config()?;
    let graph = load_arch(&args.arch)?;
    let input = load_input(&args.input)?;

    if !json {
        println!(
            "{} Allocating {} on {} ({} qubits, {} edges) with {}",
            style("→").cyan().bold(),
            style(&args.input).green(),
            style(&args.arch).yellow(),
            graph.size(),
            graph.num_edges(),
            style(config.allocator).bold()
        );
    }

    let allocator = AllocatorBuilder::new().with_config(config).build()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Searching for an allocation...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = match &input {
        Input::Program(program) => allocator.allocate_program(&graph, program),
        Input::Dependencies(deps) => allocator.allocate(&graph, deps),
    };
    spinner.finish_and_clear();
    let allocation = result?;
    info!(
        "Allocated {} with {}: cost {}",
        args.input, allocation.allocator, allocation.solution.cost
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&allocation)?);
    } else {
        print_table(&allocation);
    }

    Ok(())
}

fn print_table(allocation: &Allocation) {
    let solution = &allocation.solution;

    println!("{} Allocation complete", style("✓").green().bold());
    println!("  Initial mapping: {:?}", solution.initial);
    println!(
        "  Cost: {} ({} swaps, {} gates)",
        style(solution.cost).yellow().bold(),
        solution.num_swaps(),
        solution.num_ops()
    );
    if let Some(replayed) = allocation.verified_cost {
        println!("  Verified: replay cost {replayed}");
    }
    if let Some(stats) = &allocation.stats {
        println!(
            "  Swap chains: {} (mean size {:.2}, swap cost {})",
            stats.serial_swaps_count, stats.mean_swaps_size, stats.total_swap_cost
        );
    }
    println!();

    println!("  {:>6}  {}", style("Call").bold(), style("Operations").bold());
    for seq in &solution.op_seqs {
        let ops: Vec<String> = seq.ops.iter().map(ToString::to_string).collect();
        println!("  {:>6}  {}", seq.call_point, ops.join("  "));
    }

    if let Some(schedule) = &allocation.schedule {
        let order: Vec<String> = schedule.iter().map(ToString::to_string).collect();
        println!();
        println!("  Schedule: {}", order.join(" "));
    }
}

//! Qubit Allocation Command-Line Interface
//!
//! The main entry point for the `qalloc` tool.
//!
//! ```text
//! qalloc allocate --arch ibmqx2 --input program.json --allocator greedy
//! qalloc swaps --arch ibmqx4 --from 0,1,2,3,4 --to 4,3,2,1,0
//! qalloc archs --show ibmqx2
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::allocate::AllocateArgs;
use commands::{allocate, archs, swaps, version};

/// qalloc - map logical qubits onto constrained quantum devices
#[derive(Parser)]
#[command(name = "qalloc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate a program or dependency list onto a device
    Allocate(AllocateArgs),

    /// Compute a minimum swap sequence between two placements
    Swaps {
        /// Built-in architecture name or architecture file
        #[arg(short, long)]
        arch: String,

        /// Source placement, comma separated (token on each physical qubit)
        #[arg(long)]
        from: String,

        /// Target placement, comma separated
        #[arg(long)]
        to: String,
    },

    /// List built-in architectures
    Archs {
        /// Print one architecture as a Graphviz digraph
        #[arg(long)]
        show: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Allocate(args) => allocate::execute(&args),

        Commands::Swaps { arch, from, to } => swaps::execute(&arch, &from, &to),

        Commands::Archs { show } => archs::execute(show.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

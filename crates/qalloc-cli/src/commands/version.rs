//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - qubit allocation for constrained devices",
        style("qalloc").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qalloc-arch     Device graphs, shortest paths and token swapping");
    println!("  qalloc-compile  Allocation strategies and replay verification");
    println!("  qalloc-cli      Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}

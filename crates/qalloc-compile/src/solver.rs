//! Strategy traits.

use qalloc_arch::ArchGraph;

use crate::dependency::DependencySet;
use crate::error::AllocResult;
use crate::solution::Solution;

/// A strategy that chooses its own initial mapping.
///
/// Solvers are the top-level unit of allocation: given the device and the
/// ordered dependencies, they return a complete [`Solution`].
pub trait DepSolver: Send + Sync {
    /// Get the name of this solver.
    fn name(&self) -> &str;

    /// Allocate the dependencies onto the device.
    fn solve(&self, graph: &ArchGraph, deps: &DependencySet) -> AllocResult<Solution>;
}

/// A strategy that rewrites dependencies under a given initial mapping.
///
/// Builders may still adjust the initial mapping for qubits that have not
/// been used yet; the returned solution carries the mapping actually used.
pub trait SolBuilder: Send + Sync {
    /// Get the name of this builder.
    fn name(&self) -> &str;

    /// Rewrite the dependencies starting from `initial`.
    fn build(
        &self,
        graph: &ArchGraph,
        deps: &DependencySet,
        initial: &[u32],
    ) -> AllocResult<Solution>;
}

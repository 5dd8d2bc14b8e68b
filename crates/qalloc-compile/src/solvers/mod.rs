//! Allocation strategies.
//!
//! - [`DynprogDepSolver`]: exact minimum cost over all mapping sequences
//! - [`GreedyCktSolver`]: online scheduling over the circuit graph
//! - [`PathGuidedSolBuilder`]: fixed mapping, swap chains and bridges
//! - [`DirectSolBuilder`]: fixed mapping, no swaps

mod direct;
mod dynprog;
mod greedy;
mod path_guided;

pub use direct::DirectSolBuilder;
pub use dynprog::DynprogDepSolver;
pub use greedy::{GreedyCktSolver, GreedyOutcome};
pub use path_guided::{PathGuidedSolBuilder, PathGuidedStats};

use qalloc_arch::{ArchGraph, BfsPathFinder, PathFinder};

use crate::config::CostModel;
use crate::error::{AllocError, AllocResult};
use crate::solution::Operation;

/// The gate realizing `a -> b` under `mapping`, with its cost.
///
/// Native edges give a `Cnot`, reverse edges a `Rev`, qubits two hops apart
/// a `LongCnot` through the BFS midpoint.
pub(crate) fn gate_for(
    graph: &ArchGraph,
    mapping: &[u32],
    a: u32,
    b: u32,
    costs: &CostModel,
) -> AllocResult<(Operation, u32)> {
    let (u, v) = (mapping[a as usize], mapping[b as usize]);
    if graph.has_edge(u, v) {
        return Ok((Operation::Cnot { a, b }, 0));
    }
    if graph.has_edge(v, u) {
        return Ok((Operation::Rev { a, b }, costs.reverse));
    }

    let path = BfsPathFinder.find(graph, u, v)?;
    match path.as_slice() {
        &[_, bridge, _] => Ok((Operation::LongCnot { a, b, bridge }, costs.long_cnot)),
        _ => Err(AllocError::OutOfBridgeReach {
            u,
            v,
            distance: path.len() as u32 - 1,
        }),
    }
}

/// `Cnot` or `Rev` for two logical qubits that must already be adjacent.
pub(crate) fn adjacent_gate(
    graph: &ArchGraph,
    mapping: &[u32],
    a: u32,
    b: u32,
) -> AllocResult<Operation> {
    let (u, v) = (mapping[a as usize], mapping[b as usize]);
    if graph.has_edge(u, v) {
        Ok(Operation::Cnot { a, b })
    } else if graph.has_edge(v, u) {
        Ok(Operation::Rev { a, b })
    } else {
        Err(AllocError::NotAdjacent { u, v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_for() {
        let graph = ArchGraph::ibmqx2();
        let costs = CostModel::default();
        let identity = [0, 1, 2, 3, 4];

        assert_eq!(
            gate_for(&graph, &identity, 0, 1, &costs).unwrap(),
            (Operation::Cnot { a: 0, b: 1 }, 0)
        );
        assert_eq!(
            gate_for(&graph, &identity, 2, 1, &costs).unwrap(),
            (Operation::Rev { a: 2, b: 1 }, 4)
        );
        assert_eq!(
            gate_for(&graph, &identity, 4, 1, &costs).unwrap(),
            (
                Operation::LongCnot {
                    a: 4,
                    b: 1,
                    bridge: 2
                },
                10
            )
        );
    }

    #[test]
    fn test_gate_out_of_reach() {
        let graph = ArchGraph::linear(4);
        let result = gate_for(&graph, &[0, 1, 2, 3], 0, 3, &CostModel::default());
        assert!(matches!(
            result,
            Err(AllocError::OutOfBridgeReach { distance: 3, .. })
        ));
        assert!(matches!(
            adjacent_gate(&graph, &[0, 1, 2, 3], 0, 2),
            Err(AllocError::NotAdjacent { u: 0, v: 2 })
        ));
    }
}

//! Replay checker for allocation results.

use qalloc_arch::ArchGraph;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::{CostModel, narrow_cost};
use crate::dependency::{CallPoint, Dep, DependencySet};
use crate::error::{AllocError, AllocResult};
use crate::layout::{Layout, check_mapping};
use crate::solution::{Operation, Solution};

/// Replay `solution` on `graph` and check that every gate is executable.
///
/// Sequences are replayed in `op_seqs` order starting from the initial
/// mapping. Each swap must join adjacent physical qubits, each `Cnot` must
/// run along an edge, each `Rev` against one, and each `LongCnot` bridge
/// must be adjacent to both operands. The last gate of every sequence must
/// name its dependency's pair, and every dependency must be covered exactly
/// once.
///
/// Returns the cost of the replayed gates under `costs`.
pub fn verify_solution(
    graph: &ArchGraph,
    deps: &DependencySet,
    solution: &Solution,
    costs: &CostModel,
) -> AllocResult<u32> {
    let n = graph.size();
    check_mapping(&solution.initial, n)?;

    let mut pending: FxHashMap<CallPoint, Dep> = FxHashMap::default();
    for dependency in deps {
        pending.insert(dependency.call_point, dependency.dep()?);
    }
    if solution.op_seqs.len() != deps.len() {
        return Err(AllocError::Verification {
            call_point: solution.op_seqs.first().map_or(0, |s| s.call_point),
            reason: format!(
                "{} operation sequences for {} dependencies",
                solution.op_seqs.len(),
                deps.len()
            ),
        });
    }

    let mut layout = Layout::from_mapping(solution.initial.clone())?;
    let mut cost = 0u64;

    for seq in &solution.op_seqs {
        let call_point = seq.call_point;
        let fail = |reason: String| AllocError::Verification { call_point, reason };

        let dep = pending
            .remove(&call_point)
            .ok_or_else(|| fail("unknown or repeated call point".into()))?;

        for op in &seq.ops {
            let (a, b) = op.operands();
            if a >= n || b >= n {
                return Err(fail(format!("{op} names a qubit outside 0..{n}")));
            }
            let (u, v) = (layout.physical(a), layout.physical(b));

            match *op {
                Operation::Swap { .. } => {
                    if !graph.is_adjacent(u, v) {
                        return Err(fail(format!("{op} on non-adjacent qubits {u} and {v}")));
                    }
                    layout.swap_logical(a, b);
                    cost += u64::from(costs.swap);
                }
                Operation::Cnot { .. } => {
                    if !graph.has_edge(u, v) {
                        return Err(fail(format!("{op} on ({u}, {v}) is not a native edge")));
                    }
                }
                Operation::Rev { .. } => {
                    if !graph.is_reverse_edge(u, v) {
                        return Err(fail(format!("{op} on ({u}, {v}) is not a reverse edge")));
                    }
                    cost += u64::from(costs.reverse);
                }
                Operation::LongCnot { bridge, .. } => {
                    if !graph.is_adjacent(u, bridge) || !graph.is_adjacent(bridge, v) {
                        return Err(fail(format!("{op} bridge is not adjacent to ({u}, {v})")));
                    }
                    cost += u64::from(costs.long_cnot);
                }
            }
        }

        match seq.ops.last() {
            Some(op) if !op.is_swap() && op.operands() == (dep.from, dep.to) => {}
            Some(op) => {
                return Err(fail(format!("final gate {op} does not realize {dep}")));
            }
            None => return Err(fail(format!("no gate for {dep}"))),
        }
    }

    if let Some(&call_point) = pending.keys().min() {
        return Err(AllocError::Verification {
            call_point,
            reason: "dependency not covered".into(),
        });
    }

    debug!("Solution verified, replay cost {}", cost);
    narrow_cost(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::OpSequence;

    fn graph() -> ArchGraph {
        ArchGraph::linear(3)
    }

    fn seq(call_point: CallPoint, ops: Vec<Operation>) -> OpSequence {
        OpSequence { call_point, ops }
    }

    #[test]
    fn test_valid_replay() {
        let deps = DependencySet::from_pairs([(0, 1), (0, 2)]);
        let solution = Solution {
            initial: vec![0, 1, 2],
            cost: 7,
            op_seqs: vec![
                seq(0, vec![Operation::Cnot { a: 0, b: 1 }]),
                seq(
                    1,
                    vec![Operation::Swap { a: 1, b: 2 }, Operation::Cnot { a: 0, b: 2 }],
                ),
            ],
        };
        let cost = verify_solution(&graph(), &deps, &solution, &CostModel::default()).unwrap();
        assert_eq!(cost, 7);
    }

    #[test]
    fn test_detects_wrong_direction() {
        let deps = DependencySet::from_pairs([(1, 0)]);
        let solution = Solution {
            initial: vec![0, 1, 2],
            cost: 0,
            op_seqs: vec![seq(0, vec![Operation::Cnot { a: 1, b: 0 }])],
        };
        assert!(matches!(
            verify_solution(&graph(), &deps, &solution, &CostModel::default()),
            Err(AllocError::Verification { call_point: 0, .. })
        ));
    }

    #[test]
    fn test_detects_bad_swap_and_bridge() {
        let deps = DependencySet::from_pairs([(0, 2)]);
        let bad_swap = Solution {
            initial: vec![0, 1, 2],
            cost: 0,
            op_seqs: vec![seq(
                0,
                vec![Operation::Swap { a: 0, b: 2 }, Operation::Cnot { a: 0, b: 2 }],
            )],
        };
        assert!(verify_solution(&graph(), &deps, &bad_swap, &CostModel::default()).is_err());

        let bridged = Solution {
            initial: vec![0, 1, 2],
            cost: 10,
            op_seqs: vec![seq(
                0,
                vec![Operation::LongCnot {
                    a: 0,
                    b: 2,
                    bridge: 1,
                }],
            )],
        };
        assert_eq!(
            verify_solution(&graph(), &deps, &bridged, &CostModel::default()).unwrap(),
            10
        );
    }

    #[test]
    fn test_detects_missing_and_mismatched() {
        let deps = DependencySet::from_pairs([(0, 1), (1, 2)]);
        let short = Solution {
            initial: vec![0, 1, 2],
            cost: 0,
            op_seqs: vec![seq(0, vec![Operation::Cnot { a: 0, b: 1 }])],
        };
        assert!(verify_solution(&graph(), &deps, &short, &CostModel::default()).is_err());

        let wrong_pair = Solution {
            initial: vec![0, 1, 2],
            cost: 0,
            op_seqs: vec![
                seq(0, vec![Operation::Cnot { a: 0, b: 1 }]),
                seq(1, vec![Operation::Cnot { a: 0, b: 1 }]),
            ],
        };
        assert!(matches!(
            verify_solution(&graph(), &deps, &wrong_pair, &CostModel::default()),
            Err(AllocError::Verification { call_point: 1, .. })
        ));
    }
}

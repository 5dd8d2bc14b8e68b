//! Allocation without swaps.

use qalloc_arch::ArchGraph;
use tracing::{info, instrument};

use crate::config::{CostModel, narrow_cost};
use crate::dependency::DependencySet;
use crate::error::AllocResult;
use crate::layout::check_mapping;
use crate::solution::{OpSequence, Solution};
use crate::solver::SolBuilder;

use super::gate_for;

/// Keeps the initial mapping for the whole run.
///
/// Every dependency becomes a `Cnot`, a `Rev` or a `LongCnot` through the
/// midpoint of a distance-2 path. Pairs further apart are rejected with
/// [`AllocError::OutOfBridgeReach`](crate::AllocError::OutOfBridgeReach).
#[derive(Debug, Clone, Default)]
pub struct DirectSolBuilder {
    costs: CostModel,
}

impl DirectSolBuilder {
    /// Create a builder with the given costs.
    pub fn new(costs: CostModel) -> Self {
        Self { costs }
    }
}

impl SolBuilder for DirectSolBuilder {
    fn name(&self) -> &str {
        "direct"
    }

    #[instrument(skip(self, graph, deps, initial), fields(deps = deps.len()))]
    fn build(
        &self,
        graph: &ArchGraph,
        deps: &DependencySet,
        initial: &[u32],
    ) -> AllocResult<Solution> {
        check_mapping(initial, graph.size())?;
        deps.validate(graph.size())?;

        let mut solution = Solution::new(initial.to_vec());
        let mut total = 0u64;
        for dependency in deps {
            let dep = dependency.dep()?;
            let (gate, cost) = gate_for(graph, initial, dep.from, dep.to, &self.costs)?;
            total += u64::from(cost);
            solution.op_seqs.push(OpSequence {
                call_point: dependency.call_point,
                ops: vec![gate],
            });
        }

        solution.cost = narrow_cost(total)?;
        info!("Direct allocation finished: cost {}", solution.cost);
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocError;
    use crate::solution::Operation;

    #[test]
    fn test_direct_gates() {
        let graph = ArchGraph::ibmqx2();
        let deps = DependencySet::from_pairs([(0, 1), (2, 1), (4, 1)]);
        let solution = DirectSolBuilder::new(CostModel::default())
            .build(&graph, &deps, &[0, 1, 2, 3, 4])
            .unwrap();

        assert_eq!(solution.cost, 14);
        assert_eq!(solution.num_swaps(), 0);
        assert_eq!(
            solution.op_seqs[2].ops,
            vec![Operation::LongCnot {
                a: 4,
                b: 1,
                bridge: 2
            }]
        );
    }

    #[test]
    fn test_out_of_reach() {
        let graph = ArchGraph::linear(5);
        let deps = DependencySet::from_pairs([(0, 4)]);
        let result =
            DirectSolBuilder::new(CostModel::default()).build(&graph, &deps, &[0, 1, 2, 3, 4]);
        assert!(matches!(
            result,
            Err(AllocError::OutOfBridgeReach { distance: 4, .. })
        ));
    }

    #[test]
    fn test_cost_overflow_is_an_error() {
        let costs = CostModel {
            long_cnot: u32::MAX,
            ..Default::default()
        };
        let deps = DependencySet::from_pairs([(0, 2), (2, 0)]);
        let result = DirectSolBuilder::new(costs).build(&ArchGraph::linear(3), &deps, &[0, 1, 2]);
        assert!(matches!(
            result,
            Err(AllocError::CostOverflow(total)) if total == 2 * u64::from(u32::MAX)
        ));
    }

    #[test]
    fn test_rejects_bad_mapping() {
        let deps = DependencySet::from_pairs([(0, 1)]);
        let result = DirectSolBuilder::default().build(&ArchGraph::linear(2), &deps, &[0, 0]);
        assert!(matches!(result, Err(AllocError::InvalidMapping { .. })));
    }
}

//! Exact allocation by dynamic programming over mappings.
//!
//! `V[p][i]` is the cheapest way to have executed the first `i` dependencies
//! and be in mapping `p`. Layer 0 is free for every mapping. A mapping `t` can
//! execute dependency `(a, b)` when `(t[a], t[b])` is a native edge, a
//! reverse edge or a distance-2 pair; then
//!
//! ```text
//! V[t][i] = min_s V[s][i-1] + swaps(s, t) * swap_cost + gate_cost
//! ```
//!
//! where `swaps` is the exact token swapping distance. The run is
//! `O(deps * N!^2)`, so it is only practical for small devices.

use std::sync::Arc;

use qalloc_arch::{
    ArchError, ArchGraph, ExhaustiveTokenSwapFinder, TokenSwapFinder, distance_matrix,
};
use tracing::{debug, info, instrument};

use crate::config::{CostModel, narrow_cost};
use crate::dependency::DependencySet;
use crate::error::{AllocError, AllocResult};
use crate::layout::{assignment_of, identity};
use crate::solution::{OpSequence, Operation, Solution};
use crate::solver::DepSolver;

use super::gate_for;

const NO_PARENT: u32 = u32::MAX;

/// Minimum-cost allocation over every sequence of mappings.
#[derive(Debug, Clone, Default)]
pub struct DynprogDepSolver {
    costs: CostModel,
    finder: Option<Arc<ExhaustiveTokenSwapFinder>>,
}

impl DynprogDepSolver {
    /// Create a solver with the given costs.
    pub fn new(costs: CostModel) -> Self {
        Self {
            costs,
            finder: None,
        }
    }

    /// Reuse an already preprocessed token swap finder.
    ///
    /// The finder is only used when its size matches the device; otherwise
    /// a fresh one is built for the run.
    #[must_use]
    pub fn with_finder(mut self, finder: Arc<ExhaustiveTokenSwapFinder>) -> Self {
        self.finder = Some(finder);
        self
    }
}

impl DepSolver for DynprogDepSolver {
    fn name(&self) -> &str {
        "dynprog"
    }

    #[instrument(skip(self, graph, deps), fields(deps = deps.len()))]
    fn solve(&self, graph: &ArchGraph, deps: &DependencySet) -> AllocResult<Solution> {
        let n = graph.size();
        deps.validate(n)?;
        if deps.is_empty() {
            return Ok(Solution::new(identity(n)));
        }

        let owned;
        let finder = match &self.finder {
            Some(finder) if finder.size() == n => finder.as_ref(),
            _ => {
                owned = ExhaustiveTokenSwapFinder::new(graph)?;
                &owned
            }
        };

        let perms: Vec<&[u32]> = finder.permutations().collect();
        let assigns: Vec<Vec<u32>> = perms.iter().map(|p| assignment_of(p)).collect();
        let dist = distance_matrix(graph);
        let count = perms.len();

        info!(
            "Dynamic programming over {} mappings and {} dependencies",
            count,
            deps.len()
        );

        let mut values: Vec<Option<u64>> = vec![Some(0); count];
        let mut parents: Vec<Vec<u32>> = Vec::with_capacity(deps.len());

        for (layer, dependency) in deps.iter().enumerate() {
            let dep = dependency.dep()?;
            let mut next: Vec<Option<u64>> = vec![None; count];
            let mut parent = vec![NO_PARENT; count];

            for (tgt, perm) in perms.iter().enumerate() {
                let (u, v) = (perm[dep.from as usize], perm[dep.to as usize]);
                let edge_cost = if graph.has_edge(u, v) {
                    0
                } else if graph.has_edge(v, u) {
                    self.costs.reverse
                } else if dist[u as usize][v as usize] == 2 {
                    self.costs.long_cnot
                } else {
                    continue;
                };

                let mut best: Option<(u64, usize)> = None;
                for (src, value) in values.iter().enumerate() {
                    let Some(value) = *value else { continue };
                    let swap_cost = if src == tgt {
                        0
                    } else {
                        match finder.swap_count(&assigns[src], &assigns[tgt]) {
                            Ok(swaps) => u64::from(swaps) * u64::from(self.costs.swap),
                            Err(ArchError::PermutationUnreachable { .. }) => continue,
                            Err(e) => return Err(e.into()),
                        }
                    };
                    let total = value
                        .saturating_add(swap_cost)
                        .saturating_add(u64::from(edge_cost));
                    if best.is_none_or(|(cost, _)| total < cost) {
                        best = Some((total, src));
                    }
                }

                if let Some((cost, src)) = best {
                    next[tgt] = Some(cost);
                    parent[tgt] = src as u32;
                }
            }

            if next.iter().all(Option::is_none) {
                debug!("No mapping satisfies dependency {}", layer);
                return Err(AllocError::NoSolution(deps.len()));
            }
            values = next;
            parents.push(parent);
        }

        // Lowest index wins ties.
        let (last, cost) = values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .min_by_key(|&(i, v)| (v, i))
            .ok_or(AllocError::NoSolution(deps.len()))?;

        let mut chain = vec![last; deps.len()];
        for layer in (1..deps.len()).rev() {
            chain[layer - 1] = parents[layer][chain[layer]] as usize;
        }

        let mut solution = Solution::new(perms[chain[0]].to_vec());
        solution.cost = narrow_cost(cost)?;

        for (i, dependency) in deps.iter().enumerate() {
            let dep = dependency.dep()?;
            let mut seq = OpSequence::new(dependency.call_point);

            if i > 0 && chain[i] != chain[i - 1] {
                let (prev, cur) = (chain[i - 1], chain[i]);
                let mut assignment = assigns[prev].clone();
                for swap in finder.find(&assigns[prev], &assigns[cur])? {
                    let (u, v) = if graph.is_reverse_edge(swap.u, swap.v) {
                        (swap.v, swap.u)
                    } else {
                        (swap.u, swap.v)
                    };
                    seq.ops.push(Operation::Swap {
                        a: assignment[u as usize],
                        b: assignment[v as usize],
                    });
                    assignment.swap(u as usize, v as usize);
                }
            }

            let (gate, _) = gate_for(graph, perms[chain[i]], dep.from, dep.to, &self.costs)?;
            seq.ops.push(gate);
            solution.op_seqs.push(seq);
        }

        info!(
            "Dynamic programming finished: cost {}, {} swaps",
            solution.cost,
            solution.num_swaps()
        );
        Ok(solution)
    }
}

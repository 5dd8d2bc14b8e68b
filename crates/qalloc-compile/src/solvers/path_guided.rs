//! Path-guided allocation under a fixed initial mapping.

use qalloc_arch::{ArchGraph, BfsPathFinder, PathFinder};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{CostModel, narrow_cost};
use crate::dependency::{Dep, DependencySet};
use crate::error::{AllocError, AllocResult};
use crate::layout::{Layout, check_mapping};
use crate::solution::{OpSequence, Operation, Solution};
use crate::solver::SolBuilder;

/// Swap statistics of a path-guided run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathGuidedStats {
    /// Cost charged for swaps, chains and flips together.
    pub total_swap_cost: u32,
    /// Number of charged swap chains.
    pub serial_swaps_count: u32,
    /// Mean length of the charged swap chains.
    pub mean_swaps_size: f64,
}

/// Rewrites dependencies in program order along shortest paths.
///
/// For each dependency `(a, b)`:
///
/// 1. A pair two hops apart that will not be seen again, and whose first hop
///    runs against the edge, is bridged with a `LongCnot`.
/// 2. Otherwise `b` is swapped along the path until it sits next to `a`. If
///    no qubit on the path has been used yet, the chain is folded into the
///    initial mapping instead of being emitted.
/// 3. A reversed pair seen only once gets a `Rev`. A reversed pair that will
///    be seen again is flipped once so later occurrences are native.
#[derive(Debug, Clone, Default)]
pub struct PathGuidedSolBuilder {
    costs: CostModel,
}

impl PathGuidedSolBuilder {
    /// Create a builder with the given costs.
    pub fn new(costs: CostModel) -> Self {
        Self { costs }
    }

    /// Build a solution and report swap statistics.
    #[instrument(skip(self, graph, deps, initial), fields(deps = deps.len()))]
    pub fn build_with_stats(
        &self,
        graph: &ArchGraph,
        deps: &DependencySet,
        initial: &[u32],
    ) -> AllocResult<(Solution, PathGuidedStats)> {
        let n = graph.size();
        check_mapping(initial, n)?;
        deps.validate(n)?;

        let mut remaining: FxHashMap<Dep, u32> = FxHashMap::default();
        for dependency in deps {
            *remaining.entry(dependency.dep()?).or_default() += 1;
        }

        let mut layout = Layout::from_mapping(initial.to_vec())?;
        let mut solution = Solution::new(initial.to_vec());
        let mut frozen = vec![false; n as usize];
        let mut stats = PathGuidedStats::default();
        let mut chain_swaps = 0u32;
        let mut total = 0u64;
        let mut swap_total = 0u64;

        for dependency in deps {
            let dep = dependency.dep()?;
            let (a, b) = (dep.from, dep.to);
            let seen_again = remaining.get(&dep).copied().unwrap_or(0) > 1;
            let mut seq = OpSequence::new(dependency.call_point);

            let path = BfsPathFinder.find(graph, layout.physical(a), layout.physical(b))?;

            if path.len() == 3 && !seen_again && graph.is_reverse_edge(path[0], path[1]) {
                for &p in &path {
                    frozen[layout.logical(p) as usize] = true;
                }
                total += u64::from(self.costs.long_cnot);
                seq.ops.push(Operation::LongCnot {
                    a,
                    b,
                    bridge: path[1],
                });
            } else {
                if path.len() > 2 {
                    let untouched = path.iter().all(|&p| !frozen[layout.logical(p) as usize]);
                    for &p in &path {
                        frozen[layout.logical(p) as usize] = true;
                    }

                    let mut chain = Vec::with_capacity(path.len() - 2);
                    for k in (1..path.len() - 1).rev() {
                        let (mut pu, mut pv) = (path[k], path[k + 1]);
                        if graph.is_reverse_edge(pu, pv) {
                            std::mem::swap(&mut pu, &mut pv);
                        }
                        chain.push(Operation::Swap {
                            a: layout.logical(pu),
                            b: layout.logical(pv),
                        });
                        layout.swap_physical(pu, pv);
                    }

                    if untouched {
                        for &p in &path {
                            solution.initial[layout.logical(p) as usize] = p;
                        }
                        debug!(
                            "Folded {} swaps for call point {} into the initial mapping",
                            chain.len(),
                            dependency.call_point
                        );
                    } else {
                        let cost = u64::from(self.costs.swap) * chain.len() as u64;
                        total += cost;
                        swap_total += cost;
                        stats.serial_swaps_count += 1;
                        chain_swaps += chain.len() as u32;
                        seq.ops.extend(chain);
                    }
                }

                let (u, v) = (layout.physical(a), layout.physical(b));
                if graph.has_edge(u, v) {
                    seq.ops.push(Operation::Cnot { a, b });
                } else if graph.has_edge(v, u) {
                    if seen_again {
                        if frozen[a as usize] || frozen[b as usize] {
                            total += u64::from(self.costs.swap);
                            swap_total += u64::from(self.costs.swap);
                            seq.ops.push(Operation::Swap { a, b });
                        } else {
                            solution.initial.swap(a as usize, b as usize);
                        }
                        layout.swap_logical(a, b);
                        seq.ops.push(Operation::Cnot { a, b });
                    } else {
                        total += u64::from(self.costs.reverse);
                        seq.ops.push(Operation::Rev { a, b });
                    }
                } else {
                    return Err(AllocError::NotAdjacent { u, v });
                }
            }

            frozen[a as usize] = true;
            frozen[b as usize] = true;
            if let Some(count) = remaining.get_mut(&dep) {
                *count -= 1;
            }
            solution.op_seqs.push(seq);
        }

        solution.cost = narrow_cost(total)?;
        stats.total_swap_cost = narrow_cost(swap_total)?;
        if stats.serial_swaps_count > 0 {
            stats.mean_swaps_size = f64::from(chain_swaps) / f64::from(stats.serial_swaps_count);
        }
        info!(
            "Path-guided allocation finished: cost {}, swap cost {}, {} swap chains (mean size {:.2})",
            solution.cost, stats.total_swap_cost, stats.serial_swaps_count, stats.mean_swaps_size
        );

        Ok((solution, stats))
    }
}

impl SolBuilder for PathGuidedSolBuilder {
    fn name(&self) -> &str {
        "path-guided"
    }

    fn build(
        &self,
        graph: &ArchGraph,
        deps: &DependencySet,
        initial: &[u32],
    ) -> AllocResult<Solution> {
        self.build_with_stats(graph, deps, initial)
            .map(|(solution, _)| solution)
    }
}

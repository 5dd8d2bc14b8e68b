//! Allocator driver combining a strategy, a mapping finder and verification.

use std::sync::Arc;

use qalloc_arch::{ArchGraph, ExhaustiveTokenSwapFinder};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::circuit::{CircuitGraph, Program};
use crate::config::{AllocConfig, AllocatorKind, CostModel, MappingFinderKind};
use crate::dependency::{CallPoint, DependencySet};
use crate::error::AllocResult;
use crate::solution::Solution;
use crate::solver::{DepSolver, SolBuilder};
use crate::solvers::{
    DirectSolBuilder, DynprogDepSolver, GreedyCktSolver, PathGuidedSolBuilder, PathGuidedStats,
};
use crate::verify::verify_solution;

/// Everything an allocation run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    /// Strategy that produced the solution.
    pub allocator: AllocatorKind,
    pub solution: Solution,
    /// Commit order of all statements (greedy strategy only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<CallPoint>>,
    /// Swap statistics (path-guided strategy only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PathGuidedStats>,
    /// Replayed cost, when verification ran.
    pub verified_cost: Option<u32>,
}

/// Runs the configured allocation strategy.
pub struct Allocator {
    config: AllocConfig,
    token_swap: Option<Arc<ExhaustiveTokenSwapFinder>>,
}

impl Allocator {
    /// Create an allocator from a configuration.
    pub fn new(config: AllocConfig) -> AllocResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            token_swap: None,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    /// Allocate an ordered dependency set.
    #[instrument(skip(self, graph, deps))]
    pub fn allocate(&self, graph: &ArchGraph, deps: &DependencySet) -> AllocResult<Allocation> {
        info!(
            "Allocating {} dependencies on {} qubits with {}",
            deps.len(),
            graph.size(),
            self.config.allocator
        );
        deps.validate(graph.size())?;

        let costs = self.config.costs;
        let mut allocation = Allocation {
            allocator: self.config.allocator,
            solution: Solution::new(Vec::new()),
            schedule: None,
            stats: None,
            verified_cost: None,
        };

        match self.config.allocator {
            AllocatorKind::Dynprog => {
                allocation.solution = self.dynprog(costs).solve(graph, deps)?;
            }
            AllocatorKind::Greedy => {
                let circuit = CircuitGraph::from_dependencies(deps, graph.size());
                let outcome = self.greedy(costs).solve_circuit(graph, &circuit, deps)?;
                allocation.solution = outcome.solution;
                allocation.schedule = Some(outcome.schedule);
            }
            AllocatorKind::PathGuided => {
                let initial = self.config.mapping.finder().find(graph, deps)?;
                let (solution, stats) =
                    PathGuidedSolBuilder::new(costs).build_with_stats(graph, deps, &initial)?;
                allocation.solution = solution;
                allocation.stats = Some(stats);
            }
            AllocatorKind::Direct => {
                let initial = self.config.mapping.finder().find(graph, deps)?;
                allocation.solution = DirectSolBuilder::new(costs).build(graph, deps, &initial)?;
            }
        }

        self.finish(graph, deps, allocation)
    }

    /// Allocate a program.
    ///
    /// The greedy strategy schedules the program's full circuit graph, so
    /// single-qubit statements and barriers take part in its ordering. The
    /// other strategies only see the extracted dependencies.
    pub fn allocate_program(
        &self,
        graph: &ArchGraph,
        program: &Program,
    ) -> AllocResult<Allocation> {
        program.validate()?;
        let deps = program.to_dependencies();

        if self.config.allocator != AllocatorKind::Greedy {
            return self.allocate(graph, &deps);
        }

        info!(
            "Allocating program with {} statements on {} qubits with greedy",
            program.len(),
            graph.size()
        );
        let circuit = program.circuit_graph();
        let outcome = self
            .greedy(self.config.costs)
            .solve_circuit(graph, &circuit, &deps)?;
        let allocation = Allocation {
            allocator: AllocatorKind::Greedy,
            solution: outcome.solution,
            schedule: Some(outcome.schedule),
            stats: None,
            verified_cost: None,
        };
        self.finish(graph, &deps, allocation)
    }

    fn dynprog(&self, costs: CostModel) -> DynprogDepSolver {
        let solver = DynprogDepSolver::new(costs);
        match &self.token_swap {
            Some(finder) => solver.with_finder(Arc::clone(finder)),
            None => solver,
        }
    }

    fn greedy(&self, costs: CostModel) -> GreedyCktSolver {
        GreedyCktSolver::new(costs).with_mapping_finder(self.config.mapping.finder())
    }

    fn finish(
        &self,
        graph: &ArchGraph,
        deps: &DependencySet,
        mut allocation: Allocation,
    ) -> AllocResult<Allocation> {
        if self.config.verify {
            let replayed = verify_solution(graph, deps, &allocation.solution, &self.config.costs)?;
            if replayed != allocation.solution.cost {
                warn!(
                    "Replayed cost {} differs from reported cost {}",
                    replayed, allocation.solution.cost
                );
            } else {
                debug!("Replayed cost matches reported cost {}", replayed);
            }
            allocation.verified_cost = Some(replayed);
        }

        info!(
            "Allocation completed: cost {}, {} swaps, {} gates",
            allocation.solution.cost,
            allocation.solution.num_swaps(),
            allocation.solution.num_ops()
        );
        Ok(allocation)
    }
}

/// Builder for allocators.
pub struct AllocatorBuilder {
    config: AllocConfig,
    token_swap: Option<Arc<ExhaustiveTokenSwapFinder>>,
}

impl AllocatorBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: AllocConfig::default(),
            token_swap: None,
        }
    }

    /// Start from an existing configuration.
    #[must_use]
    pub fn with_config(mut self, config: AllocConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the allocation strategy.
    #[must_use]
    pub fn with_allocator(mut self, allocator: AllocatorKind) -> Self {
        self.config.allocator = allocator;
        self
    }

    /// Set the gate costs.
    #[must_use]
    pub fn with_costs(mut self, costs: CostModel) -> Self {
        self.config.costs = costs;
        self
    }

    /// Set the initial mapping finder.
    #[must_use]
    pub fn with_mapping(mut self, mapping: MappingFinderKind) -> Self {
        self.config.mapping = mapping;
        self
    }

    /// Enable or disable replay verification.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.config.verify = verify;
        self
    }

    /// Share a preprocessed token swap finder with the optimal strategy.
    #[must_use]
    pub fn with_token_swap_finder(mut self, finder: Arc<ExhaustiveTokenSwapFinder>) -> Self {
        self.token_swap = Some(finder);
        self
    }

    /// Build the allocator.
    pub fn build(self) -> AllocResult<Allocator> {
        let mut allocator = Allocator::new(self.config)?;
        allocator.token_swap = self.token_swap;
        Ok(allocator)
    }
}

impl Default for AllocatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Greedy allocation over the circuit graph.
//!
//! The solver walks the circuit wire by wire. Statements touching at most one
//! wire are emitted as soon as they reach the front. A statement touching
//! several wires becomes ready once it is at the front of all of them. Among
//! the ready two-qubit statements, the one with the cheapest local fix is
//! committed:
//!
//! - native edge: free
//! - reverse edge: reverse cost
//! - freeze-swap: move a qubit that has not been used yet next to its
//!   partner by rewriting the initial mapping (free, or reverse cost when the
//!   resulting direction is reversed)
//! - swap chain along a shortest path, ending on a native edge if possible
//!
//! Qubits become frozen once they take part in a gate or a swap; frozen
//! qubits keep their initial position.

use std::collections::BTreeSet;
use std::sync::Arc;

use qalloc_arch::{ArchGraph, BfsPathFinder, PathFinder};
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use crate::circuit::{CircuitGraph, Cursor};
use crate::config::{CostModel, narrow_cost};
use crate::dependency::{CallPoint, Dep, DependencySet};
use crate::error::{AllocError, AllocResult};
use crate::layout::{Layout, Mapping, check_mapping};
use crate::mapping::{MappingFinder, WeightedMappingFinder};
use crate::solution::{OpSequence, Operation, Solution};
use crate::solver::DepSolver;

use super::adjacent_gate;

/// Greedy allocation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreedyOutcome {
    /// The allocation; `op_seqs` are in commit order.
    pub solution: Solution,
    /// Call points of every statement, in the order they were committed.
    pub schedule: Vec<CallPoint>,
}

/// Greedy, online allocation one ready statement at a time.
#[derive(Clone)]
pub struct GreedyCktSolver {
    costs: CostModel,
    mapping_finder: Arc<dyn MappingFinder>,
}

impl GreedyCktSolver {
    /// Create a solver using the weighted initial mapping.
    pub fn new(costs: CostModel) -> Self {
        Self {
            costs,
            mapping_finder: Arc::new(WeightedMappingFinder),
        }
    }

    /// Use another initial mapping finder.
    #[must_use]
    pub fn with_mapping_finder(mut self, finder: Arc<dyn MappingFinder>) -> Self {
        self.mapping_finder = finder;
        self
    }

    /// Allocate a circuit whose two-qubit statements are listed in `deps`.
    ///
    /// Dependencies are matched to statements by call point. Statements
    /// without a dependency are scheduled at no cost.
    #[instrument(skip(self, graph, circuit, deps), fields(statements = circuit.len()))]
    pub fn solve_circuit(
        &self,
        graph: &ArchGraph,
        circuit: &CircuitGraph,
        deps: &DependencySet,
    ) -> AllocResult<GreedyOutcome> {
        let n = graph.size();
        if circuit.num_qubits() > n {
            return Err(AllocError::QubitOutOfRange {
                qubit: circuit.num_qubits() - 1,
                size: n,
            });
        }
        deps.validate(n)?;

        let mut dep_of: FxHashMap<CallPoint, Dep> = FxHashMap::default();
        for dependency in deps {
            dep_of.insert(dependency.call_point, dependency.dep()?);
        }

        let initial = self.mapping_finder.find(graph, deps)?;
        check_mapping(&initial, n)?;
        debug!(
            "Greedy initial mapping from {}: {:?}",
            self.mapping_finder.name(),
            initial
        );

        let mut state = GreedyState::new(initial)?;
        let mut solution_cost = 0u64;
        let mut op_seqs = Vec::with_capacity(deps.len());

        let total = circuit.len();
        let mut frontier = Frontier::new(circuit);

        while frontier.schedule.len() < total {
            // Drain statements on at most one wire.
            let drained = (0..circuit.num_wires())
                .filter_map(|w| frontier.cursor.front(w))
                .find(|&i| circuit.arity(i) <= 1);
            if let Some(index) = drained {
                frontier.commit(circuit, index);
                continue;
            }

            frontier.mark(circuit);
            if frontier.ready.is_empty() {
                return Err(AllocError::NoReadyStatement {
                    remaining: total - frontier.schedule.len(),
                });
            }

            // Statements without a dependency cost nothing.
            let free: Vec<usize> = frontier
                .ready
                .iter()
                .copied()
                .filter(|&i| !dep_of.contains_key(&circuit.node(i).call_point))
                .collect();
            if !free.is_empty() {
                for index in free {
                    for &q in &circuit.node(index).qubits {
                        state.freeze(q);
                    }
                    frontier.commit(circuit, index);
                }
                continue;
            }

            let mut best: Option<(usize, Dep, Candidate)> = None;
            for &index in &frontier.ready {
                let dep = dep_of[&circuit.node(index).call_point];
                let candidate = state.evaluate(graph, dep, &self.costs)?;
                if best
                    .as_ref()
                    .is_none_or(|(_, _, b)| candidate.cost < b.cost)
                {
                    best = Some((index, dep, candidate));
                }
            }
            let Some((index, dep, candidate)) = best else {
                continue;
            };

            let call_point = circuit.node(index).call_point;
            debug!(
                "Committing call point {} ({} -> {}) with {:?}, cost {}",
                call_point, dep.from, dep.to, candidate.fix, candidate.cost
            );

            solution_cost += candidate.cost;
            let ops = state.apply(graph, dep, candidate.fix)?;
            op_seqs.push(OpSequence { call_point, ops });
            frontier.commit(circuit, index);
        }

        let solution = Solution {
            initial: state.initial,
            cost: narrow_cost(solution_cost)?,
            op_seqs,
        };
        info!(
            "Greedy allocation finished: cost {}, {} swaps",
            solution.cost,
            solution.num_swaps()
        );

        Ok(GreedyOutcome {
            solution,
            schedule: frontier.schedule,
        })
    }
}

impl DepSolver for GreedyCktSolver {
    fn name(&self) -> &str {
        "greedy"
    }

    fn solve(&self, graph: &ArchGraph, deps: &DependencySet) -> AllocResult<Solution> {
        let circuit = CircuitGraph::from_dependencies(deps, graph.size());
        self.solve_circuit(graph, &circuit, deps)
            .map(|outcome| outcome.solution)
    }
}

/// Wire fronts and the statements waiting on them.
struct Frontier<'a> {
    cursor: Cursor<'a>,
    /// Wires whose front statement has been counted.
    counted: Vec<bool>,
    /// Wires each statement is still waiting for.
    waiting: Vec<usize>,
    /// Statements at the front of all their wires, in program order.
    ready: BTreeSet<usize>,
    schedule: Vec<CallPoint>,
}

impl<'a> Frontier<'a> {
    fn new(circuit: &'a CircuitGraph) -> Self {
        let total = circuit.len();
        // Statements on no wire never reach a front.
        let schedule = (0..total)
            .filter(|&i| circuit.arity(i) == 0)
            .map(|i| circuit.node(i).call_point)
            .collect();
        Self {
            cursor: circuit.cursor(),
            counted: vec![false; circuit.num_wires()],
            waiting: (0..total).map(|i| circuit.arity(i)).collect(),
            ready: BTreeSet::new(),
            schedule,
        }
    }

    /// Count every newly reached wire front.
    fn mark(&mut self, circuit: &CircuitGraph) {
        for wire in 0..circuit.num_wires() {
            if self.counted[wire] {
                continue;
            }
            if let Some(index) = self.cursor.front(wire) {
                self.counted[wire] = true;
                self.waiting[index] -= 1;
                if self.waiting[index] == 0 {
                    self.ready.insert(index);
                }
            }
        }
    }

    fn commit(&mut self, circuit: &CircuitGraph, index: usize) {
        self.ready.remove(&index);
        self.cursor.advance(index);
        for &wire in circuit.wires(index) {
            self.counted[wire] = false;
        }
        self.schedule.push(circuit.node(index).call_point);
    }
}

/// Local fix for a ready dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fix {
    Native,
    Reverse,
    /// Exchange two unused logical qubits in the initial mapping.
    FreezeSwap { mover: u32, partner: u32 },
    /// Swap the token at `path[0]` forward until it sits next to the end.
    SwapChain { path: Vec<u32> },
}

#[derive(Debug, Clone)]
struct Candidate {
    cost: u64,
    fix: Fix,
}

/// Layout, initial mapping and frozen set, threaded through the run.
struct GreedyState {
    layout: Layout,
    initial: Mapping,
    frozen: Vec<bool>,
}

impl GreedyState {
    fn new(initial: Mapping) -> AllocResult<Self> {
        let layout = Layout::from_mapping(initial.clone())?;
        let frozen = vec![false; initial.len()];
        Ok(Self {
            layout,
            initial,
            frozen,
        })
    }

    fn freeze(&mut self, logical: u32) {
        if let Some(flag) = self.frozen.get_mut(logical as usize) {
            *flag = true;
        }
    }

    fn is_frozen(&self, logical: u32) -> bool {
        self.frozen[logical as usize]
    }

    fn evaluate(&self, graph: &ArchGraph, dep: Dep, costs: &CostModel) -> AllocResult<Candidate> {
        let (a, b) = (dep.from, dep.to);
        let (u, v) = (self.layout.physical(a), self.layout.physical(b));

        if graph.has_edge(u, v) {
            return Ok(Candidate {
                cost: 0,
                fix: Fix::Native,
            });
        }
        if graph.has_edge(v, u) {
            return Ok(Candidate {
                cost: u64::from(costs.reverse),
                fix: Fix::Reverse,
            });
        }
        if let Some(candidate) = self.freeze_swap(graph, dep, costs) {
            return Ok(candidate);
        }

        let mut path = BfsPathFinder.find(graph, u, v)?;
        let hops = path.len();
        let mut cost = (hops as u64).saturating_sub(2) * u64::from(costs.swap);
        if graph.has_edge(path[0], path[1]) {
            // Bring the target back to the control.
            path.reverse();
        } else if !graph.has_edge(path[hops - 2], path[hops - 1]) {
            cost += u64::from(costs.reverse);
        }

        Ok(Candidate {
            cost,
            fix: Fix::SwapChain { path },
        })
    }

    /// Relocate an unfrozen operand onto a neighbour of the other operand
    /// that holds an unfrozen qubit.
    fn freeze_swap(&self, graph: &ArchGraph, dep: Dep, costs: &CostModel) -> Option<Candidate> {
        let (a, b) = (dep.from, dep.to);
        if self.is_frozen(a) && self.is_frozen(b) {
            return None;
        }

        let (mut mover, mut anchor) = if self.is_frozen(b) { (a, b) } else { (b, a) };
        for _ in 0..2 {
            if self.is_frozen(mover) {
                break;
            }
            for &w in graph.adjacent(self.layout.physical(anchor)) {
                let partner = self.layout.logical(w);
                if self.is_frozen(partner) {
                    continue;
                }
                let (pa, pb) = if mover == a {
                    (w, self.layout.physical(b))
                } else {
                    (self.layout.physical(a), w)
                };
                let cost = if graph.has_edge(pa, pb) {
                    0
                } else {
                    u64::from(costs.reverse)
                };
                return Some(Candidate {
                    cost,
                    fix: Fix::FreezeSwap { mover, partner },
                });
            }
            std::mem::swap(&mut mover, &mut anchor);
        }
        None
    }

    fn apply(&mut self, graph: &ArchGraph, dep: Dep, fix: Fix) -> AllocResult<Vec<Operation>> {
        let mut ops = Vec::new();
        match fix {
            Fix::Native | Fix::Reverse => {}
            Fix::FreezeSwap { mover, partner } => {
                self.initial.swap(mover as usize, partner as usize);
                self.layout.swap_logical(mover, partner);
            }
            Fix::SwapChain { path } => {
                for hop in path.windows(2).take(path.len().saturating_sub(2)) {
                    let (pu, pv) = (hop[0], hop[1]);
                    let (la, lb) = (self.layout.logical(pu), self.layout.logical(pv));
                    self.freeze(la);
                    self.freeze(lb);
                    ops.push(Operation::Swap { a: la, b: lb });
                    self.layout.swap_physical(pu, pv);
                }
            }
        }

        self.freeze(dep.from);
        self.freeze(dep.to);
        ops.push(adjacent_gate(
            graph,
            self.layout.mapping(),
            dep.from,
            dep.to,
        )?);
        Ok(ops)
    }
}

//! Directed device connectivity graph.

use petgraph::algo::connected_components;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{ArchError, ArchResult};

/// Built-in architecture names accepted by [`ArchGraph::by_name`].
pub const BUILTIN_ARCHITECTURES: &[&str] =
    &["ibmqx2", "ibmqx4", "linear<N>", "ring<N>", "star<N>"];

/// A named, contiguous range of physical qubits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Register name as it appears in labels such as `q[3]`.
    pub name: String,
    /// Number of qubits in the register.
    pub size: u32,
}

impl Register {
    /// Create a register.
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Directed graph of physical qubits.
///
/// An edge `(u, v)` means a two-qubit gate with control `u` and target `v`
/// is native on the device. The opposite direction is still realizable at
/// extra cost, which is what [`is_reverse_edge`](Self::is_reverse_edge)
/// reports.
///
/// The graph is immutable once built. Successor, predecessor and adjacency
/// lists as well as a hashed edge set are computed on construction, so
/// every query is O(1) or a slice borrow. Memory grows with the number of
/// edges, not with the square of the qubit count.
///
/// # Example
///
/// ```
/// use qalloc_arch::ArchGraph;
///
/// let g = ArchGraph::ibmqx2();
/// assert!(g.has_edge(0, 1));
/// assert!(g.is_reverse_edge(1, 0));
/// assert!(!g.is_adjacent(0, 3));
/// ```
#[derive(Debug, Clone)]
pub struct ArchGraph {
    /// Structural view used for connectivity checks and export.
    graph: DiGraph<u32, ()>,
    /// Natural edges in insertion order.
    edges: Vec<(u32, u32)>,
    /// Natural edges for constant-time lookup.
    natural: FxHashSet<(u32, u32)>,
    successors: Vec<Vec<u32>>,
    predecessors: Vec<Vec<u32>>,
    /// Successors first, then predecessors not already listed.
    adjacency: Vec<Vec<u32>>,
    registers: Vec<Register>,
}

impl ArchGraph {
    /// Build a graph with a single register `q` from a directed edge list.
    ///
    /// Duplicate edges are ignored. Self-loops and endpoints outside
    /// `0..num_qubits` are rejected.
    pub fn from_edges<I>(num_qubits: u32, edges: I) -> ArchResult<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        Self::with_registers(num_qubits, edges, vec![Register::new("q", num_qubits)])
    }

    /// Build a graph whose qubits are grouped into named registers.
    pub(crate) fn with_registers<I>(
        num_qubits: u32,
        edges: I,
        registers: Vec<Register>,
    ) -> ArchResult<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let edges: Vec<(u32, u32)> = edges.into_iter().collect();
        for &(from, to) in &edges {
            if from >= num_qubits || to >= num_qubits {
                return Err(ArchError::InvalidEdge {
                    from,
                    to,
                    size: num_qubits,
                });
            }
            if from == to {
                return Err(ArchError::SelfLoop(from));
            }
        }
        Ok(Self::assemble(num_qubits, &edges, registers))
    }

    /// Assemble the caches from an already validated edge list.
    fn assemble(num_qubits: u32, edges: &[(u32, u32)], registers: Vec<Register>) -> Self {
        let n = num_qubits as usize;
        let mut graph = DiGraph::with_capacity(n, edges.len());
        for q in 0..num_qubits {
            graph.add_node(q);
        }

        let mut natural = FxHashSet::default();
        natural.reserve(edges.len());
        let mut kept = Vec::with_capacity(edges.len());
        let mut successors = vec![Vec::new(); n];
        let mut predecessors = vec![Vec::new(); n];

        for &(u, v) in edges {
            if !natural.insert((u, v)) {
                continue;
            }
            kept.push((u, v));
            successors[u as usize].push(v);
            predecessors[v as usize].push(u);
            graph.add_edge(NodeIndex::new(u as usize), NodeIndex::new(v as usize), ());
        }

        let adjacency = (0..n)
            .map(|u| {
                let mut adj = successors[u].clone();
                for &p in &predecessors[u] {
                    if !adj.contains(&p) {
                        adj.push(p);
                    }
                }
                adj
            })
            .collect();

        Self {
            graph,
            edges: kept,
            natural,
            successors,
            predecessors,
            adjacency,
            registers,
        }
    }

    /// Number of physical qubits.
    #[inline]
    pub fn size(&self) -> u32 {
        self.successors.len() as u32
    }

    /// Number of distinct natural edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Natural edges in insertion order.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Registers the qubits are grouped into.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Check whether `(u, v)` is a natural edge.
    #[inline]
    pub fn has_edge(&self, u: u32, v: u32) -> bool {
        self.natural.contains(&(u, v))
    }

    /// Check whether `(u, v)` is only realizable through the edge `(v, u)`.
    #[inline]
    pub fn is_reverse_edge(&self, u: u32, v: u32) -> bool {
        self.has_edge(v, u) && !self.has_edge(u, v)
    }

    /// Check whether `u` and `v` are coupled in either direction.
    #[inline]
    pub fn is_adjacent(&self, u: u32, v: u32) -> bool {
        self.has_edge(u, v) || self.has_edge(v, u)
    }

    /// Targets of natural edges leaving `u`.
    pub fn successors(&self, u: u32) -> &[u32] {
        self.successors.get(u as usize).map_or(&[], Vec::as_slice)
    }

    /// Controls of natural edges entering `u`.
    pub fn predecessors(&self, u: u32) -> &[u32] {
        self.predecessors.get(u as usize).map_or(&[], Vec::as_slice)
    }

    /// Every qubit coupled with `u`: successors first, then the remaining
    /// predecessors, each in edge insertion order.
    pub fn adjacent(&self, u: u32) -> &[u32] {
        self.adjacency.get(u as usize).map_or(&[], Vec::as_slice)
    }

    /// Number of qubits coupled with `u`.
    pub fn degree(&self, u: u32) -> usize {
        self.adjacent(u).len()
    }

    /// Check whether every qubit can reach every other one, ignoring edge
    /// direction.
    pub fn is_connected(&self) -> bool {
        self.size() <= 1 || connected_components(&self.graph) == 1
    }

    /// Global index of `register[index]`, if it exists.
    pub fn resolve_label(&self, register: &str, index: u32) -> Option<u32> {
        let mut offset = 0;
        for reg in &self.registers {
            if reg.name == register {
                return (index < reg.size).then_some(offset + index);
            }
            offset += reg.size;
        }
        None
    }

    /// Render the graph in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }

    /// IBM QX2 (Yorktown), 5 qubits.
    pub fn ibmqx2() -> Self {
        Self::builtin(5, &[(0, 1), (1, 2), (0, 2), (3, 2), (4, 2), (3, 4)])
    }

    /// IBM QX4 (Tenerife), 5 qubits.
    pub fn ibmqx4() -> Self {
        Self::builtin(5, &[(1, 0), (2, 0), (2, 1), (3, 2), (3, 4), (2, 4)])
    }

    /// Linear chain `0 -> 1 -> ... -> n-1`.
    pub fn linear(n: u32) -> Self {
        let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        Self::builtin(n, &edges)
    }

    /// Linear chain closed back onto qubit 0.
    pub fn ring(n: u32) -> Self {
        let mut edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        if n > 2 {
            edges.push((n - 1, 0));
        }
        Self::builtin(n, &edges)
    }

    /// Star with qubit 0 as the control of every edge.
    pub fn star(n: u32) -> Self {
        let edges: Vec<_> = (1..n).map(|i| (0, i)).collect();
        Self::builtin(n, &edges)
    }

    /// Look up a built-in architecture (see [`BUILTIN_ARCHITECTURES`]).
    pub fn by_name(name: &str) -> ArchResult<Self> {
        let lower = name.to_ascii_lowercase();
        let sized = |prefix: &str| {
            lower
                .strip_prefix(prefix)
                .and_then(|rest| rest.parse::<u32>().ok())
        };

        match lower.as_str() {
            "ibmqx2" | "qx2" => Ok(Self::ibmqx2()),
            "ibmqx4" | "qx4" => Ok(Self::ibmqx4()),
            _ => {
                if let Some(n) = sized("linear") {
                    Ok(Self::linear(n))
                } else if let Some(n) = sized("ring") {
                    Ok(Self::ring(n))
                } else if let Some(n) = sized("star") {
                    Ok(Self::star(n))
                } else {
                    Err(ArchError::UnknownArchitecture(name.to_string()))
                }
            }
        }
    }

    fn builtin(n: u32, edges: &[(u32, u32)]) -> Self {
        Self::assemble(n, edges, vec![Register::new("q", n)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_edges_are_derived() {
        let g = ArchGraph::ibmqx2();
        assert_eq!(g.size(), 5);
        assert_eq!(g.num_edges(), 6);

        assert!(g.has_edge(3, 4));
        assert!(!g.has_edge(4, 3));
        assert!(g.is_reverse_edge(4, 3));
        assert!(!g.is_reverse_edge(3, 4));
        assert!(!g.is_reverse_edge(0, 3));
    }

    #[test]
    fn test_neighbour_lists() {
        let g = ArchGraph::ibmqx2();
        assert_eq!(g.successors(0), &[1, 2]);
        assert_eq!(g.predecessors(2), &[1, 0, 3, 4]);
        assert_eq!(g.adjacent(2), &[1, 0, 3, 4]);
        assert_eq!(g.adjacent(4), &[2, 3]);
        assert_eq!(g.degree(2), 4);
        assert!(g.successors(17).is_empty());
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let g = ArchGraph::from_edges(3, [(0, 1), (0, 1), (1, 2)]).unwrap();
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.successors(0), &[1]);
    }

    #[test]
    fn test_invalid_edges_rejected() {
        assert!(matches!(
            ArchGraph::from_edges(3, [(0, 3)]),
            Err(ArchError::InvalidEdge { to: 3, .. })
        ));
        assert!(matches!(
            ArchGraph::from_edges(3, [(1, 1)]),
            Err(ArchError::SelfLoop(1))
        ));
    }

    #[test]
    fn test_connectivity() {
        assert!(ArchGraph::ibmqx4().is_connected());
        assert!(ArchGraph::linear(1).is_connected());
        let split = ArchGraph::from_edges(4, [(0, 1), (2, 3)]).unwrap();
        assert!(!split.is_connected());
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(ArchGraph::by_name("IBMQX4").unwrap().num_edges(), 6);
        assert_eq!(ArchGraph::by_name("linear6").unwrap().num_edges(), 5);
        assert_eq!(ArchGraph::by_name("ring4").unwrap().num_edges(), 4);
        assert!(ArchGraph::by_name("star3").unwrap().has_edge(0, 2));
        assert!(matches!(
            ArchGraph::by_name("heavyhex"),
            Err(ArchError::UnknownArchitecture(_))
        ));
    }

    #[test]
    fn test_resolve_label() {
        let g = ArchGraph::with_registers(
            4,
            [(0, 1), (2, 3)],
            vec![Register::new("a", 2), Register::new("b", 2)],
        )
        .unwrap();
        assert_eq!(g.resolve_label("a", 1), Some(1));
        assert_eq!(g.resolve_label("b", 0), Some(2));
        assert_eq!(g.resolve_label("b", 2), None);
        assert_eq!(g.resolve_label("c", 0), None);
    }

    #[test]
    fn test_sparse_device_has_no_quadratic_storage() {
        let g = ArchGraph::from_edges(200_000, [(0, 1), (199_998, 199_999)]).unwrap();
        assert_eq!(g.size(), 200_000);
        assert!(g.has_edge(199_998, 199_999));
        assert!(g.is_reverse_edge(1, 0));
        assert!(!g.has_edge(0, 199_999));
        assert!(!g.has_edge(200_000, 0));
    }

    #[test]
    fn test_dot_export() {
        let dot = ArchGraph::linear(3).to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("->"));
    }
}

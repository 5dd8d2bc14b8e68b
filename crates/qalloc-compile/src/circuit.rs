//! Minimal program model and its per-wire circuit graph.
//!
//! A [`Program`] is an ordered list of statements over logical qubits and
//! classical bits. It provides the two views the allocators consume:
//!
//! - [`Program::to_dependencies`]: one [`Dependency`] per two-qubit statement
//!   (barriers excluded), with the statement index as call point;
//! - [`Program::circuit_graph`]: a [`CircuitGraph`] holding, for every wire,
//!   the statements that touch it in program order.

use serde::{Deserialize, Serialize};

use crate::dependency::{CallPoint, Dependency, DependencySet};
use crate::error::{AllocError, AllocResult};

/// A single program statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Gate or instruction name, e.g. `cx`, `h`, `measure`.
    pub name: String,
    /// Logical qubit operands.
    #[serde(default)]
    pub qubits: Vec<u32>,
    /// Classical bit operands.
    #[serde(default)]
    pub clbits: Vec<u32>,
}

impl Statement {
    /// Create a statement on qubits only.
    pub fn new(name: impl Into<String>, qubits: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            qubits,
            clbits: Vec::new(),
        }
    }

    /// Number of wires (qubits and classical bits) the statement touches.
    pub fn arity(&self) -> usize {
        self.qubits.len() + self.clbits.len()
    }

    /// Check whether the statement is a barrier.
    pub fn is_barrier(&self) -> bool {
        self.name.eq_ignore_ascii_case("barrier")
    }
}

/// An ordered list of statements.
///
/// ```
/// use qalloc_compile::Program;
///
/// let mut program = Program::new(3, 1);
/// program.gate("h", &[0]);
/// program.cx(0, 1);
/// program.measure(1, 0);
///
/// let deps = program.to_dependencies();
/// assert_eq!(deps.len(), 1);
/// assert_eq!(deps.get(0).unwrap().call_point, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub num_qubits: u32,
    #[serde(default)]
    pub num_clbits: u32,
    pub statements: Vec<Statement>,
}

impl Program {
    /// Create an empty program.
    pub fn new(num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            num_qubits,
            num_clbits,
            statements: Vec::new(),
        }
    }

    /// Parse a program from its JSON form.
    pub fn from_json(source: &str) -> AllocResult<Self> {
        let program: Self = serde_json::from_str(source)?;
        program.validate()?;
        Ok(program)
    }

    /// Append a statement and return its call point.
    pub fn push(&mut self, statement: Statement) -> CallPoint {
        self.statements.push(statement);
        (self.statements.len() - 1) as CallPoint
    }

    /// Append a gate on qubits.
    pub fn gate(&mut self, name: &str, qubits: &[u32]) -> CallPoint {
        self.push(Statement::new(name, qubits.to_vec()))
    }

    /// Append a CNOT.
    pub fn cx(&mut self, control: u32, target: u32) -> CallPoint {
        self.gate("cx", &[control, target])
    }

    /// Append a measurement of `qubit` into `clbit`.
    pub fn measure(&mut self, qubit: u32, clbit: u32) -> CallPoint {
        self.push(Statement {
            name: "measure".into(),
            qubits: vec![qubit],
            clbits: vec![clbit],
        })
    }

    /// Append a barrier.
    pub fn barrier(&mut self, qubits: &[u32]) -> CallPoint {
        self.gate("barrier", qubits)
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Check whether the program has no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Check operand ranges against the declared register sizes.
    pub fn validate(&self) -> AllocResult<()> {
        for statement in &self.statements {
            if let Some(&qubit) = statement.qubits.iter().find(|&&q| q >= self.num_qubits) {
                return Err(AllocError::QubitOutOfRange {
                    qubit,
                    size: self.num_qubits,
                });
            }
            if let Some(&clbit) = statement.clbits.iter().find(|&&c| c >= self.num_clbits) {
                return Err(AllocError::Config(format!(
                    "statement '{}' uses classical bit {clbit} of {}",
                    statement.name, self.num_clbits
                )));
            }
        }
        Ok(())
    }

    /// Extract one dependency per two-qubit, non-barrier statement.
    pub fn to_dependencies(&self) -> DependencySet {
        self.statements
            .iter()
            .enumerate()
            .filter(|(_, s)| s.qubits.len() == 2 && !s.is_barrier())
            .map(|(i, s)| Dependency::single(i as CallPoint, s.qubits[0], s.qubits[1]))
            .collect()
    }

    /// Build the per-wire statement streams.
    pub fn circuit_graph(&self) -> CircuitGraph {
        let nodes = self
            .statements
            .iter()
            .enumerate()
            .map(|(i, s)| Node {
                call_point: i as CallPoint,
                name: s.name.clone(),
                qubits: s.qubits.clone(),
                clbits: s.clbits.clone(),
            })
            .collect();
        CircuitGraph::new(self.num_qubits, self.num_clbits, nodes)
    }
}

/// A statement as seen by the circuit graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub call_point: CallPoint,
    pub name: String,
    pub qubits: Vec<u32>,
    pub clbits: Vec<u32>,
}

/// Per-wire chronological statement streams.
///
/// Wires `0..num_qubits` are qubits, the following `num_clbits` wires are
/// classical bits. Nodes are indexed in program order.
#[derive(Debug, Clone)]
pub struct CircuitGraph {
    num_qubits: u32,
    num_clbits: u32,
    nodes: Vec<Node>,
    /// Wire indices touched by each node, deduplicated.
    node_wires: Vec<Vec<usize>>,
    /// Node indices on each wire, in program order.
    streams: Vec<Vec<usize>>,
}

impl CircuitGraph {
    /// Build a circuit graph from nodes in program order.
    ///
    /// Operands outside the declared registers are ignored when building the
    /// streams.
    pub fn new(num_qubits: u32, num_clbits: u32, nodes: Vec<Node>) -> Self {
        let num_wires = (num_qubits + num_clbits) as usize;
        let mut streams = vec![Vec::new(); num_wires];
        let mut node_wires = Vec::with_capacity(nodes.len());

        for (index, node) in nodes.iter().enumerate() {
            let mut wires: Vec<usize> = node
                .qubits
                .iter()
                .filter(|&&q| q < num_qubits)
                .map(|&q| q as usize)
                .chain(
                    node.clbits
                        .iter()
                        .filter(|&&c| c < num_clbits)
                        .map(|&c| (num_qubits + c) as usize),
                )
                .collect();
            wires.sort_unstable();
            wires.dedup();
            for &wire in &wires {
                streams[wire].push(index);
            }
            node_wires.push(wires);
        }

        Self {
            num_qubits,
            num_clbits,
            nodes,
            node_wires,
            streams,
        }
    }

    /// Build a circuit graph holding one two-qubit node per dependency pair.
    pub fn from_dependencies(deps: &DependencySet, num_qubits: u32) -> Self {
        let nodes = deps
            .iter()
            .map(|d| Node {
                call_point: d.call_point,
                name: "cx".into(),
                qubits: d.deps.iter().flat_map(|p| [p.from, p.to]).collect(),
                clbits: Vec::new(),
            })
            .collect();
        Self::new(num_qubits, 0, nodes)
    }

    /// Number of qubit wires.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of classical bit wires.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Total number of wires.
    pub fn num_wires(&self) -> usize {
        self.streams.len()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node at `index`.
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// Wires touched by node `index`.
    pub fn wires(&self, index: usize) -> &[usize] {
        &self.node_wires[index]
    }

    /// Number of wires touched by node `index`.
    pub fn arity(&self, index: usize) -> usize {
        self.node_wires[index].len()
    }

    /// Nodes on `wire`, in program order.
    pub fn stream(&self, wire: usize) -> &[usize] {
        &self.streams[wire]
    }

    /// A cursor positioned before the first node of every wire.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            graph: self,
            positions: vec![0; self.streams.len()],
        }
    }
}

/// Tracks the next unconsumed node on every wire.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    graph: &'a CircuitGraph,
    positions: Vec<usize>,
}

impl Cursor<'_> {
    /// Next unconsumed node on `wire`.
    pub fn front(&self, wire: usize) -> Option<usize> {
        self.graph.streams[wire].get(self.positions[wire]).copied()
    }

    /// Check whether `index` is the front node of every wire it touches.
    pub fn is_front(&self, index: usize) -> bool {
        self.graph
            .wires(index)
            .iter()
            .all(|&w| self.front(w) == Some(index))
    }

    /// Consume node `index` on every wire it touches.
    ///
    /// Returns `false`, leaving the cursor unchanged, when the node is not
    /// at the front of all its wires.
    pub fn advance(&mut self, index: usize) -> bool {
        if !self.is_front(index) {
            return false;
        }
        for &wire in self.graph.wires(index) {
            self.positions[wire] += 1;
        }
        true
    }

    /// Check whether every wire has been consumed.
    pub fn is_done(&self) -> bool {
        (0..self.positions.len()).all(|w| self.front(w).is_none())
    }
}

//! Allocation results: the initial mapping and the rewritten gates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dependency::CallPoint;
use crate::layout::Mapping;

/// A gate emitted by an allocation strategy.
///
/// `a` and `b` are logical qubits; `bridge` is a physical qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// CNOT along a native edge.
    Cnot { a: u32, b: u32 },
    /// CNOT realized against the edge direction.
    Rev { a: u32, b: u32 },
    /// Exchange of two logical qubits on adjacent physical qubits.
    Swap { a: u32, b: u32 },
    /// CNOT between qubits two hops apart, through `bridge`.
    LongCnot { a: u32, b: u32, bridge: u32 },
}

impl Operation {
    /// The two logical operands.
    pub fn operands(&self) -> (u32, u32) {
        match *self {
            Self::Cnot { a, b }
            | Self::Rev { a, b }
            | Self::Swap { a, b }
            | Self::LongCnot { a, b, .. } => (a, b),
        }
    }

    /// Check whether this is a swap.
    pub fn is_swap(&self) -> bool {
        matches!(self, Self::Swap { .. })
    }

    /// Lowercase gate name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cnot { .. } => "cnot",
            Self::Rev { .. } => "rev",
            Self::Swap { .. } => "swap",
            Self::LongCnot { .. } => "lcnot",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LongCnot { a, b, bridge } => write!(f, "lcnot({a}, {b}) via {bridge}"),
            op => {
                let (a, b) = op.operands();
                write!(f, "{}({a}, {b})", op.name())
            }
        }
    }
}

/// The gates emitted for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpSequence {
    pub call_point: CallPoint,
    pub ops: Vec<Operation>,
}

impl OpSequence {
    /// Create an empty sequence for `call_point`.
    pub fn new(call_point: CallPoint) -> Self {
        Self {
            call_point,
            ops: Vec::new(),
        }
    }

    /// Number of swaps in the sequence.
    pub fn num_swaps(&self) -> usize {
        self.ops.iter().filter(|op| op.is_swap()).count()
    }
}

/// Result of an allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Logical -> physical mapping before the first gate.
    pub initial: Mapping,
    /// Total cost under the run's cost model.
    pub cost: u32,
    /// One sequence per dependency, in replay order.
    pub op_seqs: Vec<OpSequence>,
}

impl Solution {
    /// Create an empty solution starting from `initial`.
    pub fn new(initial: Mapping) -> Self {
        Self {
            initial,
            cost: 0,
            op_seqs: Vec::new(),
        }
    }

    /// Total number of swaps.
    pub fn num_swaps(&self) -> usize {
        self.op_seqs.iter().map(OpSequence::num_swaps).sum()
    }

    /// Total number of emitted gates.
    pub fn num_ops(&self) -> usize {
        self.op_seqs.iter().map(|s| s.ops.len()).sum()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial: {:?}", self.initial)?;
        writeln!(f, "cost: {}", self.cost)?;
        for seq in &self.op_seqs {
            let ops: Vec<String> = seq.ops.iter().map(ToString::to_string).collect();
            writeln!(f, "  [{}] {}", seq.call_point, ops.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Cnot { a: 0, b: 1 }.to_string(), "cnot(0, 1)");
        assert_eq!(Operation::Rev { a: 2, b: 1 }.to_string(), "rev(2, 1)");
        assert_eq!(
            Operation::LongCnot {
                a: 4,
                b: 1,
                bridge: 2
            }
            .to_string(),
            "lcnot(4, 1) via 2"
        );
    }

    #[test]
    fn test_counts() {
        let mut solution = Solution::new(vec![0, 1, 2]);
        solution.op_seqs.push(OpSequence {
            call_point: 0,
            ops: vec![Operation::Swap { a: 0, b: 1 }, Operation::Cnot { a: 1, b: 2 }],
        });
        solution.op_seqs.push(OpSequence::new(1));
        assert_eq!(solution.num_swaps(), 1);
        assert_eq!(solution.num_ops(), 2);
    }

    #[test]
    fn test_tagged_json() {
        let op = Operation::LongCnot {
            a: 0,
            b: 3,
            bridge: 2,
        };
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"op":"long_cnot","a":0,"b":3,"bridge":2}"#);
    }
}

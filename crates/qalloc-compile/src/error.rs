//! Error types for the allocation crate.

use qalloc_arch::ArchError;
use thiserror::Error;

use crate::dependency::CallPoint;

/// Errors that can occur during qubit allocation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AllocError {
    /// Error from the architecture crate.
    #[error("Architecture error: {0}")]
    Arch(#[from] ArchError),

    /// Malformed textual dependency list.
    #[error("Dependency parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A dependency or statement names a qubit the device does not have.
    #[error("Logical qubit {qubit} is out of range for a {size}-qubit device")]
    QubitOutOfRange { qubit: u32, size: u32 },

    /// A dependency whose two operands are the same qubit.
    #[error("Dependency at call point {call_point} uses qubit {qubit} twice")]
    SelfDependency { call_point: CallPoint, qubit: u32 },

    /// A dependency group holding more than one pair.
    #[error("Call point {call_point} carries {count} dependencies, expected one")]
    MultipleDependencies { call_point: CallPoint, count: usize },

    /// A dependency group holding no pair at all.
    #[error("Call point {0} carries no dependency")]
    EmptyDependency(CallPoint),

    /// A mapping that is not a permutation of the device's qubits.
    #[error("Invalid mapping {mapping:?}: {reason}")]
    InvalidMapping { mapping: Vec<u32>, reason: String },

    /// No mapping sequence satisfies every dependency.
    #[error("No allocation satisfies all {0} dependencies")]
    NoSolution(usize),

    /// The circuit graph has unscheduled statements but none is ready.
    #[error("No ready statement with {remaining} statements left to schedule")]
    NoReadyStatement { remaining: usize },

    /// Two qubits are too far apart for a bridged gate.
    #[error("Physical qubits {u} and {v} are {distance} hops apart, bridging reaches 2")]
    OutOfBridgeReach { u: u32, v: u32, distance: u32 },

    /// A gate was requested between physical qubits that are not coupled.
    #[error("Physical qubits {u} and {v} are not adjacent")]
    NotAdjacent { u: u32, v: u32 },

    /// A solution failed replay verification.
    #[error("Solution failed verification at call point {call_point}: {reason}")]
    Verification { call_point: CallPoint, reason: String },

    /// Malformed JSON program or solution.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An accumulated cost does not fit the reported cost width.
    #[error("Allocation cost {0} exceeds the maximum of {max}", max = u32::MAX)]
    CostOverflow(u64),

    /// Invalid allocator configuration.
    #[error("Invalid allocator configuration: {0}")]
    Config(String),
}

/// Result type for allocation operations.
pub type AllocResult<T> = Result<T, AllocError>;

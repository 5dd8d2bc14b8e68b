//! Error types for the architecture crate.

use thiserror::Error;

/// Errors that can occur while building or querying an architecture graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchError {
    /// Malformed textual architecture description.
    #[error("Architecture parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number in the source text.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// The architecture file could not be read.
    #[error("Failed to read architecture file: {0}")]
    Io(#[from] std::io::Error),

    /// An edge references a qubit outside the graph.
    #[error("Edge ({from}, {to}) references a qubit outside 0..{size}")]
    InvalidEdge {
        /// Control endpoint.
        from: u32,
        /// Target endpoint.
        to: u32,
        /// Number of physical qubits in the graph.
        size: u32,
    },

    /// An edge connects a qubit to itself.
    #[error("Self-loop on physical qubit {0} is not a valid coupling")]
    SelfLoop(u32),

    /// No path exists between two physical qubits.
    #[error("No path between physical qubits {from} and {to}")]
    Unreachable {
        /// Start of the search.
        from: u32,
        /// Requested destination.
        to: u32,
    },

    /// The graph is too large for the exhaustive token-swap solver.
    #[error("Exhaustive token swapping supports at most {max} qubits, graph has {size}")]
    TooLarge {
        /// Number of physical qubits in the graph.
        size: u32,
        /// Largest supported size.
        max: u32,
    },

    /// A permutation query does not match the preprocessed graph size.
    #[error("Permutation of size {got} does not match the preprocessed size {expected}")]
    SizeMismatch {
        /// Size used during preprocessing.
        expected: u32,
        /// Size of the queried permutation.
        got: u32,
    },

    /// A sequence that should be a permutation of `0..size` is not one.
    #[error("Not a permutation of 0..{size}: {values:?}")]
    InvalidPermutation {
        /// Expected permutation size.
        size: u32,
        /// The offending values.
        values: Vec<u32>,
    },

    /// The target permutation cannot be reached with the graph's swaps.
    #[error("Permutation {values:?} is unreachable through swaps on this graph")]
    PermutationUnreachable {
        /// The relabelled target permutation.
        values: Vec<u32>,
    },

    /// Unknown built-in architecture name.
    #[error("Unknown architecture '{0}'")]
    UnknownArchitecture(String),
}

/// Result type for architecture operations.
pub type ArchResult<T> = Result<T, ArchError>;

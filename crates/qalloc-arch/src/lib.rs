//! Device Architecture Model for Qubit Allocation
//!
//! This crate describes the physical side of the allocation problem: which
//! qubits exist on a device, which two-qubit gates are native between them,
//! and how tokens (logical qubits) can be moved around by swaps.
//!
//! # Core Components
//!
//! - **Graph**: [`ArchGraph`] holds the directed coupling graph and answers
//!   edge, reverse-edge and neighbourhood queries
//! - **Parsing**: [`ArchGraph::parse`] and [`ArchGraph::from_file`] load the
//!   textual architecture format
//! - **Paths**: [`BfsPathFinder`] and [`distance_matrix`] give hop distances
//!   between physical qubits
//! - **Token swapping**: [`ExhaustiveTokenSwapFinder`] computes minimum swap
//!   sequences between two placements
//!
//! # Example
//!
//! ```rust
//! use qalloc_arch::{ArchGraph, BfsPathFinder, PathFinder};
//!
//! let g = ArchGraph::ibmqx2();
//! let path = BfsPathFinder.find(&g, 0, 3).unwrap();
//! assert_eq!(path, vec![0, 2, 3]);
//! ```

pub mod error;
pub mod graph;
pub mod parse;
pub mod path;
pub mod token_swap;

pub use error::{ArchError, ArchResult};
pub use graph::{ArchGraph, BUILTIN_ARCHITECTURES, Register};
pub use path::{BfsPathFinder, PathFinder, distance_matrix};
pub use token_swap::{
    ExhaustiveTokenSwapFinder, MAX_EXHAUSTIVE_QUBITS, Swap, SwapSeq, TokenSwapFinder,
};

//! Qubit Allocation Strategies
//!
//! This crate maps the logical qubits of a program onto the physical qubits
//! of a device described by [`qalloc_arch::ArchGraph`]. Every two-qubit
//! interaction of the program is a [`Dependency`]; an allocator rewrites each
//! one into gates the device can execute, inserting swaps where the operands
//! are not coupled.
//!
//! # Overview
//!
//! ```text
//! Program ──► DependencySet ──┬── DynprogDepSolver      (optimal)
//!    │                        ├── PathGuidedSolBuilder  (mapping + paths)
//!    │                        └── DirectSolBuilder      (mapping only)
//!    └──► CircuitGraph ────────── GreedyCktSolver       (reorders)
//!                                        │
//!                                        ▼
//!                          Solution { initial, cost, op_seqs }
//! ```
//!
//! Two-step strategies ([`SolBuilder`]) take their initial mapping from a
//! [`MappingFinder`]. The [`Allocator`] ties the pieces together and replays
//! every solution through [`verify_solution`] unless told otherwise.
//!
//! # Example
//!
//! ```rust
//! use qalloc_arch::ArchGraph;
//! use qalloc_compile::{AllocatorBuilder, AllocatorKind, DependencySet};
//!
//! let graph = ArchGraph::ibmqx2();
//! let deps = DependencySet::from_pairs([(0, 1), (1, 2), (2, 0)]);
//!
//! let allocator = AllocatorBuilder::new()
//!     .with_allocator(AllocatorKind::Dynprog)
//!     .build()
//!     .unwrap();
//! let allocation = allocator.allocate(&graph, &deps).unwrap();
//! assert_eq!(allocation.verified_cost, Some(allocation.solution.cost));
//! ```
//!
//! # Costs
//!
//! | Operation | Default cost |
//! |-----------|--------------|
//! | CNOT along an edge | 0 |
//! | CNOT against an edge (`Rev`) | 4 |
//! | Swap | 7 |
//! | Bridged CNOT (`LongCnot`) | 10 |

pub mod allocator;
pub mod circuit;
pub mod config;
pub mod dependency;
pub mod error;
pub mod layout;
pub mod mapping;
pub mod solution;
pub mod solver;
pub mod solvers;
pub mod verify;

pub use allocator::{Allocation, Allocator, AllocatorBuilder};
pub use circuit::{CircuitGraph, Program, Statement};
pub use config::{AllocConfig, AllocatorKind, CostModel, MappingFinderKind};
pub use dependency::{CallPoint, Dep, Dependency, DependencySet};
pub use error::{AllocError, AllocResult};
pub use layout::{Layout, Mapping};
pub use mapping::{IdentityMappingFinder, MappingFinder, WeightedMappingFinder};
pub use solution::{OpSequence, Operation, Solution};
pub use solver::{DepSolver, SolBuilder};
pub use solvers::{
    DirectSolBuilder, DynprogDepSolver, GreedyCktSolver, GreedyOutcome, PathGuidedSolBuilder,
    PathGuidedStats,
};
pub use verify::verify_solution;

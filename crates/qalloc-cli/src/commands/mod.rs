//! CLI command implementations.

pub mod allocate;
pub mod archs;
pub mod common;
pub mod swaps;
pub mod version;

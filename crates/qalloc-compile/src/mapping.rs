//! Initial mapping finders.

use std::cmp::Reverse;
use std::sync::Arc;

use qalloc_arch::{ArchGraph, distance_matrix};
use tracing::debug;

use crate::config::MappingFinderKind;
use crate::dependency::DependencySet;
use crate::error::AllocResult;
use crate::layout::{Mapping, identity};

/// Chooses the logical -> physical mapping a strategy starts from.
pub trait MappingFinder: Send + Sync {
    /// Get the name of this finder.
    fn name(&self) -> &str;

    /// Compute a mapping of length `graph.size()`.
    fn find(&self, graph: &ArchGraph, deps: &DependencySet) -> AllocResult<Mapping>;
}

impl MappingFinderKind {
    /// Instantiate the finder this kind names.
    pub fn finder(&self) -> Arc<dyn MappingFinder> {
        match self {
            Self::Weighted => Arc::new(WeightedMappingFinder),
            Self::Identity => Arc::new(IdentityMappingFinder),
        }
    }
}

/// Logical qubit `i` on physical qubit `i`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMappingFinder;

impl MappingFinder for IdentityMappingFinder {
    fn name(&self) -> &str {
        "identity"
    }

    fn find(&self, graph: &ArchGraph, _deps: &DependencySet) -> AllocResult<Mapping> {
        Ok(identity(graph.size()))
    }
}

/// Places strongly interacting logical qubits on nearby physical qubits.
///
/// Logical qubits are placed one at a time. The next one is the unplaced
/// qubit with the most interactions with those already placed (ties: most
/// interactions overall, then lowest index). It goes on the free physical
/// qubit minimizing the interaction-weighted distance to its placed
/// partners, then the number of gates that would run against an edge, then
/// preferring high-degree qubits, then the lowest index.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMappingFinder;

impl MappingFinder for WeightedMappingFinder {
    fn name(&self) -> &str {
        "weighted"
    }

    fn find(&self, graph: &ArchGraph, deps: &DependencySet) -> AllocResult<Mapping> {
        let n = graph.size() as usize;
        deps.validate(graph.size())?;

        // Undirected and directed interaction counts.
        let mut weight = vec![vec![0u32; n]; n];
        let mut directed = vec![vec![0u32; n]; n];
        for dependency in deps {
            let dep = dependency.dep()?;
            let (a, b) = (dep.from as usize, dep.to as usize);
            weight[a][b] += 1;
            weight[b][a] += 1;
            directed[a][b] += 1;
        }
        let totals: Vec<u32> = weight.iter().map(|row| row.iter().sum()).collect();
        let dist = distance_matrix(graph);

        let mut mapping: Vec<Option<u32>> = vec![None; n];
        let mut placed: Vec<usize> = Vec::with_capacity(n);
        let mut free = vec![true; n];

        while placed.len() < n {
            let Some(q) = (0..n).filter(|&q| mapping[q].is_none()).max_by_key(|&q| {
                let connected: u32 = placed.iter().map(|&l| weight[q][l]).sum();
                (connected, totals[q], Reverse(q))
            }) else {
                break;
            };

            let score = |p: usize| {
                let mut distance = 0u64;
                let mut reversed = 0u32;
                for &l in &placed {
                    let Some(pl) = mapping[l] else { continue };
                    distance += u64::from(weight[q][l]) * u64::from(dist[p][pl as usize]);
                    if graph.is_reverse_edge(p as u32, pl) {
                        reversed += directed[q][l];
                    }
                    if graph.is_reverse_edge(pl, p as u32) {
                        reversed += directed[l][q];
                    }
                }
                (distance, reversed, Reverse(graph.degree(p as u32)), p)
            };

            let Some(p) = (0..n).filter(|&p| free[p]).min_by_key(|&p| score(p)) else {
                break;
            };

            mapping[q] = Some(p as u32);
            free[p] = false;
            placed.push(q);
        }

        let mapping: Mapping = mapping.into_iter().flatten().collect();
        debug!("Weighted mapping: {:?}", mapping);
        Ok(mapping)
    }
}

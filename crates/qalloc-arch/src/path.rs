//! Shortest paths between physical qubits.

use std::collections::VecDeque;

use crate::error::{ArchError, ArchResult};
use crate::graph::ArchGraph;

/// Finds a path between two physical qubits of an architecture graph.
pub trait PathFinder: Send + Sync {
    /// Return a path `[from, ..., to]`, or `[from]` when both are equal.
    fn find(&self, graph: &ArchGraph, from: u32, to: u32) -> ArchResult<Vec<u32>>;
}

/// Breadth-first shortest path.
///
/// Edge direction is ignored for reachability; ties are broken by the order
/// of [`ArchGraph::adjacent`], which makes the result deterministic. A result
/// of length 3 means the two qubits are at distance 2 and can be bridged.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPathFinder;

impl PathFinder for BfsPathFinder {
    fn find(&self, graph: &ArchGraph, from: u32, to: u32) -> ArchResult<Vec<u32>> {
        let n = graph.size();
        if from >= n || to >= n {
            return Err(ArchError::Unreachable { from, to });
        }
        if from == to {
            return Ok(vec![from]);
        }

        let mut parent: Vec<Option<u32>> = vec![None; n as usize];
        let mut visited = vec![false; n as usize];
        let mut queue = VecDeque::new();

        visited[from as usize] = true;
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for &neighbor in graph.adjacent(current) {
                if visited[neighbor as usize] {
                    continue;
                }
                visited[neighbor as usize] = true;
                parent[neighbor as usize] = Some(current);

                if neighbor == to {
                    let mut path = vec![to];
                    let mut node = to;
                    while let Some(prev) = parent[node as usize] {
                        path.push(prev);
                        node = prev;
                    }
                    path.reverse();
                    return Ok(path);
                }

                queue.push_back(neighbor);
            }
        }

        Err(ArchError::Unreachable { from, to })
    }
}

/// All-pairs hop distances, ignoring edge direction.
///
/// `matrix[u][v]` is `u32::MAX` when `v` cannot be reached from `u`.
pub fn distance_matrix(graph: &ArchGraph) -> Vec<Vec<u32>> {
    let n = graph.size() as usize;
    let mut matrix = vec![vec![u32::MAX; n]; n];

    for (src, row) in matrix.iter_mut().enumerate() {
        row[src] = 0;
        let mut queue = VecDeque::from([src as u32]);
        while let Some(current) = queue.pop_front() {
            let next = row[current as usize] + 1;
            for &neighbor in graph.adjacent(current) {
                if row[neighbor as usize] == u32::MAX {
                    row[neighbor as usize] = next;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    matrix
}

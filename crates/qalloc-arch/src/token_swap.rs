//! Exact token swapping over an architecture graph.
//!
//! Given two placements of tokens on the physical qubits, the token swapping
//! problem asks for the shortest sequence of swaps along graph edges that
//! turns one placement into the other. [`ExhaustiveTokenSwapFinder`] solves it
//! exactly by a single breadth-first search over all `N!` permutations,
//! rooted at the identity. An arbitrary `(from, to)` query is relabelled so
//! that `from` becomes the identity, after which the answer is a walk up the
//! precomputed BFS tree.
//!
//! The state space grows factorially, so this solver is limited to
//! [`MAX_EXHAUSTIVE_QUBITS`] physical qubits. Callers depend on the
//! [`TokenSwapFinder`] trait so that an approximate solver can take over for
//! larger devices.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{ArchError, ArchResult};
use crate::graph::ArchGraph;

/// Largest graph the exhaustive solver accepts (9! = 362 880 states).
pub const MAX_EXHAUSTIVE_QUBITS: u32 = 9;

const NO_PARENT: u32 = u32::MAX;
const UNVISITED: u32 = u32::MAX;

/// Exchange of the tokens sitting on physical qubits `u` and `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swap {
    /// First physical qubit.
    pub u: u32,
    /// Second physical qubit.
    pub v: u32,
}

impl Swap {
    /// Create a swap between two physical qubits.
    pub const fn new(u: u32, v: u32) -> Self {
        Self { u, v }
    }
}

/// Sequence of swaps, applied in order.
pub type SwapSeq = Vec<Swap>;

/// Answers minimum swap sequence queries between token placements.
///
/// Placements are indexed by physical qubit: `from[p]` is the token on `p`.
/// Applying the returned swaps in order to `from` must produce `to`.
pub trait TokenSwapFinder: Send + Sync {
    /// Find a swap sequence turning `from` into `to`.
    fn find(&self, from: &[u32], to: &[u32]) -> ArchResult<SwapSeq>;

    /// Length of the sequence [`find`](Self::find) would return.
    fn swap_count(&self, from: &[u32], to: &[u32]) -> ArchResult<u32> {
        Ok(self.find(from, to)?.len() as u32)
    }
}

/// Optimal token swapping by exhaustive search over permutation space.
///
/// # Example
///
/// ```
/// use qalloc_arch::{ArchGraph, ExhaustiveTokenSwapFinder, TokenSwapFinder};
///
/// let finder = ExhaustiveTokenSwapFinder::new(&ArchGraph::linear(3)).unwrap();
/// let swaps = finder.find(&[0, 1, 2], &[2, 1, 0]).unwrap();
/// assert_eq!(swaps.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveTokenSwapFinder {
    size: u32,
    /// All permutations of `0..size` in lexicographic order, flattened.
    permutations: Vec<u32>,
    /// BFS tree parent of each permutation id.
    parent: Vec<u32>,
    /// Swap leading from the parent to each permutation.
    via: Vec<Swap>,
    /// Distance from the identity, `UNVISITED` when unreachable.
    depth: Vec<u32>,
}

impl ExhaustiveTokenSwapFinder {
    /// Create a finder and preprocess `graph`.
    pub fn new(graph: &ArchGraph) -> ArchResult<Self> {
        let mut finder = Self::default();
        finder.preprocess(graph)?;
        Ok(finder)
    }

    /// Enumerate every permutation of the graph's qubits and record the
    /// shortest swap path from the identity to each of them.
    ///
    /// Calling this again re-initialises the finder for another graph.
    #[instrument(skip(self, graph), fields(size = graph.size()))]
    pub fn preprocess(&mut self, graph: &ArchGraph) -> ArchResult<()> {
        let size = graph.size();
        if size > MAX_EXHAUSTIVE_QUBITS {
            return Err(ArchError::TooLarge {
                size,
                max: MAX_EXHAUSTIVE_QUBITS,
            });
        }

        let n = size as usize;
        self.size = size;
        self.permutations = all_permutations(n);

        let count = self.permutation_count();
        self.parent = vec![NO_PARENT; count];
        self.via = vec![Swap::new(0, 0); count];
        self.depth = vec![UNVISITED; count];

        // Moves: every edge, seen from both endpoints.
        let moves: Vec<Swap> = (0..size)
            .flat_map(|u| {
                graph
                    .successors(u)
                    .iter()
                    .chain(graph.predecessors(u))
                    .map(move |&v| Swap::new(u, v))
            })
            .collect();

        // The identity has rank 0.
        self.depth[0] = 0;
        let mut queue = std::collections::VecDeque::from([0u32]);
        let mut scratch = vec![0u32; n];
        let mut reached = 1usize;

        while let Some(id) = queue.pop_front() {
            let next_depth = self.depth[id as usize] + 1;
            for &swap in &moves {
                scratch.copy_from_slice(self.permutation(id as usize));
                scratch.swap(swap.u as usize, swap.v as usize);

                let child = rank(&scratch);
                if self.depth[child] == UNVISITED {
                    self.depth[child] = next_depth;
                    self.parent[child] = id;
                    self.via[child] = swap;
                    queue.push_back(child as u32);
                    reached += 1;
                }
            }
        }

        info!(
            "Token swap preprocessing: {} permutations, {} reachable",
            count, reached
        );
        Ok(())
    }

    /// Number of physical qubits the finder was preprocessed for.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of enumerated permutations (`size!`).
    pub fn permutation_count(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        self.permutations.len() / self.size as usize
    }

    /// The permutation with lexicographic rank `id`.
    pub fn permutation(&self, id: usize) -> &[u32] {
        let n = self.size as usize;
        &self.permutations[id * n..(id + 1) * n]
    }

    /// Iterate over all permutations in lexicographic order.
    pub fn permutations(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.permutations.chunks_exact(self.size.max(1) as usize)
    }

    /// Lexicographic rank of a permutation, after validating it.
    pub fn id_of(&self, perm: &[u32]) -> ArchResult<usize> {
        self.check(perm)?;
        Ok(rank(perm))
    }

    fn check(&self, perm: &[u32]) -> ArchResult<()> {
        if perm.len() != self.size as usize {
            return Err(ArchError::SizeMismatch {
                expected: self.size,
                got: perm.len() as u32,
            });
        }
        let mut seen = vec![false; perm.len()];
        for &value in perm {
            match seen.get_mut(value as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(ArchError::InvalidPermutation {
                        size: self.size,
                        values: perm.to_vec(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Id of `to` once `from` has been relabelled to the identity.
    fn relative_id(&self, from: &[u32], to: &[u32]) -> ArchResult<usize> {
        self.check(from)?;
        self.check(to)?;

        let mut translator = vec![0u32; from.len()];
        for (position, &token) in from.iter().enumerate() {
            translator[token as usize] = position as u32;
        }
        let relabelled: Vec<u32> = to.iter().map(|&t| translator[t as usize]).collect();

        let id = rank(&relabelled);
        if self.depth[id] == UNVISITED {
            return Err(ArchError::PermutationUnreachable { values: relabelled });
        }
        Ok(id)
    }
}

impl TokenSwapFinder for ExhaustiveTokenSwapFinder {
    fn find(&self, from: &[u32], to: &[u32]) -> ArchResult<SwapSeq> {
        let mut id = self.relative_id(from, to)?;
        let mut swaps = Vec::with_capacity(self.depth[id] as usize);
        while self.parent[id] != NO_PARENT {
            swaps.push(self.via[id]);
            id = self.parent[id] as usize;
        }
        swaps.reverse();
        debug!("Token swap query resolved with {} swaps", swaps.len());
        Ok(swaps)
    }

    fn swap_count(&self, from: &[u32], to: &[u32]) -> ArchResult<u32> {
        let id = self.relative_id(from, to)?;
        Ok(self.depth[id])
    }
}

/// Lexicographic rank of a permutation of `0..perm.len()` (Lehmer code).
fn rank(perm: &[u32]) -> usize {
    let n = perm.len();
    let mut rank = 0usize;
    for i in 0..n {
        let smaller = perm[i + 1..].iter().filter(|&&x| x < perm[i]).count();
        rank = rank * (n - i) + smaller;
    }
    rank
}

/// Every permutation of `0..n` in lexicographic order, flattened.
fn all_permutations(n: usize) -> Vec<u32> {
    if n == 0 {
        return Vec::new();
    }
    let count: usize = (1..=n).product();
    let mut out = Vec::with_capacity(count * n);
    let mut current: Vec<u32> = (0..n as u32).collect();
    loop {
        out.extend_from_slice(&current);
        if !next_permutation(&mut current) {
            break;
        }
    }
    out
}

/// Advance to the next permutation in lexicographic order; `false` once the
/// last one has been reached.
fn next_permutation(perm: &mut [u32]) -> bool {
    let Some(pivot) = perm.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let successor = perm
        .iter()
        .rposition(|&x| x > perm[pivot])
        .unwrap_or(pivot + 1);
    perm.swap(pivot, successor);
    perm[pivot + 1..].reverse();
    true
}

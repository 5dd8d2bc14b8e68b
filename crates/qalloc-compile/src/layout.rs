//! Logical-to-physical qubit mappings.

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, AllocResult};

/// Logical -> physical placement: `mapping[logical] = physical`.
pub type Mapping = Vec<u32>;

/// Physical -> logical placement, the inverse of a [`Mapping`].
pub type Assignment = Vec<u32>;

/// The identity mapping on `n` qubits.
pub fn identity(n: u32) -> Mapping {
    (0..n).collect()
}

/// Check whether `values` is a permutation of `0..values.len()`.
pub fn is_permutation(values: &[u32]) -> bool {
    let mut seen = vec![false; values.len()];
    values.iter().all(|&v| match seen.get_mut(v as usize) {
        Some(slot) if !*slot => {
            *slot = true;
            true
        }
        _ => false,
    })
}

/// Invert a mapping. The mapping must be a permutation.
pub fn assignment_of(mapping: &[u32]) -> Assignment {
    let mut assignment = vec![0; mapping.len()];
    for (logical, &physical) in mapping.iter().enumerate() {
        assignment[physical as usize] = logical as u32;
    }
    assignment
}

/// Validate that `mapping` is a permutation of `0..size`.
pub fn check_mapping(mapping: &[u32], size: u32) -> AllocResult<()> {
    if mapping.len() != size as usize {
        return Err(AllocError::InvalidMapping {
            mapping: mapping.to_vec(),
            reason: format!("expected {size} entries, found {}", mapping.len()),
        });
    }
    if !is_permutation(mapping) {
        return Err(AllocError::InvalidMapping {
            mapping: mapping.to_vec(),
            reason: "not a permutation".into(),
        });
    }
    Ok(())
}

/// A mapping together with its inverse, kept consistent under swaps.
///
/// ```
/// use qalloc_compile::Layout;
///
/// let mut layout = Layout::trivial(3);
/// layout.swap_physical(0, 2);
/// assert_eq!(layout.physical(0), 2);
/// assert_eq!(layout.logical(0), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    mapping: Mapping,
    assignment: Assignment,
}

impl Layout {
    /// Create the identity layout on `n` qubits.
    pub fn trivial(n: u32) -> Self {
        Self {
            mapping: identity(n),
            assignment: identity(n),
        }
    }

    /// Create a layout from a logical -> physical mapping.
    pub fn from_mapping(mapping: Mapping) -> AllocResult<Self> {
        check_mapping(&mapping, mapping.len() as u32)?;
        let assignment = assignment_of(&mapping);
        Ok(Self {
            mapping,
            assignment,
        })
    }

    /// Number of qubits.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Check whether the layout has no qubits.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Physical qubit holding `logical`.
    #[inline]
    pub fn physical(&self, logical: u32) -> u32 {
        self.mapping[logical as usize]
    }

    /// Logical qubit held by `physical`.
    #[inline]
    pub fn logical(&self, physical: u32) -> u32 {
        self.assignment[physical as usize]
    }

    /// The logical -> physical mapping.
    pub fn mapping(&self) -> &[u32] {
        &self.mapping
    }

    /// The physical -> logical assignment.
    pub fn assignment(&self) -> &[u32] {
        &self.assignment
    }

    /// Consume the layout, returning its mapping.
    pub fn into_mapping(self) -> Mapping {
        self.mapping
    }

    /// Exchange the physical positions of two logical qubits.
    pub fn swap_logical(&mut self, a: u32, b: u32) {
        let (pa, pb) = (self.physical(a), self.physical(b));
        self.mapping.swap(a as usize, b as usize);
        self.assignment.swap(pa as usize, pb as usize);
        debug_assert!(self.is_consistent());
    }

    /// Exchange the logical qubits held by two physical qubits.
    pub fn swap_physical(&mut self, u: u32, v: u32) {
        let (a, b) = (self.logical(u), self.logical(v));
        self.swap_logical(a, b);
    }

    fn is_consistent(&self) -> bool {
        self.mapping
            .iter()
            .enumerate()
            .all(|(l, &p)| self.assignment[p as usize] == l as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_check() {
        assert!(is_permutation(&[2, 0, 1]));
        assert!(is_permutation(&[]));
        assert!(!is_permutation(&[0, 0, 1]));
        assert!(!is_permutation(&[0, 3, 1]));
    }

    #[test]
    fn test_assignment_is_inverse() {
        let mapping = vec![2, 0, 3, 1];
        let assignment = assignment_of(&mapping);
        assert_eq!(assignment, vec![1, 3, 0, 2]);
        for (l, &p) in mapping.iter().enumerate() {
            assert_eq!(assignment[p as usize], l as u32);
        }
    }

    #[test]
    fn test_layout_swaps() {
        let mut layout = Layout::from_mapping(vec![1, 2, 0]).unwrap();
        layout.swap_logical(0, 2);
        assert_eq!(layout.mapping(), &[0, 2, 1]);
        assert_eq!(layout.assignment(), &[0, 2, 1]);

        layout.swap_physical(0, 1);
        assert_eq!(layout.logical(0), 2);
        assert_eq!(layout.physical(0), 1);
    }

    #[test]
    fn test_check_mapping() {
        assert!(check_mapping(&[1, 0], 2).is_ok());
        assert!(matches!(
            check_mapping(&[1, 0], 3),
            Err(AllocError::InvalidMapping { .. })
        ));
        assert!(Layout::from_mapping(vec![0, 0]).is_err());
    }
}

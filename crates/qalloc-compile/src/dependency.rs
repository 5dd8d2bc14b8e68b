//! Two-qubit dependencies consumed by the allocation strategies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, AllocResult};

/// Opaque handle back into the program a dependency came from.
pub type CallPoint = u32;

/// An ordered pair of logical qubits: control `from`, target `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dep {
    pub from: u32,
    pub to: u32,
}

impl Dep {
    /// Create a dependency pair.
    pub const fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.from, self.to)
    }
}

/// The dependencies of one program statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub call_point: CallPoint,
    pub deps: Vec<Dep>,
}

impl Dependency {
    /// A dependency group holding exactly one pair.
    pub fn single(call_point: CallPoint, from: u32, to: u32) -> Self {
        Self {
            call_point,
            deps: vec![Dep::new(from, to)],
        }
    }

    /// The group's only pair.
    ///
    /// Every strategy handles one pair per call point; any other count is
    /// reported as an error.
    pub fn dep(&self) -> AllocResult<Dep> {
        match self.deps.as_slice() {
            [dep] => Ok(*dep),
            [] => Err(AllocError::EmptyDependency(self.call_point)),
            more => Err(AllocError::MultipleDependencies {
                call_point: self.call_point,
                count: more.len(),
            }),
        }
    }
}

/// Ordered sequence of dependencies.
///
/// ```
/// use qalloc_compile::DependencySet;
///
/// let deps = DependencySet::parse("cx 0 1\n# comment\n2 1\n").unwrap();
/// assert_eq!(deps.len(), 2);
/// assert_eq!(deps.get(1).unwrap().call_point, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencySet {
    deps: Vec<Dependency>,
}

impl DependencySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set of single-pair dependencies, numbering call points by
    /// position.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (from, to))| Dependency::single(i as CallPoint, from, to))
            .collect()
    }

    /// Parse a plain-text dependency list.
    ///
    /// One dependency per line, either `cx <a> <b>` or `<a> <b>`. Blank lines
    /// and lines starting with `#` are skipped. Call points count the parsed
    /// dependencies from zero.
    pub fn parse(source: &str) -> AllocResult<Self> {
        let mut set = Self::new();
        for (index, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
                .filter(|f| !f.is_empty())
                .collect();
            let operands = match fields.as_slice() {
                [name, a, b] if name.eq_ignore_ascii_case("cx") => [*a, *b],
                [a, b] => [*a, *b],
                _ => {
                    return Err(AllocError::Parse {
                        line: index + 1,
                        message: format!("expected 'cx <a> <b>' or '<a> <b>', got '{line}'"),
                    });
                }
            };

            let [from, to] = operands.map(|op| parse_qubit(op, index + 1));
            let call_point = set.len() as CallPoint;
            set.push(Dependency::single(call_point, from?, to?));
        }
        Ok(set)
    }

    /// Append a dependency.
    pub fn push(&mut self, dependency: Dependency) {
        self.deps.push(dependency);
    }

    /// Number of dependencies.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Dependency at position `index`.
    pub fn get(&self, index: usize) -> Option<&Dependency> {
        self.deps.get(index)
    }

    /// Iterate over the dependencies in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.deps.iter()
    }

    /// Smallest device size able to hold every qubit named here.
    pub fn num_qubits(&self) -> u32 {
        self.deps
            .iter()
            .flat_map(|d| &d.deps)
            .map(|d| d.from.max(d.to) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check every group for a single, in-range pair of distinct qubits.
    pub fn validate(&self, num_qubits: u32) -> AllocResult<()> {
        for dependency in &self.deps {
            let dep = dependency.dep()?;
            for qubit in [dep.from, dep.to] {
                if qubit >= num_qubits {
                    return Err(AllocError::QubitOutOfRange {
                        qubit,
                        size: num_qubits,
                    });
                }
            }
            if dep.from == dep.to {
                return Err(AllocError::SelfDependency {
                    call_point: dependency.call_point,
                    qubit: dep.from,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Dependency> for DependencySet {
    fn from_iter<I: IntoIterator<Item = Dependency>>(iter: I) -> Self {
        Self {
            deps: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.deps.iter()
    }
}

/// Parse `q[3]`, `q3` or `3` into a qubit index.
fn parse_qubit(operand: &str, line: usize) -> AllocResult<u32> {
    let digits = operand
        .trim_end_matches(']')
        .trim_start_matches(|c: char| !c.is_ascii_digit());
    digits.parse::<u32>().map_err(|_| AllocError::Parse {
        line,
        message: format!("invalid qubit '{operand}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dep() {
        let d = Dependency::single(4, 1, 2);
        assert_eq!(d.dep().unwrap(), Dep::new(1, 2));

        let multi = Dependency {
            call_point: 7,
            deps: vec![Dep::new(0, 1), Dep::new(1, 2)],
        };
        assert!(matches!(
            multi.dep(),
            Err(AllocError::MultipleDependencies {
                call_point: 7,
                count: 2
            })
        ));

        let empty = Dependency {
            call_point: 3,
            deps: vec![],
        };
        assert!(matches!(empty.dep(), Err(AllocError::EmptyDependency(3))));
    }

    #[test]
    fn test_parse_text() {
        let deps = DependencySet::parse("cx q[0], q[1];\n\n# skip\n2 4\nCX 3 0\n").unwrap();
        let pairs: Vec<_> = deps.iter().map(|d| d.dep().unwrap()).collect();
        assert_eq!(pairs, vec![Dep::new(0, 1), Dep::new(2, 4), Dep::new(3, 0)]);
        assert_eq!(deps.get(2).unwrap().call_point, 2);
        assert_eq!(deps.num_qubits(), 5);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            DependencySet::parse("0 1\nh 0\n"),
            Err(AllocError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            DependencySet::parse("cx a b\n"),
            Err(AllocError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(DependencySet::from_pairs([(0, 1), (1, 2)]).validate(3).is_ok());
        assert!(matches!(
            DependencySet::from_pairs([(0, 5)]).validate(3),
            Err(AllocError::QubitOutOfRange { qubit: 5, size: 3 })
        ));
        assert!(matches!(
            DependencySet::from_pairs([(0, 1), (2, 2)]).validate(3),
            Err(AllocError::SelfDependency {
                call_point: 1,
                qubit: 2
            })
        ));
    }

    #[test]
    fn test_json_shape() {
        let deps = DependencySet::from_pairs([(0, 1)]);
        let json = serde_json::to_string(&deps).unwrap();
        assert_eq!(json, r#"[{"call_point":0,"deps":[{"from":0,"to":1}]}]"#);
        let back: DependencySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deps);
    }
}

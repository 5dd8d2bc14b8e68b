//! Loader for the textual architecture description.
//!
//! The format is line based:
//!
//! ```text
//! 1 5          <register-count> <total-qubits>
//! q 5          <register-name> <register-size>, once per register
//! q[0] q[1]    one directed edge per line: control, then target
//! q[1] q[2]
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Edge endpoints may
//! also be written as bare global indices.

use std::path::Path;

use tracing::debug;

use crate::error::{ArchError, ArchResult};
use crate::graph::{ArchGraph, Register};

impl ArchGraph {
    /// Parse an architecture description.
    ///
    /// ```
    /// use qalloc_arch::ArchGraph;
    ///
    /// let g = ArchGraph::parse("1 3\nq 3\nq[0] q[1]\nq[2] q[1]\n").unwrap();
    /// assert_eq!(g.size(), 3);
    /// assert!(g.is_reverse_edge(1, 2));
    /// ```
    pub fn parse(source: &str) -> ArchResult<Self> {
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (header_line, header) = lines.next().ok_or(ArchError::Parse {
            line: 1,
            message: "missing header".into(),
        })?;
        let [num_registers, num_qubits] = parse_pair(header_line, header)?;

        let mut registers = Vec::new();
        for _ in 0..num_registers {
            let (line, text) = lines.next().ok_or(ArchError::Parse {
                line: header_line,
                message: format!("expected {num_registers} register declarations"),
            })?;
            let mut parts = text.split_whitespace();
            let (Some(name), Some(size), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(parse_error(line, "expected '<name> <size>'"));
            };
            let size = size
                .parse::<u32>()
                .map_err(|_| parse_error(line, format!("invalid register size '{size}'")))?;
            registers.push(Register::new(name, size));
        }

        let declared = registers
            .iter()
            .try_fold(0u32, |total, r| total.checked_add(r.size))
            .ok_or_else(|| parse_error(header_line, "register sizes overflow"))?;
        if declared != num_qubits {
            return Err(parse_error(
                header_line,
                format!("registers declare {declared} qubits, header says {num_qubits}"),
            ));
        }

        let mut edges = Vec::new();
        for (line, text) in lines {
            let mut parts = text.split_whitespace();
            let (Some(from), Some(to), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(parse_error(line, "expected '<control> <target>'"));
            };
            let from = resolve(&registers, line, from)?;
            let to = resolve(&registers, line, to)?;
            edges.push((from, to));
        }

        debug!(
            "Parsed architecture: {} qubits, {} registers, {} edges",
            num_qubits,
            registers.len(),
            edges.len()
        );

        Self::with_registers(num_qubits, edges, registers)
    }

    /// Read and parse an architecture description from disk.
    pub fn from_file(path: impl AsRef<Path>) -> ArchResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ArchError {
    ArchError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_pair(line: usize, text: &str) -> ArchResult<[u32; 2]> {
    let values: Vec<u32> = text
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| parse_error(line, format!("expected two integers, got '{text}'")))?;
    match values.as_slice() {
        &[a, b] => Ok([a, b]),
        _ => Err(parse_error(line, format!("expected two integers, got '{text}'"))),
    }
}

/// Resolve `reg[i]` (or a bare global index) to a global qubit index.
fn resolve(registers: &[Register], line: usize, label: &str) -> ArchResult<u32> {
    if let Ok(index) = label.parse::<u32>() {
        return Ok(index);
    }

    let (name, rest) = label
        .split_once('[')
        .ok_or_else(|| parse_error(line, format!("malformed qubit label '{label}'")))?;
    let index = rest
        .strip_suffix(']')
        .and_then(|i| i.parse::<u32>().ok())
        .ok_or_else(|| parse_error(line, format!("malformed qubit label '{label}'")))?;

    let mut offset = 0;
    for reg in registers {
        if reg.name == name {
            if index >= reg.size {
                return Err(parse_error(
                    line,
                    format!("index {index} out of range for register '{name}'"),
                ));
            }
            return Ok(offset + index);
        }
        offset += reg.size;
    }

    Err(parse_error(line, format!("unknown register '{name}'")))
}

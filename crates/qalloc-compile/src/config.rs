//! Allocator configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `QALLOC_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, AllocResult};

/// Costs charged for the gates an allocation strategy inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModel {
    /// Cost of one swap
    #[serde(default = "default_swap_cost")]
    pub swap: u32,

    /// Cost of running a CNOT against the edge direction
    #[serde(default = "default_rev_cost")]
    pub reverse: u32,

    /// Cost of a bridged CNOT between qubits at distance 2
    #[serde(default = "default_lcx_cost")]
    pub long_cnot: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            swap: default_swap_cost(),
            reverse: default_rev_cost(),
            long_cnot: default_lcx_cost(),
        }
    }
}

/// Narrow a cost accumulated in 64 bits to the reported width.
pub(crate) fn narrow_cost(total: u64) -> AllocResult<u32> {
    u32::try_from(total).map_err(|_| AllocError::CostOverflow(total))
}

/// Allocation strategy selected by [`AllocConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocatorKind {
    /// Exact dynamic programming over all mappings.
    #[default]
    Dynprog,
    /// Greedy scheduling over the circuit graph.
    Greedy,
    /// Fixed mapping with swap chains and bridges in program order.
    PathGuided,
    /// Fixed mapping, no swaps.
    Direct,
}

impl AllocatorKind {
    /// Every strategy, in the order they are listed to users.
    pub const ALL: [Self; 4] = [Self::Dynprog, Self::Greedy, Self::PathGuided, Self::Direct];

    /// Name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynprog => "dynprog",
            Self::Greedy => "greedy",
            Self::PathGuided => "path-guided",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for AllocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocatorKind {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynprog" | "optimal" | "dp" => Ok(Self::Dynprog),
            "greedy" => Ok(Self::Greedy),
            "path-guided" | "path_guided" | "pathguided" => Ok(Self::PathGuided),
            "direct" => Ok(Self::Direct),
            other => Err(AllocError::Config(format!(
                "unknown allocator '{other}' (expected one of: dynprog, greedy, path-guided, direct)"
            ))),
        }
    }
}

/// How the fixed-mapping strategies pick their initial mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingFinderKind {
    /// Place frequently interacting qubits close together.
    #[default]
    Weighted,
    /// Logical qubit `i` on physical qubit `i`.
    Identity,
}

impl fmt::Display for MappingFinderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weighted => f.write_str("weighted"),
            Self::Identity => f.write_str("identity"),
        }
    }
}

impl FromStr for MappingFinderKind {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weighted" => Ok(Self::Weighted),
            "identity" | "trivial" => Ok(Self::Identity),
            other => Err(AllocError::Config(format!(
                "unknown mapping finder '{other}' (expected weighted or identity)"
            ))),
        }
    }
}

/// Complete allocator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocConfig {
    /// Strategy to run
    #[serde(default)]
    pub allocator: AllocatorKind,

    /// Gate costs
    #[serde(default)]
    pub costs: CostModel,

    /// Initial mapping finder for the greedy and fixed-mapping strategies
    #[serde(default)]
    pub mapping: MappingFinderKind,

    /// Replay and check the solution after allocation
    #[serde(default = "default_true")]
    pub verify: bool,
}

// Default value functions
fn default_swap_cost() -> u32 {
    7
}

fn default_rev_cost() -> u32 {
    4
}

fn default_lcx_cost() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self {
            allocator: AllocatorKind::default(),
            costs: CostModel::default(),
            mapping: MappingFinderKind::default(),
            verify: default_true(),
        }
    }
}

impl AllocConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AllocResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AllocError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> AllocResult<Self> {
        let config: Self =
            serde_yaml_ng::from_str(contents).map_err(|e| AllocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to YAML.
    pub fn to_yaml(&self) -> AllocResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| AllocError::Config(e.to_string()))
    }

    /// Override values from the process environment.
    pub fn apply_env(&mut self) -> AllocResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override values from `lookup`, which maps variable names to values.
    ///
    /// Recognized variables: `QALLOC_SWAP_COST`, `QALLOC_REV_COST`,
    /// `QALLOC_LCX_COST` and `QALLOC_ALLOCATOR`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> AllocResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cost = |key: &str| -> AllocResult<Option<u32>> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u32>()
                        .map_err(|_| AllocError::Config(format!("{key}: invalid cost '{raw}'")))
                })
                .transpose()
        };

        if let Some(swap) = cost("QALLOC_SWAP_COST")? {
            self.costs.swap = swap;
        }
        if let Some(reverse) = cost("QALLOC_REV_COST")? {
            self.costs.reverse = reverse;
        }
        if let Some(long_cnot) = cost("QALLOC_LCX_COST")? {
            self.costs.long_cnot = long_cnot;
        }
        if let Some(allocator) = lookup("QALLOC_ALLOCATOR") {
            self.allocator = allocator.parse()?;
        }

        self.validate()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AllocResult<()> {
        if self.costs.swap == 0 {
            return Err(AllocError::Config("swap cost must be non-zero".into()));
        }
        Ok(())
    }
}

//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use qalloc_arch::{ArchGraph, BUILTIN_ARCHITECTURES};
use qalloc_compile::{DependencySet, Program};

/// What an input file describes.
pub enum Input {
    Program(Program),
    Dependencies(DependencySet),
}

/// Load an architecture from a file path or a built-in name.
pub fn load_arch(spec: &str) -> Result<ArchGraph> {
    if Path::new(spec).is_file() {
        debug!("Loading architecture file {}", spec);
        return ArchGraph::from_file(spec)
            .with_context(|| format!("Failed to load architecture file: {spec}"));
    }
    ArchGraph::by_name(spec).with_context(|| {
        format!(
            "'{spec}' is neither a file nor a built-in architecture ({})",
            BUILTIN_ARCHITECTURES.join(", ")
        )
    })
}

/// Load a JSON program or a plain-text dependency list.
pub fn load_input(path: &str) -> Result<Input> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");
    debug!("Loading input {} ({} bytes)", path, source.len());

    match ext.to_lowercase().as_str() {
        "json" => Program::from_json(&source)
            .map(Input::Program)
            .with_context(|| format!("Invalid program: {path}")),
        _ => DependencySet::parse(&source)
            .map(Input::Dependencies)
            .with_context(|| format!("Invalid dependency list: {path}")),
    }
}

/// Parse a comma separated list of qubit indices.
pub fn parse_placement(list: &str) -> Result<Vec<u32>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("Invalid qubit index '{s}' in '{list}'"))
        })
        .collect()
}

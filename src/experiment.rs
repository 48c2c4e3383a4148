//! Experiment configuration encoded in result directory names.
//!
//! Example: `2nodes_blocking_strong`  =>  2 nodes, 24 processors,
//! communication `blocking`, scaling `strong`.

use crate::diagnostics;

use std::path::Path;

/// Cores per cluster node used when nothing else is configured.
pub const DEFAULT_CORES_PER_NODE: u32 = 12;

pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentConfig {
    pub nodes: u32,
    pub processors: u32,
    /// Taken verbatim; expected `blocking` or `nonblocking`.
    pub comm_mode: String,
    /// Taken verbatim; expected `strong` or `weak`.
    pub scaling: String,
}

impl ExperimentConfig {
    /// Parse a directory basename such as `4nodes_nonblocking_weak`.
    pub fn from_dir_name(name: &str, cores_per_node: u32) -> Self {
        let mut parts = name.split('_');

        let nodes = match parts.next() {
            Some(prefix) if prefix.contains("node") => {
                let digits = prefix.replace("nodes", "").replace("node", "");
                digits.trim().parse().unwrap_or_else(|_| {
                    diagnostics::warn(format!(
                        "cannot read a node count from directory name {:?}",
                        name
                    ));
                    0
                })
            }
            _ => 0,
        };

        let comm_mode = parts.next().unwrap_or(UNKNOWN).to_string();
        let scaling = parts.next().unwrap_or(UNKNOWN).to_string();

        Self {
            nodes,
            processors: nodes.saturating_mul(cores_per_node),
            comm_mode,
            scaling,
        }
    }

    /// Parse the basename of `dir`.
    pub fn from_path(dir: &Path, cores_per_node: u32) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_dir_name(&name, cores_per_node)
    }
}

//! Run settings. Paths and tunables are passed in rather than read from
//! globals so the core can be driven from tests with synthetic inputs.

use std::path::PathBuf;

pub const DEFAULT_BASE_DIR: &str = "data/tau_results";

/// Name of the TAU summary file inside each experiment directory.
pub const REPORT_FILE_NAME: &str = "profile_summary.txt";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the experiment directory tree.
    pub base_dir: PathBuf,
    /// Where the per-group CSV files are written.
    pub out_dir: PathBuf,
    /// Optional HTML chart report.
    pub html: Option<PathBuf>,
    pub cores_per_node: u32,
    /// Seconds of cross-node spread before a function is flagged.
    pub imbalance_threshold: f64,
}

//! Discovery and parsing of experiment result directories.

use crate::Result;
use crate::diagnostics;
use crate::experiment::ExperimentConfig;
use crate::model::ExperimentResult;
use crate::profile::{ParsedReport, ReportParser};
use crate::settings::{REPORT_FILE_NAME, Settings};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories under `base_dir` that contain a report file, sorted by path.
pub fn find_report_dirs(base_dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(base_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                diagnostics::warn(format!("cannot walk {}: {}", base_dir.display(), err));
                None
            }
        })
        .filter(|e| e.file_type().is_file() && e.file_name() == REPORT_FILE_NAME)
        .filter_map(|e| e.path().parent().map(Path::to_path_buf))
        .collect();
    dirs.sort();
    dirs
}

/// Parse the report in `dir`. Missing or unreadable files are warned and skipped.
pub fn load_report(dir: &Path, parser: &ReportParser) -> Option<ParsedReport> {
    let path = dir.join(REPORT_FILE_NAME);
    if !path.exists() {
        diagnostics::warn(format!("{} not found", path.display()));
        return None;
    }
    match parser.parse_file(&path) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            diagnostics::warn(format!("{:#}", e));
            None
        }
    }
}

/// Parse every experiment under the base directory, printing a short summary
/// per experiment. Reports without a usable total time are skipped.
pub fn collect_results(settings: &Settings) -> Result<Vec<ExperimentResult>> {
    let parser = ReportParser::new(settings.imbalance_threshold)?;

    let mut out = Vec::new();
    for dir in find_report_dirs(&settings.base_dir) {
        println!("\nParsing: {}", dir.join(REPORT_FILE_NAME).display());

        let Some(parsed) = load_report(&dir, &parser) else {
            continue;
        };

        for imb in &parsed.imbalances {
            diagnostics::warn(format!(
                "load imbalance detected for {}: min {:.3}s ({}), max {:.3}s ({}), diff {:.3}s",
                imb.function,
                imb.min,
                imb.min_node,
                imb.max,
                imb.max_node,
                imb.diff()
            ));
        }

        let Some(record) = parsed.into_record() else {
            diagnostics::warn(format!(
                "could not parse timing data in {}",
                dir.display()
            ));
            continue;
        };

        let config = ExperimentConfig::from_path(&dir, settings.cores_per_node);
        let total = record.total_time;
        let comm = record.communication_time();
        let comp = record.computation_time();
        println!(
            "  Config: {} nodes, {} procs, {}, {}",
            config.nodes, config.processors, config.comm_mode, config.scaling
        );
        println!("  Total Time:         {:.3} s", total);
        println!(
            "  Communication Time: {:.3} s ({:.1}%)",
            comm,
            comm / total * 100.0
        );
        println!(
            "  Computation Time:   {:.3} s ({:.1}%)",
            comp,
            comp / total * 100.0
        );

        out.push(ExperimentResult {
            dir,
            config,
            record,
        });
    }

    Ok(out)
}

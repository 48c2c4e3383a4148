use crate::Result;
use crate::diagnostics;
use crate::model::{Scaling, ScalingGroup, ScalingReport};

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Strong-scaling CSV row, formatted for presentation.
#[derive(Debug, Serialize)]
struct StrongCsvRow {
    processors: u32,
    nodes: u32,
    total_time: String,
    comm_time: String,
    comp_time: String,
    comm_percent: String,
    speedup: String,
    efficiency: String,
}

/// Weak-scaling CSV row; there is no speedup column.
#[derive(Debug, Serialize)]
struct WeakCsvRow {
    processors: u32,
    nodes: u32,
    total_time: String,
    comm_time: String,
    comp_time: String,
    comm_percent: String,
    efficiency: String,
}

fn time(v: f64) -> String {
    format!("{:.4}", v)
}

fn percent(v: f64) -> String {
    format!("{:.2}", v)
}

/// Write one group as CSV with a header row.
pub fn write_group<W: io::Write>(group: &ScalingGroup, out: W) -> Result<()> {
    let mut wtr = ::csv::Writer::from_writer(out);
    for r in &group.rows {
        match group.scaling {
            Scaling::Strong => wtr.serialize(StrongCsvRow {
                processors: r.processors,
                nodes: r.nodes,
                total_time: time(r.total_time),
                comm_time: time(r.comm_time),
                comp_time: time(r.comp_time),
                comm_percent: percent(r.comm_percent),
                speedup: percent(r.speedup.unwrap_or_default()),
                efficiency: percent(r.efficiency),
            })?,
            Scaling::Weak => wtr.serialize(WeakCsvRow {
                processors: r.processors,
                nodes: r.nodes,
                total_time: time(r.total_time),
                comm_time: time(r.comm_time),
                comp_time: time(r.comp_time),
                comm_percent: percent(r.comm_percent),
                efficiency: percent(r.efficiency),
            })?,
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write `<group>.csv` into `out_dir` for every non-empty group.
/// Returns the paths written.
pub fn write_group_csvs(report: &ScalingReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).with_context(|| {
        diagnostics::error_message(format!("create output dir {}", out_dir.display()))
    })?;

    let mut written = Vec::new();
    for group in report.groups.iter().filter(|g| !g.rows.is_empty()) {
        let path = out_dir.join(format!("{}.csv", group.name()));
        let file = fs::File::create(&path).with_context(|| {
            diagnostics::error_message(format!("create {}", path.display()))
        })?;
        write_group(group, file)
            .with_context(|| diagnostics::error_message(format!("write {}", path.display())))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommMode, ScalingRow};
    use pretty_assertions::assert_eq;

    fn row(processors: u32, total_time: f64, speedup: Option<f64>, efficiency: f64) -> ScalingRow {
        ScalingRow {
            processors,
            nodes: processors / 12,
            total_time,
            comm_time: 5.5,
            comp_time: total_time - 5.5,
            comm_percent: 5.5 / total_time * 100.0,
            speedup,
            efficiency,
        }
    }

    fn group(scaling: Scaling, rows: Vec<ScalingRow>) -> ScalingGroup {
        ScalingGroup {
            comm_mode: CommMode::Blocking,
            scaling,
            rows,
        }
    }

    #[test]
    fn strong_csv_layout() {
        let g = group(
            Scaling::Strong,
            vec![
                row(12, 100.0, Some(1.0), 100.0),
                row(24, 55.0, Some(100.0 / 55.0), 100.0 / 55.0 / 2.0 * 100.0),
            ],
        );
        let mut buf = Vec::new();
        write_group(&g, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "processors,nodes,total_time,comm_time,comp_time,comm_percent,speedup,efficiency\n\
             12,1,100.0000,5.5000,94.5000,5.50,1.00,100.00\n\
             24,2,55.0000,5.5000,49.5000,10.00,1.82,90.91\n"
        );
    }

    #[test]
    fn weak_csv_has_no_speedup() {
        let g = group(Scaling::Weak, vec![row(12, 120.0, None, 100.0 / 120.0 * 100.0)]);
        let mut buf = Vec::new();
        write_group(&g, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "processors,nodes,total_time,comm_time,comp_time,comm_percent,efficiency\n\
             12,1,120.0000,5.5000,114.5000,4.58,83.33\n"
        );
    }

    #[test]
    fn empty_groups_write_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let report = ScalingReport {
            experiments: 1,
            groups: vec![
                group(Scaling::Strong, vec![row(12, 10.0, Some(1.0), 100.0)]),
                group(Scaling::Weak, vec![]),
            ],
        };
        let out = tmp.path().join("out");
        let written = write_group_csvs(&report, &out).unwrap();
        assert_eq!(written, vec![out.join("blocking_strong.csv")]);
        assert!(!out.join("blocking_weak.csv").exists());
    }
}

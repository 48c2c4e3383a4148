use crate::Result;
use crate::model::{CommMode, Scaling, ScalingReport, ScalingRow};

use std::fmt::{self, Write};

const RULE_WIDTH: usize = 80;

fn banner(out: &mut String, title: &str) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\n{title}\n{rule}")
}

fn rows_in_order(
    report: &ScalingReport,
    scaling: Scaling,
) -> impl Iterator<Item = (CommMode, &ScalingRow)> {
    [CommMode::Blocking, CommMode::Nonblocking]
        .into_iter()
        .filter_map(move |mode| report.group(mode, scaling))
        .flat_map(|g| g.rows.iter().map(move |r| (g.comm_mode, r)))
}

/// Strong and weak comparison tables, blocking rows before non-blocking.
pub fn comparison_tables(report: &ScalingReport) -> Result<String> {
    let mut out = String::new();

    banner(&mut out, "STRONG SCALING COMPARISON")?;
    writeln!(
        out,
        "{:<8} {:<12} {:<12} {:<12} {:<12} {:<10} {:<10} {:<10}",
        "Procs", "Type", "Total (s)", "Comm (s)", "Comp (s)", "Comm %", "Speedup", "Eff %"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for (mode, r) in rows_in_order(report, Scaling::Strong) {
        writeln!(
            out,
            "{:<8} {:<12} {:<12.4} {:<12.4} {:<12.4} {:<10.2} {:<10.2} {:<10.2}",
            r.processors,
            mode.as_str(),
            r.total_time,
            r.comm_time,
            r.comp_time,
            r.comm_percent,
            r.speedup.unwrap_or_default(),
            r.efficiency
        )?;
    }

    banner(&mut out, "WEAK SCALING COMPARISON")?;
    writeln!(
        out,
        "{:<8} {:<12} {:<12} {:<12} {:<12} {:<10} {:<10}",
        "Procs", "Type", "Total (s)", "Comm (s)", "Comp (s)", "Comm %", "Eff %"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for (mode, r) in rows_in_order(report, Scaling::Weak) {
        writeln!(
            out,
            "{:<8} {:<12} {:<12.4} {:<12.4} {:<12.4} {:<10.2} {:<10.2}",
            r.processors,
            mode.as_str(),
            r.total_time,
            r.comm_time,
            r.comp_time,
            r.comm_percent,
            r.efficiency
        )?;
    }

    Ok(out)
}

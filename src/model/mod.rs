//! Aggregation model: group parsed experiments and derive scaling metrics.

use crate::Result;
use crate::diagnostics;
use crate::experiment::ExperimentConfig;
use crate::profile::ProfileRecord;

use anyhow::bail;
use serde::Serialize;
use std::path::PathBuf;

/// One parsed report joined with the configuration of its directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResult {
    pub dir: PathBuf,
    pub config: ExperimentConfig,
    pub record: ProfileRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommMode {
    Blocking,
    Nonblocking,
}

impl CommMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CommMode::Blocking => "blocking",
            CommMode::Nonblocking => "nonblocking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    Strong,
    Weak,
}

impl Scaling {
    pub fn as_str(self) -> &'static str {
        match self {
            Scaling::Strong => "strong",
            Scaling::Weak => "weak",
        }
    }
}

/// A row of a scaling table, relative to its group's baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingRow {
    pub processors: u32,
    pub nodes: u32,
    pub total_time: f64,
    pub comm_time: f64,
    pub comp_time: f64,
    pub comm_percent: f64,
    /// Only meaningful for strong scaling.
    pub speedup: Option<f64>,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingGroup {
    pub comm_mode: CommMode,
    pub scaling: Scaling,
    /// Ascending by processor count; the first row is the baseline.
    pub rows: Vec<ScalingRow>,
}

impl ScalingGroup {
    /// File stem used for this group's outputs, e.g. `nonblocking_weak`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.comm_mode.as_str(), self.scaling.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingReport {
    pub experiments: usize,
    /// Always four groups: blocking/nonblocking x strong/weak.
    pub groups: Vec<ScalingGroup>,
}

impl ScalingReport {
    pub fn group(&self, comm_mode: CommMode, scaling: Scaling) -> Option<&ScalingGroup> {
        self.groups
            .iter()
            .find(|g| g.comm_mode == comm_mode && g.scaling == scaling)
    }
}

const GROUPS: [(CommMode, Scaling); 4] = [
    (CommMode::Blocking, Scaling::Strong),
    (CommMode::Blocking, Scaling::Weak),
    (CommMode::Nonblocking, Scaling::Strong),
    (CommMode::Nonblocking, Scaling::Weak),
];

/// Build the scaling report. Performs:
/// - partition by (communication mode, scaling mode); other labels are dropped
/// - sort each group by processor count (stable)
/// - derive speedup/efficiency against the group's first row
///
/// Fails if a time or processor count that is used as a divisor is zero.
pub fn build_scaling_report(results: &[ExperimentResult]) -> Result<ScalingReport> {
    let mut groups = Vec::with_capacity(GROUPS.len());

    for (comm_mode, scaling) in GROUPS {
        let mut members: Vec<&ExperimentResult> = results
            .iter()
            .filter(|r| {
                r.config.comm_mode == comm_mode.as_str() && r.config.scaling == scaling.as_str()
            })
            .collect();
        members.sort_by_key(|r| r.config.processors);

        let rows = match members.first() {
            Some(baseline) => members
                .iter()
                .map(|r| scaling_row(baseline, r, scaling))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        groups.push(ScalingGroup {
            comm_mode,
            scaling,
            rows,
        });
    }

    Ok(ScalingReport {
        experiments: results.len(),
        groups,
    })
}

fn scaling_row(
    baseline: &ExperimentResult,
    result: &ExperimentResult,
    scaling: Scaling,
) -> Result<ScalingRow> {
    let total = result.record.total_time;
    let base_total = baseline.record.total_time;

    for (what, t) in [("total time", total), ("baseline total time", base_total)] {
        if t == 0.0 {
            bail!(
                "{}",
                diagnostics::error_message(format!(
                    "{} is zero for {}; empty reports must be filtered before aggregation",
                    what,
                    result.dir.display()
                ))
            );
        }
    }

    let (speedup, efficiency) = match scaling {
        Scaling::Strong => {
            if baseline.config.processors == 0 {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "baseline {} has zero processors; cannot derive strong-scaling efficiency",
                        baseline.dir.display()
                    ))
                );
            }
            let speedup = base_total / total;
            let ratio = f64::from(result.config.processors) / f64::from(baseline.config.processors);
            (Some(speedup), speedup / ratio * 100.0)
        }
        Scaling::Weak => (None, base_total / total * 100.0),
    };

    let comm_time = result.record.communication_time();
    Ok(ScalingRow {
        processors: result.config.processors,
        nodes: result.config.nodes,
        total_time: total,
        comm_time,
        comp_time: result.record.computation_time(),
        comm_percent: comm_time / total * 100.0,
        speedup,
        efficiency,
    })
}

use crate::Result;
use crate::diagnostics;
use crate::profile::primitives::{self, ROOT_FUNCTION};
use crate::profile::record::{Imbalance, NodeSample, ProfileRecord};
use crate::profile::time::parse_time_value;

use anyhow::Context;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Spread (seconds) above which a tracked function is reported as imbalanced.
pub const DEFAULT_IMBALANCE_THRESHOLD: f64 = 1.0;

const MEAN_SUMMARY_HEADER: &str = "FUNCTION SUMMARY (mean):";
const SUMMARY_MARKER: &str = "FUNCTION SUMMARY";

/// Where the scanner currently is in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Outside,
    /// Inside a per-node table; carries the node/context/thread label.
    Node(String),
    Mean,
}

/// Result of parsing one report text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub record: ProfileRecord,
    pub imbalances: Vec<Imbalance>,
}

impl ParsedReport {
    /// The record, or `None` when no total time could be extracted.
    pub fn into_record(self) -> Option<ProfileRecord> {
        (self.record.total_time > 0.0).then_some(self.record)
    }
}

/// A whitespace-split row of a TAU function table.
///
/// Columns: %Time Exclusive Inclusive #Call #Subrs Inclusive/call Name...
struct DataLine<'a> {
    exclusive: &'a str,
    inclusive: &'a str,
    name: String,
}

impl<'a> DataLine<'a> {
    fn recognise(line: &'a str) -> Option<Self> {
        let t = line.trim();
        // Headers, unit rows and separators.
        if t.is_empty() || t.starts_with('-') || t.starts_with("%Time") || line.contains("msec") {
            return None;
        }
        let fields: Vec<&str> = t.split_whitespace().collect();
        if fields.len() < 7 {
            return None;
        }
        Some(DataLine {
            exclusive: fields[1],
            inclusive: fields[2],
            name: fields[6..].join(" "),
        })
    }
}

/// Parser for TAU `pprof`-style `profile_summary.txt` reports.
#[derive(Debug, Clone)]
pub struct ReportParser {
    node_marker: Regex,
    node_id: Regex,
    imbalance_threshold: f64,
}

impl ReportParser {
    pub fn new(imbalance_threshold: f64) -> Result<Self> {
        Ok(Self {
            node_marker: Regex::new(r"^(NODE \d+;CONTEXT \d+;THREAD \d+):")?,
            node_id: Regex::new(r"NODE (\d+);CONTEXT")?,
            imbalance_threshold,
        })
    }

    /// Read and parse a report file.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedReport> {
        let text = fs::read_to_string(path).with_context(|| {
            diagnostics::error_message(format!("read report {}", path.display()))
        })?;
        Ok(self.parse(&text))
    }

    /// Parse report text. Unparseable time fields are warned about and skipped.
    pub fn parse(&self, text: &str) -> ParsedReport {
        let mut total_time = 0.0;
        let mut function_times: BTreeMap<&'static str, f64> = BTreeMap::new();
        let mut samples: Vec<NodeSample> = Vec::new();

        let mut section = Section::Outside;
        for (lineno, line) in text.lines().enumerate() {
            let lno = lineno + 1;

            if let Some(next) = self.transition(&section, line) {
                section = next;
                continue;
            }

            if section == Section::Outside {
                continue;
            }
            let Some(row) = DataLine::recognise(line) else {
                continue;
            };

            match &section {
                Section::Outside => {}
                Section::Node(node) => {
                    if !primitives::is_tracked(&row.name) {
                        continue;
                    }
                    match parse_time_value(row.inclusive) {
                        Ok(inclusive) => samples.push(NodeSample {
                            function: row.name,
                            node: node.clone(),
                            inclusive,
                        }),
                        Err(e) => skip_line(lno, line, &e),
                    }
                }
                Section::Mean => {
                    if row.name == ROOT_FUNCTION {
                        match parse_time_value(row.inclusive) {
                            Ok(t) => total_time = t,
                            Err(e) => skip_line(lno, line, &e),
                        }
                    }
                    if let Some(p) = primitives::match_primitive(&row.name) {
                        match parse_time_value(row.exclusive) {
                            Ok(t) => {
                                function_times.insert(p.name, t);
                            }
                            Err(e) => skip_line(lno, line, &e),
                        }
                    }
                }
            }
        }

        let process_count = self
            .node_id
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect::<BTreeSet<_>>()
            .len();

        ParsedReport {
            record: ProfileRecord {
                total_time,
                function_times,
                process_count,
            },
            imbalances: detect_imbalance(&samples, self.imbalance_threshold),
        }
    }

    /// Section change triggered by `line`, if it is a section header.
    fn transition(&self, section: &Section, line: &str) -> Option<Section> {
        if line.contains(MEAN_SUMMARY_HEADER) {
            return Some(Section::Mean);
        }
        match section {
            // Only a non-mean summary header closes the mean table.
            Section::Mean => (line.contains(SUMMARY_MARKER)
                && !line.to_lowercase().contains("mean"))
            .then_some(Section::Outside),
            Section::Outside | Section::Node(_) => {
                if let Some(caps) = self.node_marker.captures(line) {
                    let label = caps.get(1).map_or("", |m| m.as_str());
                    return Some(Section::Node(label.to_string()));
                }
                line.contains(SUMMARY_MARKER).then_some(Section::Outside)
            }
        }
    }
}

fn skip_line(lno: usize, line: &str, err: &anyhow::Error) {
    diagnostics::warn(format!(
        "skipping line {}: {:?} ({:#})",
        lno,
        line.trim(),
        err
    ));
}

/// Functions whose inclusive time spreads across nodes by more than `threshold`.
pub fn detect_imbalance(samples: &[NodeSample], threshold: f64) -> Vec<Imbalance> {
    let mut by_function: BTreeMap<&str, Vec<&NodeSample>> = BTreeMap::new();
    for s in samples {
        by_function.entry(s.function.as_str()).or_default().push(s);
    }

    let mut out = Vec::new();
    for (function, group) in by_function {
        if group.len() < 2 {
            continue;
        }
        let by_time = |a: &&&NodeSample, b: &&&NodeSample| a.inclusive.total_cmp(&b.inclusive);
        let (Some(lo), Some(hi)) = (group.iter().min_by(by_time), group.iter().max_by(by_time))
        else {
            continue;
        };
        if hi.inclusive - lo.inclusive > threshold {
            out.push(Imbalance {
                function: function.to_string(),
                min: lo.inclusive,
                min_node: lo.node.clone(),
                max: hi.inclusive,
                max_node: hi.node.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "\
Reading Profile files in profile.*

NODE 0;CONTEXT 0;THREAD 0:
---------------------------------------------------------------------------------------
%Time    Exclusive    Inclusive       #Call      #Subrs  Inclusive Name
              msec   total msec                          usec/call
---------------------------------------------------------------------------------------
100.0          450       12,300           1        3402   12300000 main
 40.0        4,920        4,920        1600           0       3075 MPI_Send()
  1.0          120          120           1           0     120000 MPI_Init()

NODE 1;CONTEXT 0;THREAD 0:
---------------------------------------------------------------------------------------
%Time    Exclusive    Inclusive       #Call      #Subrs  Inclusive Name
              msec   total msec                          usec/call
---------------------------------------------------------------------------------------
100.0          460       12,800           1        3402   12800000 main
 38.0        4,850        4,850        1600           0       3031 MPI_Send()
  1.0          118          118           1           0     118000 MPI_Init()

FUNCTION SUMMARY (total):
---------------------------------------------------------------------------------------
%Time    Exclusive    Inclusive       #Call      #Subrs  Inclusive Name
              msec   total msec                          usec/call
---------------------------------------------------------------------------------------
100.0          910       25,100           2        6804   12550000 main
 39.0        9,770        9,770        3200           0       3053 MPI_Send()

FUNCTION SUMMARY (mean):
---------------------------------------------------------------------------------------
%Time    Exclusive    Inclusive       #Call      #Subrs  Inclusive Name
              msec   total msec                          usec/call
---------------------------------------------------------------------------------------
100.0          455       12,550           1        3402   12550000 main
 39.0        4,885        4,885        1600           0       3053 MPI_Send()
  8.0        1,000        1,000        1600           0        625 MPI_Recv()
  1.0          119          119           1           0     119000 MPI_Init()
  0.5           60           60           1           0      60000 MPI_Finalize()
  0.1           12           12           3           0       4000 MPI Collective Sync
";

    fn parser() -> ReportParser {
        ReportParser::new(DEFAULT_IMBALANCE_THRESHOLD).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn mean_summary_drives_the_record() {
        let rec = parser().parse(REPORT).into_record().unwrap();
        assert!(close(rec.total_time, 12.55));
        assert_eq!(rec.process_count, 2);

        let names: Vec<&str> = rec.function_times.keys().copied().collect();
        assert_eq!(
            names,
            vec![
                "MPI Collective Sync",
                "MPI_Finalize()",
                "MPI_Init()",
                "MPI_Recv()",
                "MPI_Send()"
            ]
        );
        assert!(close(rec.function_times["MPI_Send()"], 4.885));
        assert!(close(rec.function_times["MPI_Init()"], 0.119));
    }

    #[test]
    fn communication_and_computation_are_derived() {
        let rec = parser().parse(REPORT).into_record().unwrap();
        let comm = 4.885 + 1.0 + 0.012;
        assert!(close(rec.communication_time(), comm));
        assert!(close(rec.computation_time(), 12.55 - comm));
    }

    #[test]
    fn total_section_does_not_leak_into_record() {
        // The (total) table has main at 25,100 ms; only the mean counts.
        let rec = parser().parse(REPORT).into_record().unwrap();
        assert!(rec.total_time < 20.0);
    }

    #[test]
    fn imbalance_above_threshold_is_reported() {
        // main differs by 0.5s across nodes, below the default threshold.
        assert!(parser().parse(REPORT).imbalances.is_empty());

        let strict = ReportParser::new(0.25).unwrap();
        let found = strict.parse(REPORT).imbalances;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].function, "main");
        assert!(close(found[0].min, 12.3));
        assert!(close(found[0].max, 12.8));
        assert!(close(found[0].diff(), 0.5));
        assert_eq!(found[0].min_node, "NODE 0;CONTEXT 0;THREAD 0");
        assert_eq!(found[0].max_node, "NODE 1;CONTEXT 0;THREAD 0");
    }

    fn sample(function: &str, node: &str, inclusive: f64) -> NodeSample {
        NodeSample {
            function: function.to_string(),
            node: node.to_string(),
            inclusive,
        }
    }

    #[test]
    fn imbalance_threshold_is_strict() {
        let exactly = vec![sample("main", "n0", 10.0), sample("main", "n1", 11.0)];
        assert!(detect_imbalance(&exactly, 1.0).is_empty());

        let over = vec![sample("main", "n0", 10.0), sample("main", "n1", 11.5)];
        let found = detect_imbalance(&over, 1.0);
        assert_eq!(
            found,
            vec![Imbalance {
                function: "main".to_string(),
                min: 10.0,
                min_node: "n0".to_string(),
                max: 11.5,
                max_node: "n1".to_string(),
            }]
        );
    }

    #[test]
    fn single_sample_is_never_imbalanced() {
        let one = vec![sample("MPI_Send()", "n0", 100.0)];
        assert!(detect_imbalance(&one, 1.0).is_empty());
    }

    #[test]
    fn report_without_node_markers_still_parses() {
        let text = "\
FUNCTION SUMMARY (mean):
%Time    Exclusive    Inclusive       #Call      #Subrs  Inclusive Name
100.0          455     1:02.500           1        3402   12550000 main
 10.0        2,000        2,000          10           0     200000 MPI_Barrier()
";
        let rec = parser().parse(text).into_record().unwrap();
        assert_eq!(rec.process_count, 0);
        assert!(close(rec.total_time, 62.5));
        assert!(close(rec.communication_time(), 2.0));
    }

    #[test]
    fn missing_main_yields_no_record() {
        let text = "\
FUNCTION SUMMARY (mean):
 10.0        2,000        2,000          10           0     200000 MPI_Barrier()
";
        let parsed = parser().parse(text);
        assert_eq!(parsed.record.total_time, 0.0);
        assert!(parsed.into_record().is_none());
    }

    #[test]
    fn bad_node_sample_is_dropped_and_the_rest_still_count() {
        let text = "\
NODE 0;CONTEXT 0;THREAD 0:
100.0          455       bogus           1        3402   12550000 main
NODE 1;CONTEXT 0;THREAD 0:
100.0          455       10,000          1        3402   10000000 main
NODE 2;CONTEXT 0;THREAD 0:
100.0          455       12,500          1        3402   12500000 main
FUNCTION SUMMARY (mean):
100.0          455     1:02:03.5          1        3402   12550000 main
";
        let parsed = parser().parse(text);
        assert_eq!(
            parsed.imbalances,
            vec![Imbalance {
                function: "main".to_string(),
                min: 10.0,
                min_node: "NODE 1;CONTEXT 0;THREAD 0".to_string(),
                max: 12.5,
                max_node: "NODE 2;CONTEXT 0;THREAD 0".to_string(),
            }]
        );
        let rec = parsed.into_record().unwrap();
        assert_eq!(rec.process_count, 3);
        assert!(close(rec.total_time, 3723.5));
    }

    #[test]
    fn bad_time_fields_skip_the_line_only() {
        let text = "\
FUNCTION SUMMARY (mean):
100.0          455       bogus           1        3402   12550000 main
 10.0        oops        2,000          10           0     200000 MPI_Barrier()
 10.0        1,500        1,500          10           0     150000 MPI_Recv()
";
        let parsed = parser().parse(text);
        assert_eq!(parsed.record.total_time, 0.0);
        assert!(!parsed.record.function_times.contains_key("MPI_Barrier()"));
        assert!(close(parsed.record.function_times["MPI_Recv()"], 1.5));
    }

    #[test]
    fn non_mean_summary_closes_the_mean_section() {
        let text = "\
FUNCTION SUMMARY (mean):
100.0          455       10,000           1        3402   12550000 main
FUNCTION SUMMARY (std. dev.):
100.0          455       99,000           1        3402   12550000 main
 10.0        7,000        7,000          10           0     200000 MPI_Send()
";
        let rec = parser().parse(text).into_record().unwrap();
        assert!(close(rec.total_time, 10.0));
        assert!(rec.function_times.is_empty());
    }

    #[test]
    fn node_lines_inside_mean_section_are_not_samples() {
        let text = "\
FUNCTION SUMMARY (mean):
100.0          455       10,000           1        3402   12550000 main
NODE 3;CONTEXT 0;THREAD 0:
 10.0        7,000        7,000          10           0     200000 MPI_Send()
";
        let rec = parser().parse(text).into_record().unwrap();
        assert_eq!(rec.process_count, 1);
        assert!(close(rec.function_times["MPI_Send()"], 7.0));
    }

    #[test]
    fn function_names_with_spaces_are_joined() {
        let text = "\
FUNCTION SUMMARY (mean):
100.0          455       10,000           1        3402   12550000 main
  0.1           12           12           3           0       4000 MPI Collective Sync
  0.1            5            5           3           0       4000 MPI_Send() [THROTTLED]
";
        let rec = parser().parse(text).into_record().unwrap();
        assert!(close(rec.function_times["MPI Collective Sync"], 0.012));
        assert!(close(rec.function_times["MPI_Send()"], 0.005));
    }

    #[test]
    fn parsing_is_deterministic() {
        let p = parser();
        assert_eq!(p.parse(REPORT), p.parse(REPORT));
    }

    #[test]
    fn parse_file_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parser().parse_file(&dir.path().join("nope.txt")).is_err());

        let path = dir.path().join("profile_summary.txt");
        std::fs::write(&path, REPORT).unwrap();
        let rec = parser().parse_file(&path).unwrap().into_record().unwrap();
        assert_eq!(rec.process_count, 2);
    }
}

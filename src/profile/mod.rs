//! Parsing of TAU `profile_summary.txt` reports.

pub mod parse;
pub mod primitives;
pub mod record;
pub mod time;

pub use parse::{DEFAULT_IMBALANCE_THRESHOLD, ParsedReport, ReportParser};
pub use record::ProfileRecord;

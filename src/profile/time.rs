//! TAU time fields.
//!
//! TAU prints a time column in one of three shapes depending on magnitude:
//! - `12,345`       milliseconds, optional thousands separators
//! - `1:23.456`     minutes:seconds
//! - `1:02:03.5`    hours:minutes:seconds
//!
//! All of them normalise to seconds.

use crate::Result;
use crate::diagnostics;

use anyhow::{Context, bail};

/// Parse a TAU time field into seconds.
pub fn parse_time_value(raw: &str) -> Result<f64> {
    let s = raw.trim();

    let secs = if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [m, sec] => whole(m, s)? * 60.0 + seconds(sec, s)?,
            [h, m, sec] => whole(h, s)? * 3600.0 + whole(m, s)? * 60.0 + seconds(sec, s)?,
            _ => bail!(
                "{}",
                diagnostics::error_message(format!(
                    "time value {:?} has {} colon-separated parts",
                    s,
                    parts.len()
                ))
            ),
        }
    } else {
        let ms: f64 = s.replace(',', "").parse().with_context(|| {
            diagnostics::error_message(format!("bad millisecond time value {:?}", s))
        })?;
        ms / 1000.0
    };

    if !secs.is_finite() || secs < 0.0 {
        bail!(
            "{}",
            diagnostics::error_message(format!("time value {:?} is not a duration", s))
        );
    }
    Ok(secs)
}

fn whole(part: &str, full: &str) -> Result<f64> {
    let v: u64 = part.trim().parse().with_context(|| {
        diagnostics::error_message(format!("bad time component {:?} in {:?}", part, full))
    })?;
    Ok(v as f64)
}

fn seconds(part: &str, full: &str) -> Result<f64> {
    let v: f64 = part.trim().parse().with_context(|| {
        diagnostics::error_message(format!("bad seconds component {:?} in {:?}", part, full))
    })?;
    Ok(v)
}

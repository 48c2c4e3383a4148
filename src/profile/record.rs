use crate::profile::primitives::{self, PrimitiveKind};

use std::collections::BTreeMap;

/// Timing extracted from one `profile_summary.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    /// Mean inclusive time of `main`, in seconds.
    pub total_time: f64,
    /// Mean exclusive time per recognised primitive, in seconds.
    pub function_times: BTreeMap<&'static str, f64>,
    /// Distinct `NODE <n>` ids seen in the report.
    pub process_count: usize,
}

impl ProfileRecord {
    /// Sum of primitive times, leaving out init/finalize overhead.
    pub fn communication_time(&self) -> f64 {
        self.function_times
            .iter()
            .filter(|(name, _)| {
                primitives::primitive(name).map(|p| p.kind) != Some(PrimitiveKind::Lifecycle)
            })
            .map(|(_, t)| *t)
            .sum()
    }

    /// May be negative when the summary double-counts time; not clamped.
    pub fn computation_time(&self) -> f64 {
        self.total_time - self.communication_time()
    }
}

/// Inclusive time of one tracked function on one node/context/thread.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSample {
    pub function: String,
    pub node: String,
    pub inclusive: f64,
}

/// Cross-node spread of a tracked function above the configured threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Imbalance {
    pub function: String,
    pub min: f64,
    pub min_node: String,
    pub max: f64,
    pub max_node: String,
}

impl Imbalance {
    pub fn diff(&self) -> f64 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_finalize_are_not_communication() {
        let mut function_times = BTreeMap::new();
        function_times.insert("MPI_Send()", 1.5);
        function_times.insert("MPI_Recv()", 2.0);
        function_times.insert("MPI_Init()", 10.0);
        function_times.insert("MPI_Finalize()", 3.0);
        let rec = ProfileRecord {
            total_time: 5.0,
            function_times,
            process_count: 2,
        };
        assert!((rec.communication_time() - 3.5).abs() < 1e-9);
        assert!((rec.computation_time() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn computation_time_can_go_negative() {
        let mut function_times = BTreeMap::new();
        function_times.insert("MPI_Barrier()", 8.0);
        let rec = ProfileRecord {
            total_time: 5.0,
            function_times,
            process_count: 1,
        };
        assert!((rec.computation_time() + 3.0).abs() < 1e-9);
    }
}

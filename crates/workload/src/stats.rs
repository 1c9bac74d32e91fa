//! Workload contention statistics.

use serde::{Deserialize, Serialize};
use skewbench_types::{ObjectId, Workload};
use std::collections::HashMap;

/// Summary of how a synthesized workload touches the address space.
///
/// Computed from the exact representation (approximate sets cannot be
/// enumerated). Consumed by external reporting; nothing on the scheduling
/// path depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadStats {
    /// Number of transactions.
    pub num_txn: usize,
    /// Total accesses across all transactions, after deduplication.
    pub total_accesses: u64,
    /// Distinct objects touched at least once.
    pub distinct_objects: usize,
    /// Fraction of accesses that are writes.
    pub write_fraction: f64,
    /// Mean accesses per transaction.
    pub mean_accesses_per_txn: f64,
    /// Touch count of the most-touched object.
    pub hottest_object_touches: u64,
}

impl WorkloadStats {
    /// Collect statistics from an exact workload.
    ///
    /// Returns `None` if any transaction carries approximate sets.
    pub fn collect(workload: &Workload) -> Option<WorkloadStats> {
        let mut touches: HashMap<ObjectId, u64> = HashMap::new();
        let mut total_accesses = 0u64;
        let mut total_writes = 0u64;

        for transaction in workload {
            let reads = transaction.read_set().as_exact()?;
            let writes = transaction.write_set().as_exact()?;

            for id in reads.iter().chain(writes.iter()) {
                *touches.entry(id).or_insert(0) += 1;
            }
            total_accesses += (reads.len() + writes.len()) as u64;
            total_writes += writes.len() as u64;
        }

        let num_txn = workload.len();
        Some(WorkloadStats {
            num_txn,
            total_accesses,
            distinct_objects: touches.len(),
            write_fraction: if total_accesses > 0 {
                total_writes as f64 / total_accesses as f64
            } else {
                0.0
            },
            mean_accesses_per_txn: if num_txn > 0 {
                total_accesses as f64 / num_txn as f64
            } else {
                0.0
            },
            hottest_object_touches: touches.values().copied().max().unwrap_or(0),
        })
    }

    /// Ratio of the hottest object's touches to the mean touches per
    /// touched object. Higher means more contention concentrated on few
    /// objects; one means perfectly even.
    pub fn skew_ratio(&self) -> f64 {
        if self.distinct_objects == 0 {
            return 0.0;
        }
        let mean = self.total_accesses as f64 / self.distinct_objects as f64;
        self.hottest_object_touches as f64 / mean
    }
}

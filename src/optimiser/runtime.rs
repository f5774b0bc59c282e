//! Best-effort per-scenario runtime accumulator shared by all workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Min, max, total and count of scenario runtimes.
///
/// Each field is updated independently with relaxed atomics, so a snapshot
/// taken while workers are running may mix values from different moments.
/// Read it after the workers have joined for exact figures.
#[derive(Debug)]
pub struct RuntimeStats {
    min_ns: AtomicU64,
    max_ns: AtomicU64,
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for RuntimeStats {
    fn default() -> Self {
        Self {
            min_ns: AtomicU64::new(u64::MAX),
            max_ns: AtomicU64::new(0),
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }
}

impl RuntimeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, elapsed: Duration) {
        let ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.min_ns.fetch_min(ns, Ordering::Relaxed);
        self.max_ns.fetch_max(ns, Ordering::Relaxed);
        self.total_ns.fetch_add(ns, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> RuntimeSummary {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            return RuntimeSummary::default();
        }
        let total = self.total_ns.load(Ordering::Relaxed);
        RuntimeSummary {
            min: Duration::from_nanos(self.min_ns.load(Ordering::Relaxed)),
            max: Duration::from_nanos(self.max_ns.load(Ordering::Relaxed)),
            mean: Duration::from_nanos(total / count),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RuntimeSummary {
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub count: u64,
}

impl RuntimeSummary {
    /// Extrapolated wall-clock time for `total_scenarios` on `workers` threads.
    ///
    /// Divides by `workers - 1`, floored at one so a single worker does not
    /// divide by zero.
    pub fn estimate_total(&self, total_scenarios: u64, workers: usize) -> Duration {
        let divisor = workers.saturating_sub(1).max(1) as f64;
        Duration::from_secs_f64(total_scenarios as f64 * self.mean.as_secs_f64() / divisor)
    }
}

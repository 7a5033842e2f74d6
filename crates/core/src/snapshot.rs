use chrono::{DateTime, Utc};
use serde::Serialize;

/// A point-in-time view of host load, published once per tick.
///
/// Snapshots are immutable once published; consumers only ever see a
/// complete one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSnapshot {
    /// Tick number that produced this snapshot (0 = nothing sampled yet).
    pub sequence: u64,
    /// Wall-clock time of the tick.
    pub sampled_at: Option<DateTime<Utc>>,
    /// Average busy time across all logical processors (0.0 – 100.0).
    pub cpu_percent: f64,
    /// Active + wired memory as a share of physical memory (0.0 – 100.0).
    pub memory_percent: f64,
    /// Transmit rate in bytes/second, summed over non-loopback interfaces.
    pub upload_bytes_per_sec: f64,
    /// Receive rate in bytes/second, summed over non-loopback interfaces.
    pub download_bytes_per_sec: f64,
    pub cpu_history: Vec<f64>,
    pub memory_history: Vec<f64>,
    pub upload_history: Vec<f64>,
    pub download_history: Vec<f64>,
}

impl MetricSnapshot {
    /// `true` until the first tick has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence == 0
    }
}

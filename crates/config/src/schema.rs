use pulse_core::MAX_HISTORY_COUNT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure parsed from `pulse.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Sampling cadence and history depth.
    pub sampler: SamplerConfig,
    /// Network throughput accounting.
    pub network: NetworkConfig,
    /// How the binary prints snapshots.
    pub output: OutputConfig,
}

/// Sampling scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Tick period in milliseconds.
    pub interval_ms: u64,
    /// Samples retained per metric history.
    pub history_len: usize,
}

impl SamplerConfig {
    /// Tick period; never zero.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            history_len: MAX_HISTORY_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interfaces whose name starts with this prefix are left out of the totals.
    pub loopback_prefix: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            loopback_prefix: "lo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Snapshot rendering on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per tick.
    #[default]
    Text,
    /// One JSON object per tick.
    Json,
}

//! Raw counters → rates and percentages.
//!
//! The free functions are pure; [`DeltaEngine`] owns the previous samples
//! they are compared against.

use crate::cpu::RawCpuSample;
use crate::memory::RawMemorySample;
use crate::network::RawNetworkSample;

/// Counter reads for one tick; `None` marks a counter that was unavailable.
#[derive(Debug, Clone, Default)]
pub struct Readings {
    pub cpu:     Option<RawCpuSample>,
    pub memory:  Option<RawMemorySample>,
    pub network: Option<RawNetworkSample>,
}

/// Derived values for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub cpu_percent:    f64,
    pub memory_percent: f64,
    pub rates:          NetworkRates,
}

/// Throughput in bytes/second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetworkRates {
    pub upload:   f64,
    pub download: f64,
}

/// Mean busy share of all processors between two samples (0.0 – 100.0).
///
/// Processors with no elapsed ticks contribute 0 but still count in the
/// divisor. Samples with different processor counts are not comparable
/// and yield 0.
pub fn cpu_percent(previous: &RawCpuSample, current: &RawCpuSample) -> f64 {
    let count = current.processors.len();
    if count == 0 || previous.processors.len() != count {
        return 0.0;
    }

    let total: f64 = previous
        .processors
        .iter()
        .zip(&current.processors)
        .map(|(prev, curr)| {
            let user = curr.user.saturating_sub(prev.user);
            let system = curr.system.saturating_sub(prev.system);
            let idle = curr.idle.saturating_sub(prev.idle);
            let nice = curr.nice.saturating_sub(prev.nice);

            let busy = user.saturating_add(system).saturating_add(nice);
            let ticks = busy.saturating_add(idle);
            if ticks == 0 {
                0.0
            } else {
                busy as f64 / ticks as f64 * 100.0
            }
        })
        .sum();

    total / count as f64
}

/// Share of physical memory that is active or wired (0.0 – 100.0).
pub fn memory_percent(sample: &RawMemorySample) -> f64 {
    if sample.total_physical_bytes == 0 {
        return 0.0;
    }
    sample.used_bytes() as f64 / sample.total_physical_bytes as f64 * 100.0
}

/// Byte rates between two network samples.
///
/// A non-positive interval yields zero rates; a counter that went backwards
/// counts as zero bytes for that direction.
pub fn network_rates(previous: &RawNetworkSample, current: &RawNetworkSample) -> NetworkRates {
    let Some(elapsed) = current.timestamp.checked_duration_since(previous.timestamp) else {
        return NetworkRates::default();
    };
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return NetworkRates::default();
    }

    NetworkRates {
        upload:   current.bytes_out.saturating_sub(previous.bytes_out) as f64 / secs,
        download: current.bytes_in.saturating_sub(previous.bytes_in) as f64 / secs,
    }
}

/// Samples the next tick is compared against.
#[derive(Debug, Default)]
struct PreviousSampleState {
    cpu:     Option<RawCpuSample>,
    network: Option<RawNetworkSample>,
}

/// Turns successive [`Readings`] into [`Metrics`].
///
/// The first reading of each family only establishes a baseline and
/// reports 0.
#[derive(Debug, Default)]
pub struct DeltaEngine {
    previous: PreviousSampleState,
}

impl DeltaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute this tick's metrics and make `readings` the new baseline.
    ///
    /// An unavailable CPU read keeps the old CPU baseline. An unavailable
    /// network read clears the network baseline, so the next tick starts over
    /// instead of reporting a spike.
    pub fn advance(&mut self, readings: Readings) -> Metrics {
        let cpu_percent = match (&self.previous.cpu, &readings.cpu) {
            (Some(prev), Some(curr)) => cpu_percent(prev, curr),
            _ => 0.0,
        };

        let memory_percent = readings.memory.as_ref().map_or(0.0, memory_percent);

        let rates = match (&self.previous.network, &readings.network) {
            (Some(prev), Some(curr)) => network_rates(prev, curr),
            _ => NetworkRates::default(),
        };

        if let Some(cpu) = readings.cpu {
            self.previous.cpu = Some(cpu);
        }
        self.previous.network = readings.network;

        Metrics {
            cpu_percent,
            memory_percent,
            rates,
        }
    }
}

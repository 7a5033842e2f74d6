//! Sampling engine: raw OS counters → CPU / memory / network metrics with
//! bounded per-metric history, published once per tick.
//!
//! Per tick: [`CounterSource`] read → [`DeltaEngine`] transform →
//! history append → [`MetricSnapshot`](pulse_core::MetricSnapshot) publish.

pub mod cpu;
pub mod delta;
pub mod memory;
pub mod network;
pub mod sampler;
pub mod source;

pub use cpu::{CpuTicks, RawCpuSample};
pub use delta::{cpu_percent, memory_percent, network_rates, DeltaEngine, Metrics, NetworkRates, Readings};
pub use memory::RawMemorySample;
pub use network::RawNetworkSample;
pub use sampler::Sampler;
pub use source::{CounterSource, SystemCounters};

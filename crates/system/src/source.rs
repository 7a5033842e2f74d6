use crate::cpu::{self, RawCpuSample};
use crate::memory::{self, RawMemorySample};
use crate::network::{sum_interfaces, RawNetworkSample};
use pulse_core::{PulseError, Result};
use std::time::Instant;
use sysinfo::{Networks, System};

/// Raw OS counters, read without interpretation.
///
/// Every read either returns a complete sample or an error; the scheduler
/// turns errors into zero readings for the tick.
pub trait CounterSource: Send + 'static {
    fn read_cpu_ticks(&mut self) -> Result<RawCpuSample>;

    fn read_memory_stats(&mut self) -> Result<RawMemorySample>;

    fn read_network_counters(&mut self) -> Result<RawNetworkSample>;
}

/// Counters of the local host: procfs for ticks and pages, `sysinfo` for
/// physical memory and network interfaces.
pub struct SystemCounters {
    sys:             System,
    networks:        Networks,
    page_size:       u64,
    loopback_prefix: String,
}

impl SystemCounters {
    pub fn new(loopback_prefix: impl Into<String>) -> Self {
        Self {
            sys:             System::new(),
            networks:        Networks::new_with_refreshed_list(),
            page_size:       memory::page_size(),
            loopback_prefix: loopback_prefix.into(),
        }
    }
}

impl std::fmt::Debug for SystemCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemCounters")
            .field("page_size", &self.page_size)
            .field("loopback_prefix", &self.loopback_prefix)
            .finish_non_exhaustive()
    }
}

impl CounterSource for SystemCounters {
    fn read_cpu_ticks(&mut self) -> Result<RawCpuSample> {
        cpu::read_cpu_ticks()
    }

    fn read_memory_stats(&mut self) -> Result<RawMemorySample> {
        self.sys.refresh_memory();
        memory::read_memory_stats(self.page_size, self.sys.total_memory())
    }

    fn read_network_counters(&mut self) -> Result<RawNetworkSample> {
        // true = forget interfaces that went away since the last refresh
        self.networks.refresh(true);
        let timestamp = Instant::now();

        if self.networks.is_empty() {
            return Err(PulseError::counter("network", "no interfaces enumerated"));
        }

        let interfaces = self.networks.iter().map(|(name, data)| {
            (name.as_str(), data.total_received(), data.total_transmitted())
        });
        Ok(sum_interfaces(interfaces, &self.loopback_prefix, timestamp))
    }
}

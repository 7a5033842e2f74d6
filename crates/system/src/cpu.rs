use pulse_core::{PulseError, Result};

/// Kernel per-processor tick counters.
pub const PROC_STAT: &str = "/proc/stat";

/// Cumulative tick buckets of one logical processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub user:   u64,
    pub system: u64,
    pub idle:   u64,
    pub nice:   u64,
}

/// Tick buckets for every online logical processor, in kernel order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCpuSample {
    pub processors: Vec<CpuTicks>,
}

/// Read per-processor ticks from `/proc/stat`.
pub fn read_cpu_ticks() -> Result<RawCpuSample> {
    let raw = std::fs::read_to_string(PROC_STAT)
        .map_err(|e| PulseError::counter("cpu", format!("cannot read {PROC_STAT}: {e}")))?;
    parse_proc_stat(&raw)
}

/// Parse the `cpuN` lines of `/proc/stat`.
///
/// Linux reports more buckets than the four tracked here: `irq`, `softirq`
/// and `steal` count as system time, `iowait` counts as idle. The aggregate
/// `cpu` line is skipped.
pub fn parse_proc_stat(raw: &str) -> Result<RawCpuSample> {
    let mut processors = Vec::new();

    for line in raw.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else { continue };
        let is_core = label
            .strip_prefix("cpu")
            .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()));
        if !is_core {
            continue;
        }

        let values = fields
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PulseError::counter("cpu", format!("bad {label} line: {e}")))?;
        if values.len() < 4 {
            return Err(PulseError::counter(
                "cpu",
                format!("{label} has {} fields, expected at least 4", values.len()),
            ));
        }

        let field = |i: usize| values.get(i).copied().unwrap_or(0);
        processors.push(CpuTicks {
            user:   field(0),
            nice:   field(1),
            system: field(2)
                .saturating_add(field(5))
                .saturating_add(field(6))
                .saturating_add(field(7)),
            idle:   field(3).saturating_add(field(4)),
        });
    }

    if processors.is_empty() {
        return Err(PulseError::counter("cpu", "no per-processor lines found"));
    }
    Ok(RawCpuSample { processors })
}

use pulse_core::{PulseError, Result};

/// Kernel virtual-memory statistics.
pub const PROC_MEMINFO: &str = "/proc/meminfo";

/// Used when the page size cannot be queried.
const FALLBACK_PAGE_SIZE: u64 = 4096;

/// Self-contained virtual-memory snapshot; no delta against earlier samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawMemorySample {
    pub active_pages:         u64,
    /// Pages the kernel will not reclaim (`Unevictable` on Linux).
    pub wired_pages:          u64,
    pub page_size_bytes:      u64,
    pub total_physical_bytes: u64,
}

impl RawMemorySample {
    /// `(active + wired) * page size`.
    pub fn used_bytes(&self) -> u64 {
        self.active_pages
            .saturating_add(self.wired_pages)
            .saturating_mul(self.page_size_bytes)
    }
}

/// Size of a virtual-memory page in bytes.
#[cfg(unix)]
pub fn page_size() -> u64 {
    // SAFETY: `sysconf` only reads a configuration value.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        FALLBACK_PAGE_SIZE
    }
}

#[cfg(not(unix))]
pub fn page_size() -> u64 {
    FALLBACK_PAGE_SIZE
}

/// Read `/proc/meminfo` and convert it to page counts.
pub fn read_memory_stats(page_size: u64, total_physical_bytes: u64) -> Result<RawMemorySample> {
    let raw = std::fs::read_to_string(PROC_MEMINFO)
        .map_err(|e| PulseError::counter("memory", format!("cannot read {PROC_MEMINFO}: {e}")))?;
    parse_meminfo(&raw, page_size, total_physical_bytes)
}

/// Parse `Active:` and `Unevictable:` (in kB) out of `/proc/meminfo`.
///
/// `Active:` is required; `Unevictable:` is absent on some kernels and
/// counts as zero.
pub fn parse_meminfo(
    raw: &str,
    page_size: u64,
    total_physical_bytes: u64,
) -> Result<RawMemorySample> {
    if page_size == 0 {
        return Err(PulseError::counter("memory", "page size is zero"));
    }

    let mut active_kb = None;
    let mut wired_kb = None;
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("Active:") {
            active_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("Unevictable:") {
            wired_kb = parse_kb(rest);
        }
        if active_kb.is_some() && wired_kb.is_some() {
            break;
        }
    }

    let active_kb =
        active_kb.ok_or_else(|| PulseError::counter("memory", "no `Active:` entry"))?;
    let to_pages = |kb: u64| kb.saturating_mul(1024) / page_size;

    Ok(RawMemorySample {
        active_pages: to_pages(active_kb),
        wired_pages: to_pages(wired_kb.unwrap_or(0)),
        page_size_bytes: page_size,
        total_physical_bytes,
    })
}

fn parse_kb(rest: &str) -> Option<u64> {
    rest.split_whitespace().next()?.parse().ok()
}

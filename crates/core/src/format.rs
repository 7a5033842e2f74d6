/// Format a bytes-per-second rate with base-1024 units (e.g. `"1.5 MB/s"`).
///
/// B/s and KB/s are shown without decimals, MB/s and GB/s with one.
pub fn format_rate(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;

    // `max` also maps NaN to 0.
    let bps = bytes_per_sec.max(0.0);

    if bps < KB {
        format!("{bps:.0} B/s")
    } else if bps < MB {
        format!("{:.0} KB/s", bps / KB)
    } else if bps < GB {
        format!("{:.1} MB/s", bps / MB)
    } else {
        format!("{:.1} GB/s", bps / GB)
    }
}

/// Format a percentage as a whole number, clamped to `0 – 100`.
pub fn format_percent(value: f64) -> String {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) };
    format!("{value:.0}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_rate_bytes() {
        assert_eq!(format_rate(0.0), "0 B/s");
        assert_eq!(format_rate(1023.0), "1023 B/s");
    }

    #[test]
    fn format_rate_kilobytes() {
        assert_eq!(format_rate(1024.0), "1 KB/s");
        assert_eq!(format_rate(20_000.0), "20 KB/s");
    }

    #[test]
    fn format_rate_megabytes() {
        assert_eq!(format_rate(1024.0 * 1024.0), "1.0 MB/s");
        assert_eq!(format_rate(1.5 * 1024.0 * 1024.0), "1.5 MB/s");
    }

    #[test]
    fn format_rate_gigabytes() {
        assert_eq!(format_rate(8.0 * 1024.0 * 1024.0 * 1024.0), "8.0 GB/s");
    }

    #[test]
    fn format_rate_rejects_garbage() {
        assert_eq!(format_rate(-5.0), "0 B/s");
        assert_eq!(format_rate(f64::NAN), "0 B/s");
    }

    #[test]
    fn format_percent_clamps() {
        assert_eq!(format_percent(61.54), "62%");
        assert_eq!(format_percent(140.0), "100%");
        assert_eq!(format_percent(-1.0), "0%");
    }
}

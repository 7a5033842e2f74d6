use std::time::Instant;

/// Cumulative byte counters summed over every non-loopback interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawNetworkSample {
    pub bytes_in:  u64,
    pub bytes_out: u64,
    /// Taken together with the counter read.
    pub timestamp: Instant,
}

impl RawNetworkSample {
    /// Stand-in for a tick where interfaces could not be enumerated.
    pub fn zeroed(timestamp: Instant) -> Self {
        Self {
            bytes_in: 0,
            bytes_out: 0,
            timestamp,
        }
    }
}

/// `true` if `name` identifies the loopback device. An empty prefix matches nothing.
pub fn is_loopback(name: &str, loopback_prefix: &str) -> bool {
    !loopback_prefix.is_empty() && name.starts_with(loopback_prefix)
}

/// Sum `(name, bytes_in, bytes_out)` triples, skipping loopback interfaces.
pub fn sum_interfaces<'a, I>(interfaces: I, loopback_prefix: &str, timestamp: Instant) -> RawNetworkSample
where
    I: IntoIterator<Item = (&'a str, u64, u64)>,
{
    interfaces
        .into_iter()
        .filter(|(name, _, _)| !is_loopback(name, loopback_prefix))
        .fold(RawNetworkSample::zeroed(timestamp), |mut acc, (_, rx, tx)| {
            acc.bytes_in = acc.bytes_in.saturating_add(rx);
            acc.bytes_out = acc.bytes_out.saturating_add(tx);
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_contributes_nothing() {
        let now = Instant::now();
        let sample = sum_interfaces(
            [
                ("lo", 9_000_000, 9_000_000),
                ("eth0", 1_000, 200),
                ("wlan0", 500, 50),
            ],
            "lo",
            now,
        );
        assert_eq!(sample.bytes_in, 1_500);
        assert_eq!(sample.bytes_out, 250);
        assert_eq!(sample.timestamp, now);
    }

    #[test]
    fn only_loopback_sums_to_zero() {
        let sample = sum_interfaces([("lo0", 42, 42)], "lo", Instant::now());
        assert_eq!((sample.bytes_in, sample.bytes_out), (0, 0));
    }

    #[test]
    fn empty_prefix_excludes_nothing() {
        assert!(!is_loopback("lo", ""));
        let sample = sum_interfaces([("lo", 1, 2), ("eth0", 3, 4)], "", Instant::now());
        assert_eq!((sample.bytes_in, sample.bytes_out), (4, 6));
    }
}

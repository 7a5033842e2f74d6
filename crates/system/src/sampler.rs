use crate::delta::{DeltaEngine, Readings};
use crate::source::CounterSource;
use chrono::Utc;
use pulse_core::{History, MetricSnapshot};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Everything a tick mutates: the counter source, the delta baselines and
/// the four metric histories.
struct Pipeline<S> {
    source:   S,
    engine:   DeltaEngine,
    cpu:      History<f64>,
    memory:   History<f64>,
    upload:   History<f64>,
    download: History<f64>,
    sequence: u64,
}

impl<S: CounterSource> Pipeline<S> {
    fn new(source: S, history_len: usize) -> Self {
        Self {
            source,
            engine:   DeltaEngine::new(),
            cpu:      History::new(history_len),
            memory:   History::new(history_len),
            upload:   History::new(history_len),
            download: History::new(history_len),
            sequence: 0,
        }
    }

    /// Read every counter, degrading failures to "unavailable".
    fn read(&mut self) -> Readings {
        Readings {
            cpu: self
                .source
                .read_cpu_ticks()
                .map_err(|e| warn!("CPU reading skipped: {e}"))
                .ok(),
            memory: self
                .source
                .read_memory_stats()
                .map_err(|e| warn!("memory reading skipped: {e}"))
                .ok(),
            network: self
                .source
                .read_network_counters()
                .map_err(|e| warn!("network reading skipped: {e}"))
                .ok(),
        }
    }

    /// One full read → delta → history pass.
    fn tick(&mut self) -> MetricSnapshot {
        let readings = self.read();
        let metrics = self.engine.advance(readings);

        self.cpu.push(metrics.cpu_percent);
        self.memory.push(metrics.memory_percent);
        self.upload.push(metrics.rates.upload);
        self.download.push(metrics.rates.download);
        self.sequence += 1;

        debug!(
            tick = self.sequence,
            cpu = metrics.cpu_percent,
            memory = metrics.memory_percent,
            upload = metrics.rates.upload,
            download = metrics.rates.download,
            "sampled"
        );

        MetricSnapshot {
            sequence:               self.sequence,
            sampled_at:             Some(Utc::now()),
            cpu_percent:            metrics.cpu_percent,
            memory_percent:         metrics.memory_percent,
            upload_bytes_per_sec:   metrics.rates.upload,
            download_bytes_per_sec: metrics.rates.download,
            cpu_history:            self.cpu.to_vec(),
            memory_history:         self.memory.to_vec(),
            upload_history:         self.upload.to_vec(),
            download_history:       self.download.to_vec(),
        }
    }
}

type Publisher = Arc<watch::Sender<Arc<MetricSnapshot>>>;

/// Run one tick and publish its snapshot while still holding the pipeline,
/// so snapshots are published in tick order.
fn run_tick<S: CounterSource>(pipeline: &Mutex<Pipeline<S>>, publisher: &Publisher) -> Arc<MetricSnapshot> {
    let mut pipeline = pipeline.lock().unwrap_or_else(PoisonError::into_inner);
    let snapshot = Arc::new(pipeline.tick());
    publisher.send_replace(Arc::clone(&snapshot));
    snapshot
}

struct Running {
    shutdown: oneshot::Sender<()>,
    task:     JoinHandle<()>,
}

/// Drives the sampling pipeline on a fixed cadence and publishes a
/// [`MetricSnapshot`] after every tick.
///
/// Readers either poll [`latest`](Sampler::latest) or wait on a
/// [`subscribe`](Sampler::subscribe)d receiver. Histories and delta
/// baselines survive `stop`/`start`; only a new `Sampler` resets them.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use pulse_system::{Sampler, SystemCounters};
/// use std::time::Duration;
///
/// let mut sampler = Sampler::new(SystemCounters::new("lo"), Duration::from_secs(1), 50);
/// let mut rx = sampler.subscribe();
/// sampler.start();
/// while rx.changed().await.is_ok() {
///     println!("cpu {:.0}%", rx.borrow().cpu_percent);
/// }
/// # }
/// ```
pub struct Sampler<S> {
    pipeline:  Arc<Mutex<Pipeline<S>>>,
    publisher: Publisher,
    interval:  Duration,
    running:   Option<Running>,
}

impl<S: CounterSource> Sampler<S> {
    /// Create an idle sampler. Nothing is read until [`start`](Self::start)
    /// or [`tick_now`](Self::tick_now).
    pub fn new(source: S, interval: Duration, history_len: usize) -> Self {
        let (publisher, _) = watch::channel(Arc::new(MetricSnapshot::default()));
        Self {
            pipeline: Arc::new(Mutex::new(Pipeline::new(source, history_len))),
            publisher: Arc::new(publisher),
            interval: interval.max(Duration::from_millis(1)),
            running: None,
        }
    }

    /// Receiver that is notified after every published tick.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MetricSnapshot>> {
        self.publisher.subscribe()
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> Arc<MetricSnapshot> {
        Arc::clone(&self.publisher.borrow())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Run one tick immediately, independent of the timer.
    pub fn tick_now(&self) -> Arc<MetricSnapshot> {
        run_tick(&self.pipeline, &self.publisher)
    }

    /// Idle → Running: tick once right away, then every `interval`.
    ///
    /// No-op while already running. Must be called within a Tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("sampler already running");
            return;
        }

        run_tick(&self.pipeline, &self.publisher);

        let (shutdown, mut shutdown_rx) = oneshot::channel();
        let pipeline = Arc::clone(&self.pipeline);
        let publisher = Arc::clone(&self.publisher);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit stop and when the sampler is dropped.
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        run_tick(&pipeline, &publisher);
                    }
                }
            }
        });

        self.running = Some(Running { shutdown, task });
        info!("sampler started ({} ms interval)", period.as_millis());
    }

    /// Running → Idle. A tick already in progress completes; no further
    /// ticks are scheduled. No-op while idle.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        // Err = the task already ended.
        let _ = running.shutdown.send(());
        info!("sampler stopped");
    }
}

impl<S> Drop for Sampler<S> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{CpuTicks, RawCpuSample};
    use crate::memory::RawMemorySample;
    use crate::network::RawNetworkSample;
    use pulse_core::{PulseError, Result};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Instant;

    /// Scripted counters: every read advances a half-busy core and
    /// 1000 B in / 500 B out per simulated second.
    struct FakeSource {
        reads:     Arc<AtomicU64>,
        failing:   bool,
        origin:    Instant,
        cpu_ticks: u64,
        net_ticks: u64,
    }

    impl FakeSource {
        fn new() -> (Self, Arc<AtomicU64>) {
            let reads = Arc::new(AtomicU64::new(0));
            let source = Self {
                reads: Arc::clone(&reads),
                failing: false,
                origin: Instant::now(),
                cpu_ticks: 0,
                net_ticks: 0,
            };
            (source, reads)
        }

        fn failing() -> Self {
            Self { failing: true, ..Self::new().0 }
        }
    }

    impl CounterSource for FakeSource {
        fn read_cpu_ticks(&mut self) -> Result<RawCpuSample> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(PulseError::counter("cpu", "host_processor_info failed"));
            }
            self.cpu_ticks += 100;
            Ok(RawCpuSample {
                processors: vec![CpuTicks {
                    user: self.cpu_ticks,
                    system: 0,
                    idle: self.cpu_ticks,
                    nice: 0,
                }],
            })
        }

        fn read_memory_stats(&mut self) -> Result<RawMemorySample> {
            if self.failing {
                return Err(PulseError::counter("memory", "vm statistics failed"));
            }
            Ok(RawMemorySample {
                active_pages: 1,
                wired_pages: 1,
                page_size_bytes: 1024,
                total_physical_bytes: 4096,
            })
        }

        fn read_network_counters(&mut self) -> Result<RawNetworkSample> {
            if self.failing {
                return Err(PulseError::counter("network", "getifaddrs failed"));
            }
            self.net_ticks += 1;
            Ok(RawNetworkSample {
                bytes_in: 1_000 * self.net_ticks,
                bytes_out: 500 * self.net_ticks,
                timestamp: self.origin + Duration::from_secs(self.net_ticks),
            })
        }
    }

    #[test]
    fn first_tick_is_baseline_then_rates_follow() {
        let mut pipeline = Pipeline::new(FakeSource::new().0, 50);

        let first = pipeline.tick();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.cpu_percent, 0.0);
        assert_eq!(first.memory_percent, 50.0);
        assert_eq!(first.upload_bytes_per_sec, 0.0);
        assert_eq!(first.download_bytes_per_sec, 0.0);

        let second = pipeline.tick();
        assert_eq!(second.cpu_percent, 50.0);
        assert_eq!(second.download_bytes_per_sec, 1_000.0);
        assert_eq!(second.upload_bytes_per_sec, 500.0);
        assert_eq!(second.cpu_history, vec![0.0, 50.0]);
        assert_eq!(second.download_history, vec![0.0, 1_000.0]);
    }

    #[test]
    fn histories_are_bounded() {
        let mut pipeline = Pipeline::new(FakeSource::new().0, 50);
        for n in 1..=75usize {
            let snapshot = pipeline.tick();
            let expected = n.min(50);
            assert_eq!(snapshot.cpu_history.len(), expected);
            assert_eq!(snapshot.memory_history.len(), expected);
            assert_eq!(snapshot.upload_history.len(), expected);
            assert_eq!(snapshot.download_history.len(), expected);
        }
    }

    #[test]
    fn unavailable_counters_degrade_to_zero() {
        let mut pipeline = Pipeline::new(FakeSource::failing(), 50);
        pipeline.tick();
        let snapshot = pipeline.tick();

        assert_eq!(snapshot.sequence, 2);
        assert_eq!(snapshot.cpu_percent, 0.0);
        assert_eq!(snapshot.memory_percent, 0.0);
        assert_eq!(snapshot.upload_bytes_per_sec, 0.0);
        assert_eq!(snapshot.memory_history, vec![0.0, 0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_ticks_immediately() {
        let (source, _) = FakeSource::new();
        let mut sampler = Sampler::new(source, Duration::from_secs(1), 50);
        let rx = sampler.subscribe();
        assert!(sampler.latest().is_empty());

        sampler.start();
        assert!(sampler.is_running());
        assert_eq!(sampler.latest().sequence, 1);
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_arms_a_single_timer() {
        let (source, reads) = FakeSource::new();
        let mut sampler = Sampler::new(source, Duration::from_secs(1), 50);

        sampler.start();
        sampler.start();
        time::sleep(Duration::from_millis(5_500)).await;

        // One immediate tick plus one per elapsed second.
        assert_eq!(reads.load(Ordering::SeqCst), 6);
        assert_eq!(sampler.latest().sequence, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_ticks() {
        let (source, reads) = FakeSource::new();
        let mut sampler = Sampler::new(source, Duration::from_secs(1), 50);

        sampler.stop();
        sampler.start();
        time::sleep(Duration::from_millis(2_500)).await;
        sampler.stop();
        sampler.stop();
        assert!(!sampler.is_running());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_keeps_history() {
        let (source, _) = FakeSource::new();
        let mut sampler = Sampler::new(source, Duration::from_secs(1), 50);

        sampler.start();
        time::sleep(Duration::from_millis(1_500)).await;
        sampler.stop();
        sampler.start();

        let snapshot = sampler.latest();
        assert_eq!(snapshot.sequence, 3);
        assert_eq!(snapshot.cpu_history.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_every_tick() {
        let (source, _) = FakeSource::new();
        let mut sampler = Sampler::new(source, Duration::from_secs(1), 50);
        let mut rx = sampler.subscribe();

        sampler.start();
        rx.borrow_and_update();
        rx.changed().await.unwrap();

        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.sequence, 2);
        assert_eq!(snapshot.download_bytes_per_sec, 1_000.0);
    }
}

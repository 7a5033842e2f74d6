//! pulse: a 1 Hz CPU / memory / network sampler for always-on glance displays.
//!
//! Run with:  `RUST_LOG=debug pulse --format json`

use anyhow::{Context, Result};
use clap::Parser;
use pulse_config::{default_path, load as load_config, OutputFormat};
use pulse_core::{format_percent, format_rate, MetricSnapshot};
use pulse_system::{Sampler, SystemCounters};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pulse", version, about)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/pulse/pulse.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format; overrides the config file.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Exit after this many snapshots.
    #[arg(long)]
    count: Option<u64>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Structured logging on stderr. RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("pulse v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.unwrap_or_else(default_path))?;

    let format = cli.format.map(OutputFormat::from).unwrap_or(config.output.format);
    let counters = SystemCounters::new(config.network.loopback_prefix.clone());
    let mut sampler = Sampler::new(counters, config.sampler.interval(), config.sampler.history_len);
    let mut rx = sampler.subscribe();

    sampler.start();

    let mut printed = 0u64;
    loop {
        let snapshot = rx.borrow_and_update().clone();
        print_snapshot(&snapshot, format)?;
        printed += 1;
        if cli.count.is_some_and(|count| printed >= count) {
            break;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break; // sampler dropped
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    sampler.stop();
    Ok(())
}

fn print_snapshot(snapshot: &MetricSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", render_text(snapshot)),
        OutputFormat::Json => {
            let line = serde_json::to_string(snapshot).context("serialize snapshot")?;
            println!("{line}");
        }
    }
    Ok(())
}

fn render_text(snapshot: &MetricSnapshot) -> String {
    format!(
        "cpu {}  mem {}  ↓ {}  ↑ {}",
        format_percent(snapshot.cpu_percent),
        format_percent(snapshot.memory_percent),
        format_rate(snapshot.download_bytes_per_sec),
        format_rate(snapshot.upload_bytes_per_sec),
    )
}

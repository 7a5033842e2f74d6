use thiserror::Error;

/// Top-level error type used across the entire sampler.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("config error: {0}")]
    Config(String),

    /// An OS counter could not be read this tick.
    #[error("{counter} counters unavailable: {reason}")]
    Counter {
        counter: &'static str,
        reason:  String,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PulseError {
    /// Shorthand for a [`PulseError::Counter`].
    pub fn counter(counter: &'static str, reason: impl Into<String>) -> Self {
        Self::Counter {
            counter,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = PulseError> = std::result::Result<T, E>;

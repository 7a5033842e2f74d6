pub mod error;
pub mod format;
pub mod history;
pub mod snapshot;

pub use error::{PulseError, Result};
pub use format::{format_percent, format_rate};
pub use history::{History, MAX_HISTORY_COUNT};
pub use snapshot::MetricSnapshot;

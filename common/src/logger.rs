use std::fmt;

use chrono::Local;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Local wall-clock stamp, optionally followed by a process prefix:
/// `[2025-01-31 12:00:00][Server]`.
#[derive(Debug, Clone)]
pub struct PrefixedLocalTime {
    prefix: Option<String>,
}

impl PrefixedLocalTime {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }
}

impl FormatTime for PrefixedLocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        match self.prefix {
            Some(ref prefix) => write!(w, "[{}][{}]", timestamp, prefix),
            None => write!(w, "[{}]", timestamp),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_filter`.
/// Calling it twice is harmless: the second registration is ignored.
pub fn init_logger(prefix: Option<String>, default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(PrefixedLocalTime::new(prefix))
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("Logger already initialized: {}", e);
    }
}

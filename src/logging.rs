//! Logging setup using tracing.
//!
//! The subscriber is installed once by the binary. Components never touch
//! it directly: they log inside the [`LogContext`] spans handed to them.

use clap::ValueEnum;
use std::fmt;
use tracing::{info_span, Span};
use tracing_subscriber::EnvFilter;

/// Verbosity names accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warning,
    Notice,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Matching `tracing` directive. `notice` has no equivalent and maps to
    /// `info`.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warn",
            Self::Notice | Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Filter for this crate at this level, dependencies at `warn`.
    pub fn filter(self) -> EnvFilter {
        EnvFilter::new(format!("warn,{}={}", env!("CARGO_CRATE_NAME"), self.directive()))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{}", name)
    }
}

/// Install the global subscriber, writing to stdout.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.filter());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .try_init()
}

/// Spans grouping the log events of each phase of a run.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Startup, configuration and summary.
    pub core: Span,
    /// Target resolution, dialing and aggregation.
    pub scan: Span,
    /// Output sinks.
    pub report: Span,
}

impl LogContext {
    pub fn new() -> Self {
        Self {
            core: info_span!("core"),
            scan: info_span!("scan"),
            report: info_span!("report"),
        }
    }

    /// Context whose spans are all disabled.
    pub fn none() -> Self {
        Self {
            core: Span::none(),
            scan: Span::none(),
            report: Span::none(),
        }
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new()
    }
}

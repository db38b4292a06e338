//! Command-line interface definitions.
//!
//! Uses `clap` derive macros for declarative argument parsing.

mod scan;

pub use scan::{execute, execute_with, RunSummary};

use crate::error::{ConfigError, ConfigResult};
use crate::logging::LogLevel;
use crate::scanner::engine::{EngineConfig, DEFAULT_CONCURRENCY};
use crate::types::ScanRange;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Scan hosts for open TCP ports that are not on their allowlist.
#[derive(Parser, Debug, Clone)]
#[command(name = "portaudit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detects unexpected open TCP ports", long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: PathBuf,

    /// Number of concurrent scan workers
    #[arg(short = 'C', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Ports range to scan on every host (START:END, inclusive)
    #[arg(short = 'p', long, default_value = "1:1024", value_name = "START:END")]
    pub ports: String,

    /// Per-port connect timeout in seconds
    #[arg(short = 't', long, default_value_t = 1, value_name = "SECONDS")]
    pub timeout: u64,

    /// Logging level
    #[arg(short = 'l', long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    /// Parsed port range.
    pub fn scan_range(&self) -> ConfigResult<ScanRange> {
        self.ports
            .parse()
            .map_err(|_| ConfigError::InvalidRange(self.ports.clone()))
    }

    /// Worker pool settings.
    pub fn engine_config(&self) -> ConfigResult<EngineConfig> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }
        if self.timeout == 0 {
            return Err(ConfigError::InvalidTimeout(self.timeout));
        }

        Ok(EngineConfig::default()
            .with_concurrency(self.concurrency)
            .with_timeout(Duration::from_secs(self.timeout)))
    }
}

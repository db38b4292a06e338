//! Error types for portaudit.
//!
//! Uses `thiserror` for ergonomic error definitions. Only configuration and
//! sink initialization errors are fatal; everything raised while scanning
//! or reporting is contained and logged where it happens.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read configuration file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("unable to parse JSON: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("invalid scan ports range {0:?}: expected START:END")]
    InvalidRange(String),

    #[error("invalid concurrency {0}: at least one worker is required")]
    InvalidConcurrency(usize),

    #[error("invalid timeout {0}: must be at least one second")]
    InvalidTimeout(u64),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Failure to turn a configured host into a scan target.
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    #[error("invalid host {0:?}")]
    InvalidHost(String),

    #[error("unable to resolve address for host {0}: {1}")]
    DnsFailed(String, String),

    #[error("no IP addresses found for host {0}")]
    NoAddress(String),
}

/// A dial failure that is neither a refusal nor a timeout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct DialError {
    pub detail: String,
}

impl DialError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Failure to build a sink from its settings.
#[derive(Error, Debug)]
#[error("unable to initialize output {name:?}: {reason}")]
pub struct SinkInitError {
    pub name: String,
    pub reason: String,
}

impl SinkInitError {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single sink while reporting.
#[derive(Error, Debug)]
pub enum SinkReportError {
    #[error("unable to encode report to JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unable to write report file {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("unable to put report file: {0}")]
    Upload(String),
}

/// Errors returned by the scan engine API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("all scan workers have terminated")]
    WorkersGone,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

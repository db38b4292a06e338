//! Dial classifier abstraction and the messages exchanged by the engine.
//!
//! The engine only talks to the network through [`Classifier`], which lets
//! tests drive it with canned outcomes.

use crate::error::DialError;
use crate::types::{Port, Target};
use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a single connect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Handshake completed.
    Open,
    /// Connection actively refused.
    Closed,
    /// No answer before the timeout, probably dropped by a firewall.
    Filtered,
    /// Any other dial failure. Never counted as open.
    Error(DialError),
}

impl Classification {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::Error(e) => write!(f, "error: {}", e),
        }
    }
}

/// Trait for connect-probe implementations.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Attempt one connection to `addr:port`, bounded by `timeout`.
    async fn classify(&self, addr: IpAddr, port: Port, timeout: Duration) -> Classification;
}

/// A candidate (target, port) pair, consumed by exactly one worker.
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub target: Arc<Target>,
    pub port: Port,
}

impl ScanJob {
    pub fn new(target: Arc<Target>, port: Port) -> Self {
        Self { target, port }
    }
}

/// An open port that is not in the host's expected set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Finding {
    pub host: String,
    pub port: Port,
}

impl Finding {
    pub fn new(host: impl Into<String>, port: Port) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

//! # portaudit - unexpected open port detection
//!
//! portaudit connect-scans a set of hosts over a port range and compares
//! what it finds with each host's list of expected ports. Every open port
//! that is not expected is a finding; the findings are handed to the
//! configured outputs once the scan is complete.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portaudit::scanner::{run_scan, EngineConfig, TcpClassifier};
//! use portaudit::types::Port;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut hosts = BTreeMap::new();
//!     hosts.insert("192.168.1.1".to_string(), vec![Port::new(22).unwrap()]);
//!
//!     let outcome = run_scan(
//!         &hosts,
//!         "1:1024".parse().unwrap(),
//!         EngineConfig::default(),
//!         Arc::new(TcpClassifier::new()),
//!         tracing::Span::none(),
//!     )
//!     .await;
//!
//!     for (host, ports) in outcome.report.hosts() {
//!         println!("{}: {:?}", host, ports);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, scan ranges and resolved targets
//! - [`scanner`] - Dial classifier, worker pool and result aggregation
//! - [`config`] - Configuration file decoding and validation
//! - [`output`] - Output sinks (console, S3, local file)
//! - [`logging`] - Subscriber setup and per-phase spans
//! - [`cli`] - Command-line arguments and the audit run
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, DialError, ResolutionError, SinkInitError, SinkReportError};
pub use scanner::{Classification, Classifier, Finding, ScanReport};
pub use types::{Port, ScanRange, Target};

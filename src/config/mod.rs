//! Configuration management for portaudit.
//!
//! Loads the JSON audit file: hosts with their expected ports, and the
//! outputs the report is sent to.

mod settings;

pub use settings::{Config, FileSettings, OutputConfig, S3Settings};

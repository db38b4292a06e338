//! Console output.

use super::Sink;
use crate::error::SinkReportError;
use crate::scanner::ScanReport;
use async_trait::async_trait;
use tracing::warn;

/// Logs one warning line per unexpected open port.
pub struct StdoutSink {
    name: String,
}

impl StdoutSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Report lines, hosts and ports in ascending order.
    pub fn lines(report: &ScanReport) -> Vec<String> {
        let sorted = report.sorted();
        sorted
            .hosts()
            .flat_map(|(host, ports)| {
                ports
                    .iter()
                    .map(move |port| format!("{}: found port {}/tcp open", host, port))
            })
            .collect()
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self, report: &ScanReport) -> Result<(), SinkReportError> {
        for line in Self::lines(report) {
            warn!("{}", line);
        }
        Ok(())
    }
}

//! Output sinks.
//!
//! Every configured output receives the final [`ScanReport`] exactly once
//! after scanning completes. Available sinks: console (`stdout`), object
//! storage (`s3`) and local JSON file (`file`).

mod file;
mod s3;
mod stdout;

pub use file::FileSink;
pub use s3::S3Sink;
pub use stdout::StdoutSink;

use crate::config::OutputConfig;
use crate::error::{SinkInitError, SinkReportError};
use crate::scanner::ScanReport;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info_span, Instrument, Span};

/// A destination for the final report.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Configured name of this output.
    fn name(&self) -> &str;

    /// Report or persist the findings.
    async fn report(&self, report: &ScanReport) -> Result<(), SinkReportError>;
}

/// A boxed sink for dynamic dispatch.
pub type BoxedSink = Box<dyn Sink>;

/// JSON document persisted by the storage sinks.
#[derive(Debug, Serialize)]
pub struct ReportDocument {
    /// Unix timestamp of the report, in seconds.
    pub date: i64,
    /// Host to unexpected open ports, ascending.
    pub hosts: ScanReport,
}

impl ReportDocument {
    pub fn new(report: &ScanReport) -> Self {
        Self {
            date: Utc::now().timestamp(),
            hosts: report.sorted(),
        }
    }
}

/// Instantiate one sink per configured output.
pub fn build_sinks(outputs: &BTreeMap<String, OutputConfig>) -> Result<Vec<BoxedSink>, SinkInitError> {
    outputs
        .iter()
        .map(|(name, settings)| build_sink(name, settings))
        .collect()
}

/// Instantiate the sink selected by `settings`.
pub fn build_sink(name: &str, settings: &OutputConfig) -> Result<BoxedSink, SinkInitError> {
    let sink: BoxedSink = match settings {
        OutputConfig::Stdout => Box::new(StdoutSink::new(name)),
        OutputConfig::S3(s3) => Box::new(S3Sink::new(name, s3)?),
        OutputConfig::File(file) => Box::new(FileSink::new(name, file)?),
    };
    Ok(sink)
}

/// Send `report` to every sink and return how many of them failed.
///
/// Failures are logged inside `span` and never stop the other sinks.
pub async fn report_all(sinks: &[BoxedSink], report: &ScanReport, span: &Span) -> usize {
    let runs = sinks.iter().map(|sink| {
        let sink_span = info_span!(parent: span, "output", name = sink.name());
        async move {
            match sink.report(report).await {
                Ok(()) => true,
                Err(e) => {
                    error!("{}: {}", sink.name(), e);
                    false
                }
            }
        }
        .instrument(sink_span)
    });

    join_all(runs).await.into_iter().filter(|ok| !ok).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Finding;
    use crate::types::Port;
    use std::sync::Mutex;

    /// Records every report it receives, optionally failing.
    struct RecordingSink {
        name: String,
        fail: bool,
        received: Mutex<Vec<ScanReport>>,
    }

    impl RecordingSink {
        fn new(name: &str, fail: bool) -> Self {
            Self {
                name: name.to_string(),
                fail,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Sink for std::sync::Arc<RecordingSink> {
        fn name(&self) -> &str {
            &self.name
        }

        async fn report(&self, report: &ScanReport) -> Result<(), SinkReportError> {
            self.received.lock().unwrap().push(report.clone());
            if self.fail {
                Err(SinkReportError::Upload("simulated upload error".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn sample_report() -> ScanReport {
        vec![
            Finding::new("10.0.0.1", Port::new(8443).unwrap()),
            Finding::new("10.0.0.1", Port::new(443).unwrap()),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let failing = std::sync::Arc::new(RecordingSink::new("archive", true));
        let healthy = std::sync::Arc::new(RecordingSink::new("console", false));
        let sinks: Vec<BoxedSink> = vec![Box::new(failing.clone()), Box::new(healthy.clone())];

        let report = sample_report();
        let failures = report_all(&sinks, &report, &Span::none()).await;

        assert_eq!(failures, 1);
        assert_eq!(failing.received.lock().unwrap().len(), 1);
        assert_eq!(*healthy.received.lock().unwrap(), vec![report]);
    }

    #[test]
    fn test_document_shape() {
        let document = ReportDocument::new(&sample_report());
        let value = serde_json::to_value(&document).unwrap();

        assert!(value["date"].as_i64().unwrap() > 0);
        assert_eq!(value["hosts"]["10.0.0.1"], serde_json::json!([443, 8443]));
    }

    #[test]
    fn test_build_sinks_from_config() {
        let mut outputs = BTreeMap::new();
        outputs.insert("console".to_string(), OutputConfig::Stdout);

        let sinks = build_sinks(&outputs).unwrap();
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].name(), "console");
    }
}

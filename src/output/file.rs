//! Local JSON file output.
//!
//! Writes the same document as the S3 output, for hosts that keep their
//! audit trail on disk.

use super::{ReportDocument, Sink};
use crate::config::FileSettings;
use crate::error::{SinkInitError, SinkReportError};
use crate::scanner::ScanReport;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

pub struct FileSink {
    name: String,
    path: PathBuf,
    pretty: bool,
}

impl FileSink {
    pub fn new(name: impl Into<String>, settings: &FileSettings) -> Result<Self, SinkInitError> {
        let name = name.into();

        if settings.path.is_dir() {
            return Err(SinkInitError::new(
                name,
                format!("{} is a directory", settings.path.display()),
            ));
        }

        Ok(Self {
            name,
            path: settings.path.clone(),
            pretty: settings.pretty,
        })
    }

    fn write_error(&self, e: std::io::Error) -> SinkReportError {
        SinkReportError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self, report: &ScanReport) -> Result<(), SinkReportError> {
        let document = ReportDocument::new(report);
        let content = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        fs::write(&self.path, content)
            .await
            .map_err(|e| self.write_error(e))?;

        info!("report written to {}", self.path.display());
        Ok(())
    }
}

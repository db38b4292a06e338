//! S3 object storage output.
//!
//! Uploads the JSON report document to a fixed bucket/key as a private
//! object, using static credentials from the configuration.

use super::{ReportDocument, Sink};
use crate::config::S3Settings;
use crate::error::{SinkInitError, SinkReportError};
use crate::scanner::ScanReport;
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use tracing::{debug, info};

pub struct S3Sink {
    name: String,
    bucket: String,
    key: String,
    client: S3Client,
}

impl S3Sink {
    pub fn new(name: impl Into<String>, settings: &S3Settings) -> Result<Self, SinkInitError> {
        let name = name.into();

        if settings.region.chars().any(char::is_whitespace) {
            return Err(SinkInitError::new(
                name,
                format!("s3 output: invalid region {:?}", settings.region),
            ));
        }

        let credentials = Credentials::new(
            &settings.access_key,
            &settings.secret_key,
            None,
            None,
            "portaudit",
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(settings.region.clone()))
            .build();

        Ok(Self {
            name,
            bucket: settings.bucket.clone(),
            key: settings.file_path.clone(),
            client: S3Client::from_conf(config),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl Sink for S3Sink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self, report: &ScanReport) -> Result<(), SinkReportError> {
        let body = serde_json::to_vec(&ReportDocument::new(report))?;
        debug!("uploading {} bytes to s3://{}/{}", body.len(), self.bucket, self.key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type("application/json")
            .acl(ObjectCannedAcl::Private)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| SinkReportError::Upload(DisplayErrorContext(e).to_string()))?;

        info!("report uploaded to s3://{}/{}", self.bucket, self.key);
        Ok(())
    }
}

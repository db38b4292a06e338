//! Audit configuration file.
//!
//! The file is decoded once into typed structs and validated as a whole, so
//! every problem is reported before any scanning begins.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Port;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Hosts to audit and the outputs to report to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Host (name or IP) to the ports it is expected to expose.
    #[serde(default)]
    pub hosts: BTreeMap<String, Vec<u16>>,
    /// Output name to its settings.
    #[serde(default, alias = "output")]
    pub outputs: BTreeMap<String, OutputConfig>,
}

/// Settings of one output, selected by its `type` key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    /// Log findings to the console.
    Stdout,
    /// Upload the JSON report to an S3 bucket.
    S3(S3Settings),
    /// Write the JSON report to a local file.
    File(FileSettings),
}

impl OutputConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::S3(_) => "s3",
            Self::File(_) => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct S3Settings {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    /// Object key the report is stored under.
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileSettings {
    pub path: PathBuf,
    /// Pretty-print the JSON document.
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    /// Read, decode and validate the configuration at `path`.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Decode and validate a JSON document.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Collect every semantic problem in one error.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut problems = Vec::new();

        if self.hosts.is_empty() {
            problems.push("no hosts to scan".to_string());
        }
        if self.outputs.is_empty() {
            problems.push("no outputs configured".to_string());
        }

        for (host, ports) in &self.hosts {
            if host.trim().is_empty() {
                problems.push("empty host name".to_string());
            }
            for &port in ports {
                if Port::new(port).is_none() {
                    problems.push(format!("host {:?}: invalid expected port {}", host, port));
                }
            }
        }

        for (name, output) in &self.outputs {
            match output {
                OutputConfig::Stdout => {}
                OutputConfig::S3(s3) => {
                    let fields = [
                        ("access_key", &s3.access_key),
                        ("secret_key", &s3.secret_key),
                        ("region", &s3.region),
                        ("bucket", &s3.bucket),
                        ("file_path", &s3.file_path),
                    ];
                    for (field, value) in fields {
                        if value.trim().is_empty() {
                            problems.push(format!("output {:?}: empty setting `{}'", name, field));
                        }
                    }
                }
                OutputConfig::File(file) => {
                    if file.path.as_os_str().is_empty() {
                        problems.push(format!("output {:?}: empty setting `path'", name));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Hosts with their expected ports as validated [`Port`]s.
    pub fn targets(&self) -> BTreeMap<String, Vec<Port>> {
        self.hosts
            .iter()
            .map(|(host, ports)| {
                (
                    host.clone(),
                    ports.iter().filter_map(|&p| Port::new(p)).collect(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "hosts": {
            "10.0.0.1": [22, 80],
            "example.net": []
        },
        "outputs": {
            "console": { "type": "stdout" },
            "archive": {
                "type": "s3",
                "access_key": "AKIA",
                "secret_key": "secret",
                "region": "eu-west-1",
                "bucket": "audits",
                "file_path": "scan.json"
            },
            "local": { "type": "file", "path": "/tmp/report.json" }
        }
    }"#;

    fn problems(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::Invalid(problems) => problems,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_sample() {
        let config = Config::from_json(SAMPLE).unwrap();
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.outputs["console"], OutputConfig::Stdout);
        assert_eq!(config.outputs["archive"].kind(), "s3");
        assert_eq!(
            config.outputs["local"],
            OutputConfig::File(FileSettings {
                path: PathBuf::from("/tmp/report.json"),
                pretty: false,
            })
        );

        let targets = config.targets();
        assert_eq!(
            targets["10.0.0.1"],
            vec![Port::new(22).unwrap(), Port::new(80).unwrap()]
        );
    }

    #[test]
    fn test_output_alias() {
        let config =
            Config::from_json(r#"{"hosts": {"h": []}, "output": {"o": {"type": "stdout"}}}"#)
                .unwrap();
        assert_eq!(config.outputs.len(), 1);
    }

    #[test]
    fn test_zero_hosts_is_rejected() {
        let err = Config::from_json(r#"{"outputs": {"o": {"type": "stdout"}}}"#).unwrap_err();
        assert_eq!(problems(err), vec!["no hosts to scan".to_string()]);
    }

    #[test]
    fn test_all_problems_reported_together() {
        let err = Config::from_json(
            r#"{
                "hosts": {"10.0.0.1": [0, 22]},
                "outputs": {"bad": {"type": "file", "path": ""}}
            }"#,
        )
        .unwrap_err();

        let problems = problems(err);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("invalid expected port 0"));
        assert!(problems[1].contains("`path'"));
    }

    #[test]
    fn test_empty_config_lists_both_problems() {
        let problems = problems(Config::from_json("{}").unwrap_err());
        assert_eq!(problems, vec!["no hosts to scan", "no outputs configured"]);
    }

    #[test]
    fn test_unknown_output_type() {
        let err = Config::from_json(r#"{"hosts": {"h": []}, "outputs": {"o": {"type": "smtp"}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_s3_setting() {
        let err = Config::from_json(
            r#"{"hosts": {"h": []}, "outputs": {"o": {"type": "s3", "bucket": "b"}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("access_key"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.outputs.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/portaudit.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }
}

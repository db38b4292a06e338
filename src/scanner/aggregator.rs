//! Result aggregation.
//!
//! A single consumer folds findings coming off the result channel into a
//! [`ScanReport`].

use crate::scanner::traits::Finding;
use crate::types::Port;
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};
use tokio::sync::mpsc;
use tracing::debug;

/// Host to discovered-port mapping handed to every sink.
///
/// Per-host port lists keep arrival order; sinks that need a stable order
/// sort before displaying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanReport {
    hosts: BTreeMap<String, Vec<Port>>,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `finding` to its host entry.
    ///
    /// Returns `false` when the same (host, port) pair was already recorded.
    pub fn record(&mut self, finding: Finding) -> bool {
        let ports = self.hosts.entry(finding.host).or_default();
        if ports.contains(&finding.port) {
            return false;
        }
        ports.push(finding.port);
        true
    }

    pub fn ports(&self, host: &str) -> Option<&[Port]> {
        self.hosts.get(host).map(Vec::as_slice)
    }

    pub fn hosts(&self) -> btree_map::Iter<'_, String, Vec<Port>> {
        self.hosts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Number of hosts with at least one finding.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Copy of the report with every port list in ascending order.
    pub fn sorted(&self) -> Self {
        let mut hosts = self.hosts.clone();
        for ports in hosts.values_mut() {
            ports.sort_unstable();
        }
        Self { hosts }
    }

    /// Total number of findings across all hosts.
    pub fn finding_count(&self) -> usize {
        self.hosts.values().map(Vec::len).sum()
    }
}

impl FromIterator<Finding> for ScanReport {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut report = Self::new();
        for finding in iter {
            report.record(finding);
        }
        report
    }
}

/// Drain `findings` until every sender is gone and return the report.
pub async fn aggregate(mut findings: mpsc::Receiver<Finding>) -> ScanReport {
    let mut report = ScanReport::new();

    while let Some(finding) = findings.recv().await {
        let (host, port) = (finding.host.clone(), finding.port);
        if !report.record(finding) {
            debug!("{}: duplicate finding for port {} ignored", host, port);
        }
    }

    report
}

//! Scanner module - coordinates a complete audit run.
//!
//! [`run_scan`] resolves every configured host, starts the [`ScanEngine`],
//! feeds it the host × port-range cross product and waits for the workers
//! to drain before returning the aggregated [`ScanReport`].

pub mod aggregator;
pub mod engine;
pub mod tcp;
pub mod traits;

use crate::types::{system_resolver, Port, ScanRange, Target};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, Span};

pub use aggregator::ScanReport;
pub use engine::{EngineConfig, ScanEngine};
pub use tcp::TcpClassifier;
pub use traits::{Classification, Classifier, Finding, ScanJob};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Unexpected open ports per host.
    pub report: ScanReport,
    /// Hosts that were resolved and scanned.
    pub scanned_hosts: usize,
    /// Hosts skipped because they could not be resolved.
    pub skipped_hosts: Vec<String>,
    /// Wall-clock duration of the scan.
    pub elapsed: Duration,
}

/// Scan every host in `hosts` over `range`.
///
/// Host names are resolved through one resolver built from the system
/// configuration. Hosts that fail to resolve are logged and skipped. Scan events are
/// logged inside `span`.
pub async fn run_scan(
    hosts: &BTreeMap<String, Vec<Port>>,
    range: ScanRange,
    config: EngineConfig,
    classifier: Arc<dyn Classifier>,
    span: Span,
) -> ScanOutcome {
    let started = Instant::now();
    debug!(parent: &span, "starting scan of {} hosts over ports {}", hosts.len(), range);

    let resolver = system_resolver();
    let engine = ScanEngine::start(config, classifier, span.clone());
    let mut scanned_hosts = 0;
    let mut skipped_hosts = Vec::new();

    'hosts: for (host, expected) in hosts {
        let target = match Target::resolve(&resolver, host, expected.iter().copied()).await {
            Ok(target) => Arc::new(target),
            Err(e) => {
                error!(parent: &span, "{}", e);
                skipped_hosts.push(host.clone());
                continue;
            }
        };

        debug!(parent: &span, "scanning {}", target);
        scanned_hosts += 1;

        for port in range.iter() {
            if let Err(e) = engine.submit(ScanJob::new(Arc::clone(&target), port)).await {
                error!(parent: &span, "unable to queue {}:{}: {}", host, port, e);
                break 'hosts;
            }
        }
    }

    let report = engine.shutdown().await;

    ScanOutcome {
        report,
        scanned_hosts,
        skipped_hosts,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DialError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::sync::Mutex;

    /// Canned outcomes keyed by (address, port); everything else is filtered.
    #[derive(Default)]
    struct FakeClassifier {
        outcomes: HashMap<(IpAddr, u16), Classification>,
        dialed: Mutex<Vec<(IpAddr, u16)>>,
    }

    impl FakeClassifier {
        fn with(mut self, addr: &str, port: u16, outcome: Classification) -> Self {
            self.outcomes.insert((addr.parse().unwrap(), port), outcome);
            self
        }

        fn dialed(&self) -> Vec<(IpAddr, u16)> {
            self.dialed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Classifier for FakeClassifier {
        async fn classify(&self, addr: IpAddr, port: Port, _timeout: Duration) -> Classification {
            self.dialed.lock().unwrap().push((addr, port.as_u16()));
            self.outcomes
                .get(&(addr, port.as_u16()))
                .cloned()
                .unwrap_or(Classification::Filtered)
        }
    }

    fn hosts(entries: &[(&str, Vec<u16>)]) -> BTreeMap<String, Vec<Port>> {
        entries
            .iter()
            .map(|(host, ports)| {
                (
                    host.to_string(),
                    ports.iter().filter_map(|&p| Port::new(p)).collect(),
                )
            })
            .collect()
    }

    fn sorted(report: &ScanReport, host: &str) -> Vec<u16> {
        let mut ports: Vec<u16> = report
            .ports(host)
            .unwrap_or_default()
            .iter()
            .map(|p| p.as_u16())
            .collect();
        ports.sort_unstable();
        ports
    }

    #[tokio::test]
    async fn test_expected_ports_are_suppressed() {
        let classifier = Arc::new(
            FakeClassifier::default()
                .with("10.0.0.1", 22, Classification::Closed)
                .with("10.0.0.1", 80, Classification::Open)
                .with("10.0.0.1", 443, Classification::Open),
        );

        let outcome = run_scan(
            &hosts(&[("10.0.0.1", vec![22, 80])]),
            "1:1024".parse().unwrap(),
            EngineConfig::default(),
            classifier.clone(),
            Span::none(),
        )
        .await;

        assert_eq!(outcome.report.len(), 1);
        assert_eq!(sorted(&outcome.report, "10.0.0.1"), vec![443]);
        assert_eq!(outcome.scanned_hosts, 1);
        assert_eq!(classifier.dialed().len(), 1024);
    }

    #[tokio::test]
    async fn test_every_host_port_pair_is_dialed_once() {
        let classifier = Arc::new(
            FakeClassifier::default()
                .with("10.0.0.1", 3000, Classification::Open)
                .with("10.0.0.2", 3001, Classification::Open)
                .with("10.0.0.2", 3002, Classification::Error(DialError::new("reset"))),
        );

        let outcome = run_scan(
            &hosts(&[("10.0.0.1", vec![]), ("10.0.0.2", vec![3001])]),
            "3000:3009".parse().unwrap(),
            EngineConfig::default().with_concurrency(3),
            classifier.clone(),
            Span::none(),
        )
        .await;

        let mut dialed = classifier.dialed();
        dialed.sort();
        dialed.dedup();
        assert_eq!(dialed.len(), 20);
        assert_eq!(classifier.dialed().len(), 20);

        assert_eq!(sorted(&outcome.report, "10.0.0.1"), vec![3000]);
        assert!(outcome.report.ports("10.0.0.2").is_none());
    }

    #[tokio::test]
    async fn test_single_port_range() {
        let classifier = Arc::new(FakeClassifier::default());

        run_scan(
            &hosts(&[("10.0.0.1", vec![]), ("10.0.0.2", vec![])]),
            "80:80".parse().unwrap(),
            EngineConfig::default(),
            classifier.clone(),
            Span::none(),
        )
        .await;

        let mut dialed = classifier.dialed();
        dialed.sort();
        let expected: Vec<(IpAddr, u16)> = vec![
            ("10.0.0.1".parse().unwrap(), 80),
            ("10.0.0.2".parse().unwrap(), 80),
        ];
        assert_eq!(dialed, expected);
    }

    #[tokio::test]
    async fn test_inverted_range_yields_empty_report() {
        let classifier = Arc::new(FakeClassifier::default());

        let outcome = run_scan(
            &hosts(&[("10.0.0.1", vec![])]),
            "1024:1".parse().unwrap(),
            EngineConfig::default(),
            classifier.clone(),
            Span::none(),
        )
        .await;

        assert!(classifier.dialed().is_empty());
        assert!(outcome.report.is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_skipped() {
        let classifier = Arc::new(FakeClassifier::default().with("10.0.0.9", 25, Classification::Open));

        let outcome = run_scan(
            &hosts(&[("bad host!", vec![]), ("10.0.0.9", vec![])]),
            "20:30".parse().unwrap(),
            EngineConfig::default(),
            classifier,
            Span::none(),
        )
        .await;

        assert_eq!(outcome.skipped_hosts, vec!["bad host!".to_string()]);
        assert_eq!(outcome.scanned_hosts, 1);
        assert_eq!(sorted(&outcome.report, "10.0.0.9"), vec![25]);
    }
}

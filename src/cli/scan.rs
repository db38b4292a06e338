//! Audit run: configuration, scan, report.

use super::Args;
use crate::config::Config;
use crate::logging::LogContext;
use crate::output::{build_sinks, report_all};
use crate::scanner::{run_scan, Classifier, ScanOutcome, TcpClassifier};
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: ScanOutcome,
    /// Number of sinks whose report failed.
    pub failed_outputs: usize,
}

/// Run an audit with real TCP connects.
pub async fn execute(args: &Args, ctx: &LogContext) -> anyhow::Result<RunSummary> {
    execute_with(args, Arc::new(TcpClassifier::new()), ctx).await
}

/// Run an audit with the given classifier.
///
/// Errors returned here are fatal: invalid parameters, configuration or
/// outputs. Unresolvable hosts and failing outputs are only logged.
pub async fn execute_with(
    args: &Args,
    classifier: Arc<dyn Classifier>,
    ctx: &LogContext,
) -> anyhow::Result<RunSummary> {
    let range = args.scan_range()?;
    let engine = args.engine_config()?;

    let config = Config::load(&args.config).context("unable to load configuration")?;
    let sinks = build_sinks(&config.outputs)?;

    debug!(
        parent: &ctx.core,
        "{} hosts, {} outputs, ports {}, {} workers",
        config.hosts.len(),
        sinks.len(),
        range,
        engine.concurrency
    );

    let outcome = run_scan(&config.targets(), range, engine, classifier, ctx.scan.clone()).await;
    let failed_outputs = report_all(&sinks, &outcome.report, &ctx.report).await;

    if !outcome.skipped_hosts.is_empty() {
        warn!(
            parent: &ctx.core,
            "{} hosts skipped: {}",
            outcome.skipped_hosts.len(),
            outcome.skipped_hosts.join(", ")
        );
    }

    info!(
        parent: &ctx.core,
        "scanned {} hosts in {:.1} seconds",
        config.hosts.len(),
        outcome.elapsed.as_secs_f64()
    );

    Ok(RunSummary {
        outcome,
        failed_outputs,
    })
}

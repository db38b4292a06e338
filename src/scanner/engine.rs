//! Scan engine: a fixed pool of workers fed through one job channel.
//!
//! Workers pull jobs dynamically from the shared channel, so hosts with
//! slow or uneven ports never pin a worker. Findings are funnelled into a
//! single aggregator task. Shutdown closes the job channel, lets the
//! workers drain whatever is still queued, joins them all and only then
//! lets the result channel close.

use crate::error::EngineError;
use crate::scanner::aggregator::{aggregate, ScanReport};
use crate::scanner::traits::{Classification, Classifier, Finding, ScanJob};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info_span, Instrument, Span};

/// Default number of workers.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default per-dial timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of workers, at least one.
    pub concurrency: usize,
    /// Upper bound for each connect attempt.
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EngineConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A running worker pool.
///
/// Dropping the handle without calling [`ScanEngine::shutdown`] still stops
/// the workers once the queue is empty, but the report is lost.
pub struct ScanEngine {
    jobs: mpsc::Sender<ScanJob>,
    workers: JoinSet<()>,
    aggregator: JoinHandle<ScanReport>,
}

impl ScanEngine {
    /// Spawn `config.concurrency` workers and the aggregator.
    ///
    /// Must be called from within a tokio runtime. The job channel is
    /// bounded to the pool size so a busy pool throttles the producer.
    pub fn start(config: EngineConfig, classifier: Arc<dyn Classifier>, span: Span) -> Self {
        let concurrency = config.concurrency.max(1);
        let (job_tx, job_rx) = mpsc::channel::<ScanJob>(concurrency);
        let (finding_tx, finding_rx) = mpsc::channel::<Finding>(concurrency);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut workers = JoinSet::new();
        for id in 0..concurrency {
            let worker = Worker {
                id,
                jobs: Arc::clone(&job_rx),
                findings: finding_tx.clone(),
                classifier: Arc::clone(&classifier),
                timeout: config.timeout,
            };
            let worker_span = info_span!(parent: &span, "worker", id);
            workers.spawn(worker.run().instrument(worker_span));
        }
        // Only workers hold result senders from here on.
        drop(finding_tx);

        let aggregator = tokio::spawn(aggregate(finding_rx).instrument(span));

        Self {
            jobs: job_tx,
            workers,
            aggregator,
        }
    }

    /// Enqueue one job, waiting while the queue is full.
    pub async fn submit(&self, job: ScanJob) -> Result<(), EngineError> {
        self.jobs
            .send(job)
            .await
            .map_err(|_| EngineError::WorkersGone)
    }

    /// Number of workers still running.
    pub fn active_workers(&self) -> usize {
        self.workers.len()
    }

    /// Close the job channel, wait for every worker to finish and return
    /// the aggregated report.
    pub async fn shutdown(self) -> ScanReport {
        let Self {
            jobs,
            mut workers,
            aggregator,
        } = self;

        drop(jobs);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("scan worker terminated abnormally: {}", e);
            }
        }

        match aggregator.await {
            Ok(report) => report,
            Err(e) => {
                error!("result aggregator terminated abnormally: {}", e);
                ScanReport::new()
            }
        }
    }
}

struct Worker {
    id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<ScanJob>>>,
    findings: mpsc::Sender<Finding>,
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
}

impl Worker {
    async fn run(self) {
        loop {
            // Hold the receiver only while waiting, never while dialing.
            let next = { self.jobs.lock().await.recv().await };

            let Some(job) = next else {
                debug!("worker {} terminated", self.id);
                return;
            };

            if let Some(finding) = self.process(job).await {
                if self.findings.send(finding).await.is_err() {
                    error!("result channel closed, worker {} stopping", self.id);
                    return;
                }
            }
        }
    }

    async fn process(&self, job: ScanJob) -> Option<Finding> {
        let target = &job.target;
        let outcome = self
            .classifier
            .classify(target.ip(), job.port, self.timeout)
            .await;

        match outcome {
            Classification::Open if !target.is_expected(job.port) => {
                Some(Finding::new(target.host(), job.port))
            }
            Classification::Open => {
                debug!("{}: port {} open as expected", target.host(), job.port);
                None
            }
            _ => None,
        }
    }
}

//! Installation orchestrator
//!
//! `Orchestrator::run` takes a snapshot of the selected applications and
//! returns an `InstallRun`: a lazy, finite iterator of `StatusEvent`s.
//!
//! # Run lifecycle
//!
//! ```text
//! Idle ──first next()──▶ Running ──N results received──▶ Completed
//! ```
//!
//! - **Idle**: nothing has been dispatched yet.
//! - **Running**: a dispatcher thread looks each name up in the catalog and
//!   submits one job per application to the worker pool. Each job emits all
//!   of its events from a single thread, so per-application order holds even
//!   though applications interleave.
//! - **Completed**: every application has produced exactly one result event
//!   and the summary has been yielded. The iterator then returns `None`
//!   forever; running the same request again means calling `run` again.
//!
//! Cancelling marks applications that have not started as `Skipped`;
//! in-flight downloads finish on their own.

use crate::catalog::Catalog;
use crate::config::InstallerConfig;
use crate::error::{FailureReason, Result};
use crate::events::{InstallOutcome, Reporter, StatusEvent, Summary};
use crate::executor::Executor;
use crate::pool::WorkerPool;
use crate::types::{PlatformTag, Severity};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Snapshot of the applications selected when installation was triggered.
///
/// Names are trimmed, empty names dropped and duplicates removed while
/// keeping the first occurrence's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRequest {
    apps: Vec<String>,
}

impl InstallationRequest {
    pub fn new<I, S>(apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let apps = apps
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { apps }
    }

    pub fn apps(&self) -> &[String] {
        &self.apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Per-request state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

/// Request-wide cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Recorded result for one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationResult {
    pub app: String,
    pub outcome: InstallOutcome,
}

/// Final report, results in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationReport {
    pub results: Vec<ApplicationResult>,
    pub summary: Summary,
}

impl InstallationReport {
    pub fn outcome_for(&self, app: &str) -> Option<&InstallOutcome> {
        self.results
            .iter()
            .find(|r| r.app == app)
            .map(|r| &r.outcome)
    }
}

/// Drives installation requests over a shared worker pool
pub struct Orchestrator {
    catalog: Arc<Catalog>,
    executor: Arc<Executor>,
    pool: Arc<WorkerPool>,
}

impl Orchestrator {
    pub fn new(catalog: Catalog, executor: Executor, config: &InstallerConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.workers, config.queue_capacity)?;
        info!(
            "Orchestrator ready: {} application(s), platform={}, workers={}",
            catalog.len(),
            executor.platform(),
            pool.size()
        );
        Ok(Self {
            catalog: Arc::new(catalog),
            executor: Arc::new(executor),
            pool: Arc::new(pool),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn platform(&self) -> PlatformTag {
        self.executor.platform()
    }

    /// Start a fresh run for `request`. Nothing happens until the returned
    /// iterator is first polled.
    pub fn run(&self, request: &InstallationRequest) -> InstallRun {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelHandle::new();
        let apps = request.apps().to_vec();

        let dispatch = Dispatch {
            apps: apps.clone(),
            catalog: Arc::clone(&self.catalog),
            executor: Arc::clone(&self.executor),
            pool: Arc::clone(&self.pool),
            cancel: cancel.clone(),
            tx,
        };

        InstallRun {
            apps,
            platform: self.executor.platform(),
            rx,
            results: Vec::new(),
            recorded: HashSet::new(),
            state: RunState::Idle,
            next_seq: 1,
            cancel,
            pending: Some(dispatch),
            dispatcher: None,
            report: None,
        }
    }
}

/// Everything the dispatcher thread needs
struct Dispatch {
    apps: Vec<String>,
    catalog: Arc<Catalog>,
    executor: Arc<Executor>,
    pool: Arc<WorkerPool>,
    cancel: CancelHandle,
    tx: Sender<StatusEvent>,
}

impl Dispatch {
    fn start(self) -> Option<JoinHandle<()>> {
        match thread::Builder::new()
            .name("install-dispatch".into())
            .spawn(move || self.run())
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                // Dropping the closure drops the sender; the run then
                // reports every application as an internal failure.
                error!("Failed to spawn dispatcher thread: {}", e);
                None
            }
        }
    }

    fn run(self) {
        for app in self.apps {
            let reporter = Reporter::new(app.as_str(), self.tx.clone());

            if self.cancel.is_cancelled() {
                reporter.warn("Request cancelled before start");
                reporter.finish(InstallOutcome::Skipped);
                continue;
            }

            reporter.info(format!("Processing: {}", app));
            let descriptor = match self.catalog.lookup(&app) {
                Ok(descriptor) => descriptor.clone(),
                Err(reason) => {
                    warn!("No catalog entry for {}", app);
                    reporter.error(format!("No configuration found for {}", app));
                    reporter.finish(InstallOutcome::Failed(reason));
                    continue;
                }
            };

            let executor = Arc::clone(&self.executor);
            let cancel = self.cancel.clone();
            let job_reporter = reporter.clone();
            let submitted = self.pool.submit(move || {
                if cancel.is_cancelled() {
                    job_reporter.warn("Request cancelled before start");
                    job_reporter.finish(InstallOutcome::Skipped);
                    return;
                }
                let outcome = executor.execute_descriptor(&descriptor, &job_reporter);
                job_reporter.finish(outcome);
            });

            if let Err(e) = submitted {
                error!("Could not queue {}: {}", app, e);
                reporter.finish(InstallOutcome::Failed(FailureReason::Internal(e.to_string())));
            }
        }
        debug!("Dispatcher finished");
    }
}

/// Lazy event sequence for one request
pub struct InstallRun {
    apps: Vec<String>,
    platform: PlatformTag,
    rx: Receiver<StatusEvent>,
    results: Vec<ApplicationResult>,
    recorded: HashSet<String>,
    state: RunState,
    next_seq: u64,
    cancel: CancelHandle,
    pending: Option<Dispatch>,
    dispatcher: Option<JoinHandle<()>>,
    report: Option<InstallationReport>,
}

impl InstallRun {
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Handle that cancels this request from any thread
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Results recorded so far, in arrival order
    pub fn results(&self) -> &[ApplicationResult] {
        &self.results
    }

    /// Final report, available once the run is `Completed`
    pub fn report(&self) -> Option<&InstallationReport> {
        self.report.as_ref()
    }

    /// Drain the remaining events and return the report
    pub fn into_report(mut self) -> InstallationReport {
        for _ in self.by_ref() {}
        self.report.take().unwrap_or_else(|| InstallationReport {
            results: Vec::new(),
            summary: Summary::default(),
        })
    }

    fn stamp(&mut self, event: StatusEvent) -> StatusEvent {
        let seq = self.next_seq;
        self.next_seq += 1;
        event.sequenced(seq)
    }

    fn record(&mut self, event: &StatusEvent) {
        let (Some(app), Some(outcome)) = (event.app(), event.outcome()) else {
            return;
        };
        if self.apps.iter().any(|a| a == app) && self.recorded.insert(app.to_string()) {
            self.results.push(ApplicationResult {
                app: app.to_string(),
                outcome: outcome.clone(),
            });
        }
    }

    fn complete(&mut self) -> StatusEvent {
        self.state = RunState::Completed;
        if let Some(handle) = self.dispatcher.take() {
            if handle.join().is_err() {
                error!("Dispatcher thread panicked");
            }
        }

        let ordered: Vec<ApplicationResult> = self
            .apps
            .iter()
            .filter_map(|app| self.results.iter().find(|r| &r.app == app).cloned())
            .collect();
        let summary = Summary::tally(ordered.iter().map(|r| &r.outcome));
        info!("Installation request completed: {}", summary);

        self.report = Some(InstallationReport {
            results: ordered,
            summary,
        });
        StatusEvent::summary(summary)
    }

    fn missing_result(&mut self) -> Option<StatusEvent> {
        let app = self
            .apps
            .iter()
            .find(|app| !self.recorded.contains(*app))?
            .clone();
        error!("No result received for {}", app);
        Some(StatusEvent::result(
            app,
            InstallOutcome::Failed(FailureReason::Internal(
                "worker exited without reporting a result".into(),
            )),
        ))
    }
}

impl Iterator for InstallRun {
    type Item = StatusEvent;

    fn next(&mut self) -> Option<StatusEvent> {
        match self.state {
            RunState::Completed => return None,
            RunState::Idle => {
                self.state = RunState::Running;
                if let Some(dispatch) = self.pending.take() {
                    self.dispatcher = dispatch.start();
                }
                let header = StatusEvent::batch(
                    Severity::Info,
                    format!(
                        "Starting installation for {} application(s) on {}...",
                        self.apps.len(),
                        self.platform.display_name()
                    ),
                );
                return Some(self.stamp(header));
            }
            RunState::Running => {}
        }

        if self.recorded.len() == self.apps.len() {
            let summary = self.complete();
            return Some(self.stamp(summary));
        }

        let event = match self.rx.recv() {
            Ok(event) => event,
            Err(_) => self.missing_result()?,
        };
        self.record(&event);
        Some(self.stamp(event))
    }
}

impl Drop for InstallRun {
    fn drop(&mut self) {
        if self.state == RunState::Running {
            debug!("InstallRun dropped while running, cancelling remaining work");
            self.cancel.cancel();
        }
    }
}

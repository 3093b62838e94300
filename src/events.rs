//! Status events and per-application outcomes
//!
//! Workers never touch presentation state. Everything they have to say goes
//! through a `Reporter` as a `StatusEvent` on a channel; the orchestrator's
//! event iterator stamps each one with a sequence number on delivery.

use crate::error::FailureReason;
use crate::types::{PlatformTag, Severity};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use tracing::debug;

/// What a successful acquisition actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Installer downloaded and started as a detached process
    Launched { path: PathBuf },
    /// Downloaded file handed to the system opener (disk image, package file)
    Opened { path: PathBuf },
    /// Package-manager command shown to the user; nothing was installed
    InstructionSurfaced { command: String },
}

/// Final result for one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Succeeded(Completion),
    Failed(FailureReason),
    Unsupported(PlatformTag),
    Skipped,
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Severity of the result event carrying this outcome
    pub fn severity(&self) -> Severity {
        match self {
            Self::Succeeded(_) => Severity::Success,
            Self::Failed(_) => Severity::Error,
            Self::Unsupported(_) | Self::Skipped => Severity::Warning,
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded(Completion::Launched { path }) => {
                write!(f, "installer launched ({})", path.display())
            }
            Self::Succeeded(Completion::Opened { path }) => {
                write!(f, "opened with system handler ({})", path.display())
            }
            Self::Succeeded(Completion::InstructionSurfaced { command }) => {
                write!(f, "run manually: {}", command)
            }
            Self::Failed(reason) => write!(f, "failed: {}", reason),
            Self::Unsupported(platform) => {
                write!(f, "not supported on {}", platform.display_name())
            }
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Tally of outcomes for a whole request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub unsupported: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn tally<'a>(outcomes: impl IntoIterator<Item = &'a InstallOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                InstallOutcome::Succeeded(_) => summary.succeeded += 1,
                InstallOutcome::Failed(_) => summary.failed += 1,
                InstallOutcome::Unsupported(_) => summary.unsupported += 1,
                InstallOutcome::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.unsupported + self.skipped
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} unsupported, {} skipped",
            self.succeeded, self.failed, self.unsupported, self.skipped
        )
    }
}

/// Event payload beyond the message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Progress or informational line
    Progress,
    /// The one result event for an application
    Result(InstallOutcome),
    /// Terminal event of a request
    Summary(Summary),
}

/// One unit of user-facing feedback. Immutable once delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    seq: u64,
    timestamp: DateTime<Utc>,
    app: Option<String>,
    severity: Severity,
    message: String,
    kind: EventKind,
}

impl StatusEvent {
    pub fn new(app: Option<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            timestamp: Utc::now(),
            app,
            severity,
            message: message.into(),
            kind: EventKind::Progress,
        }
    }

    /// Batch-level line not tied to one application
    pub fn batch(severity: Severity, message: impl Into<String>) -> Self {
        Self::new(None, severity, message)
    }

    pub fn result(app: impl Into<String>, outcome: InstallOutcome) -> Self {
        let app = app.into();
        let message = format!("{}: {}", app, outcome);
        Self {
            seq: 0,
            timestamp: Utc::now(),
            app: Some(app),
            severity: outcome.severity(),
            message,
            kind: EventKind::Result(outcome),
        }
    }

    pub fn summary(summary: Summary) -> Self {
        let severity = if summary.failed > 0 {
            Severity::Warning
        } else {
            Severity::Success
        };
        Self {
            seq: 0,
            timestamp: Utc::now(),
            app: None,
            severity,
            message: format!("Installation process completed: {}", summary),
            kind: EventKind::Summary(summary),
        }
    }

    pub(crate) fn sequenced(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    /// Delivery order within a request, starting at 1
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn app(&self) -> Option<&str> {
        self.app.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn outcome(&self) -> Option<&InstallOutcome> {
        match &self.kind {
            EventKind::Result(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self.kind, EventKind::Summary(_))
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.severity {
            Severity::Info => "ℹ️ ",
            Severity::Success => "✅",
            Severity::Warning => "⚠️ ",
            Severity::Error => "❌",
        };
        write!(
            f,
            "[{}] {} {}",
            self.timestamp.format("%H:%M:%S"),
            marker,
            self.message
        )
    }
}

/// Per-application event emitter handed to the executor
#[derive(Debug, Clone)]
pub struct Reporter {
    app: String,
    tx: Sender<StatusEvent>,
}

impl Reporter {
    pub fn new(app: impl Into<String>, tx: Sender<StatusEvent>) -> Self {
        Self { app: app.into(), tx }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    fn send(&self, event: StatusEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped, discarding event for {}", self.app);
        }
    }

    pub fn emit(&self, severity: Severity, message: impl Into<String>) {
        self.send(StatusEvent::new(Some(self.app.clone()), severity, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Severity::Success, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message);
    }

    /// Emit the result event for this application
    pub fn finish(&self, outcome: InstallOutcome) {
        self.send(StatusEvent::result(self.app.clone(), outcome));
    }
}

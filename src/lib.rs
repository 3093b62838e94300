//! appinstaller library
//!
//! Core of the software installer: catalog, platform resolution, download and
//! launch execution, and the concurrent orchestrator that streams status
//! events. The terminal UI in `app`/`ui` is one consumer of that stream; the
//! headless `install` subcommand is another.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod launcher;
pub mod orchestrator;
pub mod platform;
pub mod pool;
pub mod theme;
pub mod types;
pub mod ui;

// Re-export main types for convenience
pub use catalog::{AcquisitionSpec, ApplicationDescriptor, Catalog};
pub use config::InstallerConfig;
pub use error::{CatalogError, FailureReason, InstallerError, NetworkFailure};
pub use events::{Completion, EventKind, InstallOutcome, Reporter, StatusEvent, Summary};
pub use executor::Executor;
pub use launcher::{Launcher, SystemLauncher};
pub use orchestrator::{
    ApplicationResult, CancelHandle, InstallRun, InstallationReport, InstallationRequest,
    Orchestrator, RunState,
};
pub use platform::{Resolution, detect_platform, resolve_spec};
pub use types::{PackageManager, PlatformTag, Severity};

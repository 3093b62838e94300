//! Error handling module for the installer
//!
//! Provides centralized error types using thiserror. Two layers exist:
//!
//! - `InstallerError` covers process-level failures (config, catalog loading,
//!   host detection) and is returned through `Result`.
//! - `FailureReason` is the per-application taxonomy recorded inside an
//!   `InstallOutcome`. It is `Clone + PartialEq` so results can be compared
//!   and re-emitted without touching the original error.

use crate::types::PlatformTag;
use std::fmt;
use thiserror::Error;

/// Main error type for the installer
#[derive(Error, Debug)]
pub enum InstallerError {
    /// IO errors (download directory, catalog files, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog document errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration errors (invalid values, missing directories)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host operating system is none of windows, linux or mac
    #[error("Unsupported host operating system: {0}")]
    UnsupportedHost(String),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Worker pool errors (queue closed, worker spawn failure)
    #[error("Worker pool error: {0}")]
    Pool(String),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for installer operations
pub type Result<T> = std::result::Result<T, InstallerError>;

impl InstallerError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a worker pool error
    pub fn pool(msg: impl Into<String>) -> Self {
        Self::Pool(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}

/// Errors raised while parsing or loading a catalog mapping document.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("application '{app}': unknown platform key '{key}' (expected windows, linux or mac)")]
    UnknownPlatform { app: String, key: String },

    #[error("application '{app}' on {platform}: {message}")]
    InvalidSpec {
        app: String,
        platform: PlatformTag,
        message: String,
    },

    #[error("application name must not be empty")]
    EmptyName,
}

/// Network-level failure kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkFailure {
    /// The request or body read exceeded the configured timeout
    Timeout,
    /// DNS or TCP connection failed
    Unreachable,
    /// The server answered with a non-2xx status
    HttpStatus(u16),
    /// Fewer bytes arrived than the declared content length
    IncompleteTransfer,
    /// Anything else reported by the HTTP client
    Other(String),
}

impl fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::HttpStatus(code) => write!(f, "HTTP status {}", code),
            Self::IncompleteTransfer => write!(f, "incomplete transfer"),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Why a single application failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Unknown application name
    #[error("no catalog entry for '{app}'")]
    NotFound { app: String },

    /// Unreachable host, timeout or non-success response
    #[error("network failure: {0}")]
    Network(NetworkFailure),

    /// Cannot write to the download directory
    #[error("write failure: {0}")]
    Io(String),

    /// The downloaded file could not be launched or opened
    #[error("launch failure: {0}")]
    Launch(String),

    /// A worker exited without reporting a result
    #[error("internal failure: {0}")]
    Internal(String),
}

impl FailureReason {
    pub fn not_found(app: impl Into<String>) -> Self {
        Self::NotFound { app: app.into() }
    }

    pub fn io(err: &std::io::Error) -> Self {
        Self::Io(err.to_string())
    }

    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    /// Returns the network failure kind, if this is a network failure.
    pub fn network(&self) -> Option<&NetworkFailure> {
        match self {
            Self::Network(kind) => Some(kind),
            _ => None,
        }
    }
}

impl From<NetworkFailure> for FailureReason {
    fn from(kind: NetworkFailure) -> Self {
        Self::Network(kind)
    }
}

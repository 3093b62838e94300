//! Runtime configuration
//!
//! Everything here is decided at process start (CLI flags and environment)
//! and handed to the executor and orchestrator by value. Nothing is persisted.

use crate::error::{InstallerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the download directory
pub const DOWNLOAD_DIR_ENV: &str = "APPINSTALLER_DOWNLOAD_DIR";

/// Subdirectory created under the user's downloads folder
pub const DOWNLOAD_SUBDIR: &str = "InstallerDownloads";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Installer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Directory downloads are written to, created on demand
    pub download_dir: PathBuf,
    /// Upper bound for a whole fetch, body included
    pub request_timeout_secs: u64,
    /// Upper bound for establishing the TCP/TLS connection
    pub connect_timeout_secs: u64,
    /// Worker threads executing acquisitions concurrently
    pub workers: usize,
    /// Jobs that may wait in the pool queue before dispatch blocks
    pub queue_capacity: usize,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// `$APPINSTALLER_DOWNLOAD_DIR`, else `<Downloads>/InstallerDownloads`.
///
/// Falls back to `~/Downloads` when the platform has no downloads folder,
/// and to the temp directory when there is no home either.
pub fn default_download_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DOWNLOAD_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(std::env::temp_dir)
        .join(DOWNLOAD_SUBDIR)
}

impl InstallerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.download_dir.as_os_str().is_empty() {
            return Err(InstallerError::config("download directory must be specified"));
        }
        if self.request_timeout_secs == 0 {
            return Err(InstallerError::config("request timeout must be at least 1 second"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(InstallerError::config("connect timeout must be at least 1 second"));
        }
        if self.workers == 0 {
            return Err(InstallerError::config("workers must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(InstallerError::config("queue capacity must be at least 1"));
        }
        Ok(())
    }

    /// Create the download directory if needed and return it
    pub fn ensure_download_dir(&self) -> Result<&Path> {
        fs::create_dir_all(&self.download_dir)?;
        Ok(&self.download_dir)
    }
}

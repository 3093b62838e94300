use crate::config::{DOWNLOAD_DIR_ENV, InstallerConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// appinstaller - pick applications from a checklist and install them
#[derive(Parser)]
#[command(name = "appinstaller")]
#[command(about = "Download or install well-known applications for this platform")]
#[command(version)]
pub struct Cli {
    /// Directory installers are downloaded to
    #[arg(long, global = true, env = DOWNLOAD_DIR_ENV)]
    pub download_dir: Option<PathBuf>,

    /// Per-download timeout in seconds
    #[arg(long, global = true, env = "APPINSTALLER_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Concurrent installations
    #[arg(long, global = true, env = "APPINSTALLER_WORKERS")]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List catalog applications and the platforms they support
    List {
        /// Catalog document merged over the built-in catalog
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Install applications without the interactive UI
    Install {
        /// Application names, matched case-insensitively
        #[arg(required_unless_present = "all")]
        apps: Vec<String>,

        /// Install every catalog application
        #[arg(long, conflicts_with = "apps")]
        all: bool,

        /// Catalog document merged over the built-in catalog
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Validate a catalog document
    Validate {
        /// Path to the catalog JSON file
        catalog: PathBuf,
    },
    /// Write the built-in catalog as JSON
    ExportCatalog {
        /// Output file; stdout when omitted
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Runtime configuration with CLI overrides applied over defaults
    pub fn installer_config(&self) -> InstallerConfig {
        let mut config = InstallerConfig::default();
        if let Some(dir) = &self.download_dir {
            config = config.with_download_dir(dir);
        }
        if let Some(secs) = self.timeout {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        config
    }
}

//! Acquisition executor
//!
//! Turns one resolved `AcquisitionSpec` into an `InstallOutcome`, emitting
//! progress through a `Reporter` as it goes.
//!
//! # Direct downloads
//!
//! The body is streamed into `<name>.part` inside the download directory and
//! renamed to its final name only after the byte count matches the declared
//! `Content-Length`. Any failure removes the partial file, and a `.part` left
//! by a killed process is removed before the next attempt, so the directory
//! only ever holds complete downloads.
//!
//! # Package references
//!
//! Nothing privileged is executed. The exact command line is surfaced as an
//! instruction and the outcome is `InstructionSurfaced`.
//!
//! Every error is converted into a `FailureReason` here; nothing propagates
//! past `execute`.

use crate::catalog::{AcquisitionSpec, ApplicationDescriptor};
use crate::config::InstallerConfig;
use crate::error::{FailureReason, NetworkFailure, Result};
use crate::events::{Completion, InstallOutcome, Reporter};
use crate::launcher::Launcher;
use crate::platform::{resolve_spec, Resolution};
use crate::types::{PackageManager, PlatformTag};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const HOMEBREW_BOOTSTRAP: &str = r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#;

const KNOWN_EXTENSIONS: &[&str] = &["exe", "msi", "dmg", "pkg", "deb", "rpm", "AppImage", "zip"];

const CHUNK_SIZE: usize = 64 * 1024;

/// Executes acquisitions for one host platform
pub struct Executor {
    platform: PlatformTag,
    download_dir: PathBuf,
    client: reqwest::blocking::Client,
    launcher: Arc<dyn Launcher>,
}

impl Executor {
    /// Build an executor with an HTTP client bounded by the configured timeouts
    pub fn new(
        platform: PlatformTag,
        config: &InstallerConfig,
        launcher: Arc<dyn Launcher>,
    ) -> Result<Self> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("appinstaller/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            platform,
            download_dir: config.download_dir.clone(),
            client,
            launcher,
        })
    }

    pub fn platform(&self) -> PlatformTag {
        self.platform
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Resolve `descriptor` for this platform and execute it
    pub fn execute_descriptor(
        &self,
        descriptor: &ApplicationDescriptor,
        reporter: &Reporter,
    ) -> InstallOutcome {
        match resolve_spec(descriptor, self.platform) {
            Resolution::Spec(spec) => self.execute(descriptor.name(), spec, reporter),
            Resolution::Unsupported(platform) => {
                reporter.error(format!(
                    "{} not supported on {}",
                    descriptor.name(),
                    platform.display_name()
                ));
                InstallOutcome::Unsupported(platform)
            }
        }
    }

    /// Execute one acquisition spec
    pub fn execute(&self, app: &str, spec: &AcquisitionSpec, reporter: &Reporter) -> InstallOutcome {
        match spec {
            AcquisitionSpec::PackageReference { manager, package } => {
                self.surface_instruction(app, *manager, package, reporter)
            }
            AcquisitionSpec::DirectDownload { url } => self.download_and_launch(app, url, reporter),
        }
    }

    fn surface_instruction(
        &self,
        app: &str,
        manager: PackageManager,
        package: &str,
        reporter: &Reporter,
    ) -> InstallOutcome {
        let command = manager.install_command(package);
        info!("Surfacing {} instruction for {}: {}", manager, app, command);

        reporter.info(format!("Installing {} via {}...", app, manager));
        reporter.info(format!("Package: {}", package));
        if manager.requires_elevation() {
            reporter.warn("This requires administrator privileges. Please run the following command manually:");
        } else {
            reporter.warn("Please run the following command manually:");
        }
        reporter.info(format!("    {}", command));

        if which::which(manager.program()).is_err() {
            debug!("{} not found on PATH", manager.program());
            match manager {
                PackageManager::Brew => {
                    reporter.warn("Homebrew not found. Please install Homebrew first:");
                    reporter.info(format!("    {}", HOMEBREW_BOOTSTRAP));
                }
                _ => reporter.warn(format!("'{}' was not found on PATH", manager.program())),
            }
        }

        InstallOutcome::Succeeded(Completion::InstructionSurfaced { command })
    }

    fn download_and_launch(&self, app: &str, url: &str, reporter: &Reporter) -> InstallOutcome {
        reporter.info(format!("Downloading {}...", app));

        let file_name = destination_file_name(app, url, self.platform);
        let destination = self.download_dir.join(&file_name);
        reporter.info(format!("Downloading to: {}", destination.display()));

        let bytes = match self.download(url, &destination, reporter) {
            Ok(bytes) => bytes,
            Err(reason) => {
                warn!("Download of {} from {} failed: {}", app, url, reason);
                reporter.error(format!("Download failed: {}", reason));
                reporter.info(format!("You can manually download from: {}", url));
                return InstallOutcome::Failed(reason);
            }
        };
        reporter.success(format!("Downloaded successfully ({})", humanize_size(bytes)));

        self.launch(&destination, reporter)
    }

    /// Stream `url` into `destination`, returning the byte count.
    fn download(
        &self,
        url: &str,
        destination: &Path,
        reporter: &Reporter,
    ) -> std::result::Result<u64, FailureReason> {
        fs::create_dir_all(&self.download_dir).map_err(|e| FailureReason::io(&e))?;

        let partial = partial_path(destination);
        remove_stale_partial(&partial);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FailureReason::Network(classify_request_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkFailure::HttpStatus(status.as_u16()).into());
        }

        let expected = response.content_length();
        let mut file = File::create(&partial).map_err(|e| FailureReason::io(&e))?;

        let copied = copy_body(&mut response, &mut file, expected, reporter)
            .and_then(|written| {
                file.flush().map_err(|e| FailureReason::io(&e))?;
                Ok(written)
            });
        drop(file);

        let written = match copied {
            Ok(written) => written,
            Err(reason) => {
                if let Err(e) = fs::remove_file(&partial) {
                    warn!("Failed to remove partial file {}: {}", partial.display(), e);
                }
                return Err(reason);
            }
        };

        fs::rename(&partial, destination).map_err(|e| {
            let _ = fs::remove_file(&partial);
            FailureReason::io(&e)
        })?;

        debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }

    fn launch(&self, path: &Path, reporter: &Reporter) -> InstallOutcome {
        let (opening, done) = match self.platform {
            PlatformTag::Windows => (
                "Opening installer...",
                "Installer launched. Please follow the installation wizard.",
            ),
            PlatformTag::Mac => (
                "Opening disk image...",
                "Disk image opened. Please drag the app to the Applications folder.",
            ),
            PlatformTag::Linux => (
                "Opening package with the system handler...",
                "Package opened with the system handler.",
            ),
        };

        if self.platform == PlatformTag::Linux {
            for hint in manual_install_hints(path) {
                reporter.info(hint);
            }
        }

        reporter.info(opening);
        if let Err(e) = self.launcher.launch(self.platform, path) {
            warn!("Launch of {} failed: {}", path.display(), e);
            reporter.error(format!("Could not open {}: {}", path.display(), e));
            return InstallOutcome::Failed(FailureReason::launch(e.to_string()));
        }
        reporter.success(done);

        let path = path.to_path_buf();
        match self.platform {
            PlatformTag::Windows => InstallOutcome::Succeeded(Completion::Launched { path }),
            PlatformTag::Linux | PlatformTag::Mac => {
                InstallOutcome::Succeeded(Completion::Opened { path })
            }
        }
    }
}

/// Copy the response body, enforcing the declared length
fn copy_body<R: Read, W: Write>(
    body: &mut R,
    sink: &mut W,
    expected: Option<u64>,
    reporter: &Reporter,
) -> std::result::Result<u64, FailureReason> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    let mut next_quarter = 1u64;

    loop {
        let read = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let kind = classify_body_error(&e);
                // A short body that dies mid-stream is reported as incomplete
                if kind != NetworkFailure::Timeout && expected.is_some_and(|n| written < n) {
                    return Err(NetworkFailure::IncompleteTransfer.into());
                }
                return Err(kind.into());
            }
        };
        sink.write_all(&buf[..read]).map_err(|e| FailureReason::io(&e))?;
        written += read as u64;

        if let Some(total) = expected.filter(|n| *n > 0) {
            while next_quarter < 4 && written * 4 >= total * next_quarter {
                reporter.info(format!(
                    "Downloaded {} of {} ({}%)",
                    humanize_size(written),
                    humanize_size(total),
                    next_quarter * 25
                ));
                next_quarter += 1;
            }
        }
    }

    match expected {
        Some(total) if total != written => {
            debug!("Expected {} bytes, received {}", total, written);
            Err(NetworkFailure::IncompleteTransfer.into())
        }
        _ => Ok(written),
    }
}

fn classify_request_error(err: &reqwest::Error) -> NetworkFailure {
    if err.is_timeout() {
        NetworkFailure::Timeout
    } else if err.is_connect() {
        NetworkFailure::Unreachable
    } else if let Some(status) = err.status() {
        NetworkFailure::HttpStatus(status.as_u16())
    } else {
        NetworkFailure::Other(err.to_string())
    }
}

fn classify_body_error(err: &io::Error) -> NetworkFailure {
    if err.kind() == io::ErrorKind::TimedOut {
        return NetworkFailure::Timeout;
    }
    if let Some(inner) = err.get_ref().and_then(|e| e.downcast_ref::<reqwest::Error>()) {
        return classify_request_error(inner);
    }
    if err.to_string().contains("timed out") {
        return NetworkFailure::Timeout;
    }
    NetworkFailure::Other(err.to_string())
}

/// Drop a `.part` left behind by an interrupted run
fn remove_stale_partial(partial: &Path) {
    match fs::remove_file(partial) {
        Ok(()) => debug!("Removed stale partial file {}", partial.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove stale partial file {}: {}", partial.display(), e),
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// Deterministic, collision-free file name for a download.
///
/// `<sanitized app name>-<first 8 hex of sha256(url)>.<ext>`, where the
/// extension comes from the URL path when recognised and from the platform
/// otherwise.
pub fn destination_file_name(app: &str, url: &str, platform: PlatformTag) -> String {
    let stem: String = app
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "download".to_string() } else { stem };

    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let extension = extension_from_url(url).unwrap_or(platform.default_extension());

    format!("{}-{}.{}", stem, &digest[..8], extension)
}

fn extension_from_url(url: &str) -> Option<&'static str> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?.to_string();
    let (_, ext) = segment.rsplit_once('.')?;
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(ext))
}

fn manual_install_hints(path: &Path) -> Vec<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("deb") => vec![
            "To install manually, run:".to_string(),
            format!("    sudo dpkg -i {}", path.display()),
            "    sudo apt-get install -f".to_string(),
        ],
        Some("rpm") => vec![
            "To install manually, run:".to_string(),
            format!("    sudo dnf install {}", path.display()),
        ],
        _ => Vec::new(),
    }
}

/// Convert bytes to human-readable size string.
fn humanize_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GiB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StatusEvent;
    use std::sync::mpsc;

    struct ShortReader {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for ShortReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos >= self.data.len() {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"));
            }
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn reporter() -> (Reporter, mpsc::Receiver<StatusEvent>) {
        let (tx, rx) = mpsc::channel();
        (Reporter::new("Test", tx), rx)
    }

    #[test]
    fn test_humanize_size() {
        assert_eq!(humanize_size(512), "512 B");
        assert_eq!(humanize_size(1024), "1.00 KiB");
        assert_eq!(humanize_size(1536), "1.50 KiB");
        assert_eq!(humanize_size(1048576), "1.00 MiB");
        assert_eq!(humanize_size(1073741824), "1.00 GiB");
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let a = destination_file_name("VLC Media Player", "https://x/vlc.exe", PlatformTag::Windows);
        let b = destination_file_name("VLC Media Player", "https://x/vlc.exe", PlatformTag::Windows);
        assert_eq!(a, b);
        assert!(a.starts_with("VLC_Media_Player-"));
        assert!(a.ends_with(".exe"));
    }

    #[test]
    fn test_file_name_distinguishes_urls() {
        let a = destination_file_name("Foo Bar", "https://x/a", PlatformTag::Linux);
        let b = destination_file_name("Foo_Bar", "https://x/b", PlatformTag::Linux);
        assert_ne!(a, b);
    }

    #[test]
    fn test_extension_from_url_or_platform() {
        let name = destination_file_name(
            "VLC",
            "https://get.videolan.org/vlc/3.0.21/macosx/vlc-3.0.21-universal.dmg",
            PlatformTag::Mac,
        );
        assert!(name.ends_with(".dmg"));

        let name = destination_file_name(
            "Discord",
            "https://discord.com/api/download?platform=linux&format=deb",
            PlatformTag::Linux,
        );
        assert!(name.ends_with(".deb"));

        let name = destination_file_name("Tool", "https://x/tool.AppImage", PlatformTag::Windows);
        assert!(name.ends_with(".AppImage"));
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        let partial = partial_path(Path::new("/tmp/dl/Vim-0011aabb.exe"));
        assert_eq!(partial, PathBuf::from("/tmp/dl/Vim-0011aabb.exe.part"));
    }

    #[test]
    fn test_copy_body_complete() {
        let (reporter, rx) = reporter();
        let data = vec![7u8; 200_000];
        let mut sink = Vec::new();
        let written = copy_body(&mut data.as_slice(), &mut sink, Some(200_000), &reporter).unwrap();
        assert_eq!(written, 200_000);
        assert_eq!(sink.len(), 200_000);

        drop(reporter);
        let progress: Vec<_> = rx.iter().map(|e| e.message().to_string()).collect();
        assert_eq!(progress.len(), 3, "one line per quarter below 100%: {:?}", progress);
    }

    #[test]
    fn test_copy_body_short_read_is_incomplete() {
        let (reporter, _rx) = reporter();
        let mut sink = Vec::new();
        let err = copy_body(&mut &[1u8, 2, 3][..], &mut sink, Some(10), &reporter).unwrap_err();
        assert_eq!(err, FailureReason::Network(NetworkFailure::IncompleteTransfer));
    }

    #[test]
    fn test_copy_body_stream_error_is_incomplete() {
        let (reporter, _rx) = reporter();
        let mut body = ShortReader { data: vec![0u8; 10], pos: 0 };
        let mut sink = Vec::new();
        let err = copy_body(&mut body, &mut sink, Some(100), &reporter).unwrap_err();
        assert_eq!(err, FailureReason::Network(NetworkFailure::IncompleteTransfer));
    }

    #[test]
    fn test_body_timeout_classification() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "operation timed out");
        assert_eq!(classify_body_error(&err), NetworkFailure::Timeout);
    }

    #[test]
    fn test_manual_hints_for_deb() {
        let hints = manual_install_hints(Path::new("/tmp/dl/Discord-aa.deb"));
        assert!(hints.iter().any(|h| h.contains("sudo dpkg -i /tmp/dl/Discord-aa.deb")));
        assert!(manual_install_hints(Path::new("/tmp/dl/x.AppImage")).is_empty());
    }
}

//! Post-download launch step
//!
//! Launches are fire-and-forget: the child is started in its own process
//! group with null stdio, and a short-lived reaper thread waits on it so the
//! installer never leaves zombies behind. Exit codes are logged, not reported.

use crate::types::PlatformTag;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Starts or opens a downloaded file
pub trait Launcher: Send + Sync {
    /// Start the external process for `path`. Returns once the process has
    /// been spawned; never waits for user interaction inside it.
    fn launch(&self, platform: PlatformTag, path: &Path) -> io::Result<()>;
}

/// Launcher backed by real OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Build the command for `platform`.
    ///
    /// - windows: `cmd /C start "" <file>` goes through ShellExecute, so `.msi`
    ///   packages open and installers that need elevation get the UAC prompt
    /// - mac: `open <file>` mounts a disk image or opens a pkg
    /// - linux: `xdg-open <file>` hands the package to the desktop's handler
    pub fn command_for(platform: PlatformTag, path: &Path) -> Command {
        let mut cmd = match platform {
            PlatformTag::Windows => {
                let mut cmd = Command::new("cmd");
                cmd.args(["/C", "start", ""]).arg(path);
                cmd
            }
            PlatformTag::Mac => {
                let mut cmd = Command::new("open");
                cmd.arg(path);
                cmd
            }
            PlatformTag::Linux => {
                let mut cmd = Command::new("xdg-open");
                cmd.arg(path);
                cmd
            }
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut cmd);
        cmd
    }
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}

impl Launcher for SystemLauncher {
    fn launch(&self, platform: PlatformTag, path: &Path) -> io::Result<()> {
        let mut cmd = Self::command_for(platform, path);
        info!("Launching {:?} for {}", cmd.get_program(), path.display());

        let mut child = cmd.spawn()?;
        let pid = child.id();
        debug!("Spawned detached process PID {}", pid);

        // Reaper only; nothing waits on this thread.
        std::thread::Builder::new()
            .name(format!("reap-{}", pid))
            .spawn(move || match child.wait() {
                Ok(status) => debug!("Launched process {} exited with {}", pid, status),
                Err(e) => warn!("Failed to wait for launched process {}: {}", pid, e),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::PathBuf;

    #[test]
    fn test_command_per_platform() {
        let path = PathBuf::from("/tmp/InstallerDownloads/VLC.dmg");

        let cmd = SystemLauncher::command_for(PlatformTag::Mac, &path);
        assert_eq!(cmd.get_program(), OsStr::new("open"));
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), vec![path.as_os_str()]);

        let cmd = SystemLauncher::command_for(PlatformTag::Linux, &path);
        assert_eq!(cmd.get_program(), OsStr::new("xdg-open"));

    }

    #[test]
    fn test_windows_installers_open_through_shell() {
        for file in ["C:\\Downloads\\7-Zip-0a1b2c3d.exe", "C:\\Downloads\\Tool-0a1b2c3d.msi"] {
            let path = PathBuf::from(file);
            let cmd = SystemLauncher::command_for(PlatformTag::Windows, &path);
            assert_eq!(cmd.get_program(), OsStr::new("cmd"));
            assert_eq!(
                cmd.get_args().collect::<Vec<_>>(),
                vec![
                    OsStr::new("/C"),
                    OsStr::new("start"),
                    OsStr::new(""),
                    path.as_os_str()
                ]
            );
        }
    }

    // `cmd` only exists on Windows hosts
    #[cfg(unix)]
    #[test]
    fn test_launch_missing_program_is_error() {
        let launcher = SystemLauncher::new();
        let result = launcher.launch(
            PlatformTag::Windows,
            Path::new("/nonexistent/appinstaller/setup.exe"),
        );
        assert!(result.is_err());
    }
}

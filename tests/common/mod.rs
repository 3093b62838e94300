//! Shared fixtures for integration tests
//!
//! A tiny HTTP/1.1 server on a loopback `TcpListener` and a `Launcher` that
//! records instead of spawning processes.

#![allow(dead_code)]

use appinstaller::{
    Catalog, Executor, InstallerConfig, Launcher, Orchestrator, PlatformTag, StatusEvent,
};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// ============================================================================
// HTTP fixture server
// ============================================================================

/// How the server answers one path
#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with the full body
    Ok(Vec<u8>),
    /// Status with an empty body
    Status(u16),
    /// Declares `declared` bytes, sends `body`, then closes the connection
    Truncated { declared: usize, body: Vec<u8> },
    /// Accepts the connection and never answers
    Hang,
}

pub struct FixtureServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl FixtureServer {
    pub fn start<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = (S, Route)>,
        S: Into<String>,
    {
        let routes: Arc<HashMap<String, Route>> =
            Arc::new(routes.into_iter().map(|(p, r)| (p.into(), r)).collect());
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let server_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let routes = Arc::clone(&routes);
                server_hits.fetch_add(1, Ordering::SeqCst);
                thread::spawn(move || {
                    let _ = serve(stream, &routes);
                });
            }
        });

        Self { addr, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connections accepted so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn serve(stream: TcpStream, routes: &HashMap<String, Route>) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header == "\r\n" {
            break;
        }
    }

    let mut stream = stream;
    match routes.get(&path) {
        Some(Route::Ok(body)) => respond(&mut stream, 200, "OK", body.len(), body),
        Some(Route::Status(code)) => respond(&mut stream, *code, "Error", 0, &[]),
        Some(Route::Truncated { declared, body }) => {
            respond(&mut stream, 200, "OK", *declared, body)
        }
        Some(Route::Hang) => {
            thread::sleep(Duration::from_secs(30));
            Ok(())
        }
        None => respond(&mut stream, 404, "Not Found", 0, &[]),
    }
}

fn respond(
    stream: &mut TcpStream,
    code: u16,
    reason: &str,
    content_length: usize,
    body: &[u8],
) -> io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        code, reason, content_length
    )?;
    stream.write_all(body)?;
    stream.flush()
}

// ============================================================================
// Launcher double
// ============================================================================

/// Records every launch; optionally fails them
#[derive(Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<(PlatformTag, PathBuf)>>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn launched(&self) -> Vec<(PlatformTag, PathBuf)> {
        self.launched.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, platform: PlatformTag, path: &Path) -> io::Result<()> {
        self.launched
            .lock()
            .unwrap()
            .push((platform, path.to_path_buf()));
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no handler"));
        }
        Ok(())
    }
}

/// Panics on every launch, standing in for a job that dies mid-run
pub struct PanicLauncher;

impl Launcher for PanicLauncher {
    fn launch(&self, _platform: PlatformTag, path: &Path) -> io::Result<()> {
        panic!("launcher crashed on {}", path.display());
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn test_config(download_dir: &Path) -> InstallerConfig {
    InstallerConfig::new()
        .with_download_dir(download_dir)
        .with_request_timeout(Duration::from_secs(10))
        .with_workers(2)
}

pub fn orchestrator<L: Launcher + 'static>(
    catalog: Catalog,
    platform: PlatformTag,
    config: &InstallerConfig,
    launcher: Arc<L>,
) -> Orchestrator {
    let executor = Executor::new(platform, config, launcher).unwrap();
    Orchestrator::new(catalog, executor, config).unwrap()
}

/// Events for one application, in delivery order
pub fn events_for<'a>(events: &'a [StatusEvent], app: &str) -> Vec<&'a StatusEvent> {
    events.iter().filter(|e| e.app() == Some(app)).collect()
}

/// Files in `dir`, sorted by name
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = read
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

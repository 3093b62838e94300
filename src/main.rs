use anyhow::{Context, Result};
use appinstaller::app::App;
use appinstaller::cli::{Cli, Commands};
use appinstaller::{
    Catalog, InstallationRequest, InstallerConfig, Orchestrator, Executor, SystemLauncher,
    detect_platform,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io::stdout;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// File the TUI logs to, inside the download directory
const LOG_FILE_NAME: &str = "appinstaller.log";

/// Where log output goes
enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the default level.
fn init_logger(target: LogTarget<'_>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => match File::create(path) {
            Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
            // The alternate screen must stay clean; run without logs.
            Err(_) => return,
        },
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = cli.installer_config();

    match &cli.command {
        Some(Commands::List { catalog }) => {
            init_logger(LogTarget::Stderr);
            list_catalog(&load_catalog(catalog.as_deref())?)?;
        }
        Some(Commands::Install { apps, all, catalog }) => {
            init_logger(LogTarget::Stderr);
            let catalog = load_catalog(catalog.as_deref())?;
            let names: Vec<String> = if *all {
                catalog.names().map(str::to_string).collect()
            } else {
                apps.iter()
                    .map(|name| {
                        catalog
                            .canonical_name(name)
                            .map(str::to_string)
                            .unwrap_or_else(|| name.clone())
                    })
                    .collect()
            };
            run_headless(catalog, &config, InstallationRequest::new(names))?;
        }
        Some(Commands::Validate { catalog }) => {
            init_logger(LogTarget::Stderr);
            info!("Validating catalog file: {:?}", catalog);
            match Catalog::load_from_file(catalog) {
                Ok(parsed) => {
                    println!(
                        "✓ Catalog file is valid: {} application(s)",
                        parsed.len()
                    );
                }
                Err(e) => {
                    error!("Catalog validation failed: {}", e);
                    eprintln!("✗ Catalog validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::ExportCatalog { output }) => {
            init_logger(LogTarget::Stderr);
            let catalog = Catalog::builtin().context("Built-in catalog is invalid")?;
            match output {
                Some(path) => {
                    catalog.save_to_file(path)?;
                    println!("✓ Catalog written to {:?}", path);
                }
                None => println!("{}", catalog.to_json_string()?),
            }
        }
        None => {
            let log_path = config
                .ensure_download_dir()
                .map(|dir| dir.join(LOG_FILE_NAME))
                .context("Failed to create download directory")?;
            init_logger(LogTarget::File(&log_path));
            info!("appinstaller starting up");
            run_tui(Catalog::builtin()?, &config)?;
        }
    }

    Ok(())
}

/// Built-in catalog, with `path` merged over it when given
fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let mut catalog = Catalog::builtin().context("Built-in catalog is invalid")?;
    if let Some(path) = path {
        let overrides = Catalog::load_from_file(path)
            .with_context(|| format!("Failed to load catalog {:?}", path))?;
        debug!("Merging {} catalog override(s)", overrides.len());
        catalog.merge(overrides);
    }
    Ok(catalog)
}

fn build_orchestrator(catalog: Catalog, config: &InstallerConfig) -> Result<Orchestrator> {
    let platform = detect_platform()?;
    let executor = Executor::new(platform, config, Arc::new(SystemLauncher::new()))
        .context("Failed to set up the download client")?;
    Ok(Orchestrator::new(catalog, executor, config)?)
}

fn list_catalog(catalog: &Catalog) -> Result<()> {
    let host = detect_platform().ok();
    for descriptor in catalog.iter() {
        let platforms: Vec<String> = descriptor.platforms().map(|p| p.to_string()).collect();
        let marker = match host {
            Some(host) if descriptor.supports(host) => "✓",
            Some(_) => "✗",
            None => "?",
        };
        println!("{} {:<24} {}", marker, descriptor.name(), platforms.join(", "));
    }
    Ok(())
}

/// Run a request without the UI, printing events to stdout
fn run_headless(
    catalog: Catalog,
    config: &InstallerConfig,
    request: InstallationRequest,
) -> Result<()> {
    if request.is_empty() {
        warn!("No applications requested");
        println!("Please select at least one application to install.");
        return Ok(());
    }

    let orchestrator = build_orchestrator(catalog, config)?;
    let mut run = orchestrator.run(&request);

    let cancel = run.cancel_handle();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    for event in run.by_ref() {
        println!("{}", event);
    }
    let report = run.into_report();
    info!("Headless run finished: {}", report.summary);
    Ok(())
}

/// Run the TUI
fn run_tui(catalog: Catalog, config: &InstallerConfig) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(catalog, config)?);
    debug!("Initializing terminal for TUI mode");

    enable_raw_mode().context("Failed to enable raw mode")?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(orchestrator);
    let result = app.run(&mut terminal);

    // Cleanup terminal (always attempt cleanup, even if app failed)
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);

    if let Err(e) = &result {
        error!("Application error: {}", e);
    }

    // Dropping the orchestrator joins the workers, so in-flight downloads
    // run to completion or timeout before the process exits.
    let pending = app.state().pending_results();
    if pending > 0 {
        info!("Exiting with {} application(s) still in progress", pending);
        println!(
            "Waiting for {} running download(s) to finish (up to {}s)...",
            pending,
            config.request_timeout().as_secs()
        );
    }
    drop(app);
    Ok(result?)
}

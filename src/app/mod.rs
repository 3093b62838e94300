//! Terminal presentation surface
//!
//! Renders the catalog as a checklist and streams a request's status events
//! into a log pane. The UI thread only polls: the request runs on a
//! background thread that forwards events through an mpsc channel.

pub mod state;

pub use state::{AppMode, AppState, ChecklistItem};

use crate::error::{InstallerError, Result};
use crate::events::StatusEvent;
use crate::orchestrator::{CancelHandle, Orchestrator};
use crate::ui;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Main application
pub struct App {
    state: AppState,
    orchestrator: Arc<Orchestrator>,
    events: Option<Receiver<StatusEvent>>,
    cancel: Option<CancelHandle>,
}

impl App {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let platform = orchestrator.platform();
        let apps: Vec<(String, bool)> = orchestrator
            .catalog()
            .iter()
            .map(|d| (d.name().to_string(), d.supports(platform)))
            .collect();

        Self {
            state: AppState::new(platform, apps),
            orchestrator,
            events: None,
            cancel: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the main loop until the user quits
    pub fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        info!("Starting main application loop");

        loop {
            self.poll_install_events();

            terminal
                .draw(|f| ui::render(f, &self.state))
                .map_err(|e| InstallerError::terminal(format!("Failed to draw: {}", e)))?;

            if crossterm::event::poll(Duration::from_millis(50))? {
                if let Event::Key(key_event) = crossterm::event::read()? {
                    if self.handle_key_event(key_event) {
                        break;
                    }
                }
            }
        }

        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
        Ok(())
    }

    /// Returns true when the user asked to quit
    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        if self.state.help_visible {
            self.state.help_visible = false;
            return false;
        }

        match self.state.mode {
            AppMode::ConfirmDialog => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.start_install(),
                KeyCode::Char('n') | KeyCode::Esc => self.state.cancel_confirmation(),
                _ => {}
            },
            AppMode::Installing => {
                if key.code == KeyCode::Esc {
                    if let Some(cancel) = &self.cancel {
                        cancel.cancel();
                        self.state.status_message =
                            "Cancelling: waiting for running downloads to finish...".into();
                    }
                }
            }
            AppMode::Selecting | AppMode::Complete => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Up | KeyCode::Char('k') => self.state.move_up(),
                KeyCode::Down | KeyCode::Char('j') => self.state.move_down(),
                KeyCode::Char(' ') => self.state.toggle_current(),
                KeyCode::Char('a') => self.state.select_all(),
                KeyCode::Char('n') => self.state.deselect_all(),
                KeyCode::Char('?') => self.state.help_visible = true,
                KeyCode::Enter | KeyCode::Char('i') => {
                    self.state.request_confirmation();
                }
                _ => {}
            },
        }
        false
    }

    fn start_install(&mut self) {
        let Some(request) = self.state.begin_install() else {
            return;
        };
        info!("Starting installation of {:?}", request.apps());

        let run = self.orchestrator.run(&request);
        self.cancel = Some(run.cancel_handle());

        let (tx, rx) = mpsc::channel();
        self.events = Some(rx);
        let spawned = thread::Builder::new()
            .name("install-run".into())
            .spawn(move || {
                for event in run {
                    if tx.send(event).is_err() {
                        debug!("UI receiver dropped, stopping event forwarding");
                        break;
                    }
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to start installation thread: {}", e);
            self.state.status_message = format!("Could not start installation: {}", e);
            self.state.mode = AppMode::Selecting;
            self.events = None;
            self.cancel = None;
        }
    }

    fn poll_install_events(&mut self) {
        let Some(rx) = &self.events else { return };
        loop {
            match rx.try_recv() {
                Ok(event) => self.state.push_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.events = None;
                    self.cancel = None;
                    break;
                }
            }
        }
    }
}

//! Application state definitions
//!
//! Pure data behind the checklist UI. Nothing here touches the terminal or
//! spawns threads, so every transition is unit-testable.

use crate::events::{EventKind, StatusEvent, Summary};
use crate::orchestrator::InstallationRequest;
use crate::types::PlatformTag;

/// Maximum log lines kept for the log pane
pub const LOG_CAPACITY: usize = 500;

/// Application operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Checklist is interactive
    Selecting,
    /// Asking the user to confirm the selection
    ConfirmDialog,
    /// A request is running in the background
    Installing,
    /// The last request finished; checklist is interactive again
    Complete,
}

/// One row of the checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub name: String,
    pub supported: bool,
    pub checked: bool,
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub mode: AppMode,
    pub platform: PlatformTag,
    pub items: Vec<ChecklistItem>,
    pub cursor: usize,
    /// Status message for user feedback
    pub status_message: String,
    /// Log pane contents, oldest first
    pub log: Vec<StatusEvent>,
    /// Results received for the running request
    pub results_received: usize,
    /// Applications in the running request
    pub results_expected: usize,
    pub last_summary: Option<Summary>,
    pub help_visible: bool,
}

impl AppState {
    /// Build the checklist from `(name, supported on this platform)` pairs
    pub fn new<I, S>(platform: PlatformTag, apps: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let items = apps
            .into_iter()
            .map(|(name, supported)| ChecklistItem {
                name: name.into(),
                supported,
                checked: false,
            })
            .collect();

        Self {
            mode: AppMode::Selecting,
            platform,
            items,
            cursor: 0,
            status_message: format!(
                "Platform: {} | Select applications to install",
                platform.display_name()
            ),
            log: Vec::new(),
            results_received: 0,
            results_expected: 0,
            last_summary: None,
            help_visible: false,
        }
    }

    /// Whether the checklist accepts edits
    pub fn is_interactive(&self) -> bool {
        matches!(self.mode, AppMode::Selecting | AppMode::Complete)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    pub fn toggle_current(&mut self) {
        if !self.is_interactive() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.cursor) {
            item.checked = !item.checked;
        }
    }

    pub fn select_all(&mut self) {
        if self.is_interactive() {
            self.items.iter_mut().for_each(|item| item.checked = true);
        }
    }

    pub fn deselect_all(&mut self) {
        if self.is_interactive() {
            self.items.iter_mut().for_each(|item| item.checked = false);
        }
    }

    pub fn selected_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.checked)
            .map(|item| item.name.as_str())
            .collect()
    }

    /// Ask for confirmation; refuses an empty selection
    pub fn request_confirmation(&mut self) -> bool {
        if !self.is_interactive() {
            return false;
        }
        if self.selected_names().is_empty() {
            self.status_message = "Please select at least one application to install.".into();
            return false;
        }
        self.mode = AppMode::ConfirmDialog;
        true
    }

    pub fn cancel_confirmation(&mut self) {
        if self.mode == AppMode::ConfirmDialog {
            self.mode = AppMode::Selecting;
        }
    }

    /// Snapshot the selection and switch to `Installing`
    pub fn begin_install(&mut self) -> Option<InstallationRequest> {
        if self.mode != AppMode::ConfirmDialog {
            return None;
        }
        let request = InstallationRequest::new(self.selected_names());
        self.mode = AppMode::Installing;
        self.log.clear();
        self.results_received = 0;
        self.results_expected = request.len();
        self.last_summary = None;
        self.status_message = format!("Installing {} application(s)...", request.len());
        Some(request)
    }

    /// Append an event from the running request
    pub fn push_event(&mut self, event: StatusEvent) {
        match event.kind() {
            EventKind::Result(_) => self.results_received += 1,
            EventKind::Summary(summary) => {
                self.last_summary = Some(*summary);
                self.mode = AppMode::Complete;
                self.status_message =
                    "All selected applications have been processed. Check the log for details."
                        .into();
            }
            EventKind::Progress => {}
        }
        self.log.push(event);
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    /// Applications of the running request still without a result
    pub fn pending_results(&self) -> usize {
        if self.mode != AppMode::Installing {
            return 0;
        }
        self.results_expected.saturating_sub(self.results_received)
    }

    /// Progress of the running request, 0-100
    pub fn progress_percent(&self) -> u16 {
        if self.results_expected == 0 {
            return if self.mode == AppMode::Complete { 100 } else { 0 };
        }
        ((self.results_received.min(self.results_expected) * 100) / self.results_expected) as u16
    }
}

//! Tests for Application State Management
//!
//! These tests verify:
//! - Checklist initialization from the catalog
//! - Selection editing and the empty-selection guard
//! - Mode transitions driven by the event stream

use appinstaller::app::{AppMode, AppState};
use appinstaller::{
    Catalog, InstallOutcome, PlatformTag, Severity, StatusEvent, Summary,
};

fn builtin_state(platform: PlatformTag) -> AppState {
    let catalog = Catalog::builtin().unwrap();
    AppState::new(
        platform,
        catalog
            .iter()
            .map(|d| (d.name().to_string(), d.supports(platform)))
            .collect::<Vec<_>>(),
    )
}

// =============================================================================
// AppState Initialization Tests
// =============================================================================

#[test]
fn test_app_state_starts_selecting_with_nothing_checked() {
    let state = builtin_state(PlatformTag::Linux);
    assert_eq!(state.mode, AppMode::Selecting);
    assert_eq!(state.items.len(), 9);
    assert!(state.selected_names().is_empty());
    assert!(state.status_message.contains("Linux"));
}

#[test]
fn test_app_state_progress_is_zero() {
    let state = builtin_state(PlatformTag::Mac);
    assert_eq!(state.progress_percent(), 0);
    assert!(state.log.is_empty());
}

// =============================================================================
// Selection Tests
// =============================================================================

#[test]
fn test_toggle_and_select_all() {
    let mut state = builtin_state(PlatformTag::Windows);
    state.toggle_current();
    assert_eq!(state.selected_names().len(), 1);
    state.toggle_current();
    assert!(state.selected_names().is_empty());

    state.select_all();
    assert_eq!(state.selected_names().len(), 9);
    state.deselect_all();
    assert!(state.selected_names().is_empty());
}

#[test]
fn test_empty_selection_does_not_open_dialog() {
    let mut state = builtin_state(PlatformTag::Windows);
    assert!(!state.request_confirmation());
    assert_eq!(state.mode, AppMode::Selecting);
    assert!(state.begin_install().is_none());
}

#[test]
fn test_begin_install_snapshots_selection() {
    let mut state = builtin_state(PlatformTag::Windows);
    state.move_down();
    state.toggle_current();
    let expected = state.items[1].name.clone();

    assert!(state.request_confirmation());
    assert_eq!(state.mode, AppMode::ConfirmDialog);

    let request = state.begin_install().unwrap();
    assert_eq!(request.apps(), &[expected]);
    assert_eq!(state.mode, AppMode::Installing);
    assert_eq!(state.results_expected, 1);

    // Selection is frozen while installing
    state.select_all();
    assert_eq!(state.selected_names().len(), 1);
}

#[test]
fn test_cancel_confirmation_returns_to_selecting() {
    let mut state = builtin_state(PlatformTag::Linux);
    state.select_all();
    state.request_confirmation();
    state.cancel_confirmation();
    assert_eq!(state.mode, AppMode::Selecting);
}

// =============================================================================
// Event Stream Tests
// =============================================================================

#[test]
fn test_events_drive_progress_and_completion() {
    let mut state = builtin_state(PlatformTag::Linux);
    state.select_all();
    state.request_confirmation();
    let request = state.begin_install().unwrap();
    assert_eq!(request.len(), 9);

    state.push_event(StatusEvent::batch(Severity::Info, "Starting"));
    state.push_event(StatusEvent::result("Vim", InstallOutcome::Skipped));
    state.push_event(StatusEvent::result("Steam", InstallOutcome::Skipped));
    assert_eq!(state.results_received, 2);
    assert_eq!(state.progress_percent(), 22);
    assert_eq!(state.mode, AppMode::Installing);

    let summary = Summary {
        skipped: 9,
        ..Summary::default()
    };
    state.push_event(StatusEvent::summary(summary));
    assert_eq!(state.mode, AppMode::Complete);
    assert_eq!(state.last_summary, Some(summary));
    assert_eq!(state.log.len(), 4);
    assert!(state.is_interactive());
}

#[test]
fn test_log_is_bounded() {
    let mut state = builtin_state(PlatformTag::Linux);
    for i in 0..(appinstaller::app::state::LOG_CAPACITY + 25) {
        state.push_event(StatusEvent::batch(Severity::Info, format!("line {}", i)));
    }
    assert_eq!(state.log.len(), appinstaller::app::state::LOG_CAPACITY);
    assert_eq!(state.log.last().unwrap().message(), format!(
        "line {}",
        appinstaller::app::state::LOG_CAPACITY + 24
    ));
}

#[test]
fn test_pending_results_counts_only_while_installing() {
    let mut state = builtin_state(PlatformTag::Windows);
    state.select_all();
    assert_eq!(state.pending_results(), 0);

    state.request_confirmation();
    state.begin_install().unwrap();
    assert_eq!(state.pending_results(), 9);

    state.push_event(StatusEvent::result("Vim", InstallOutcome::Skipped));
    assert_eq!(state.pending_results(), 8);

    state.push_event(StatusEvent::summary(Summary {
        skipped: 9,
        ..Summary::default()
    }));
    assert_eq!(state.pending_results(), 0);
}

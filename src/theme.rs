//! Centralized theme and styling for the TUI
//!
//! Single source of truth for the colors and styles of the checklist,
//! log pane and dialogs.

use crate::types::Severity;
use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the application
pub struct Colors;

impl Colors {
    /// Primary dark background - used for dialogs
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Primary accent color - borders, titles
    pub const PRIMARY: Color = Color::Cyan;

    /// Selected item highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Selected item text (for contrast on yellow bg)
    pub const SELECTED_FG: Color = Color::Black;

    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
    pub const INFO: Color = Color::Blue;

    /// Navigation hint color
    pub const NAV_HINT: Color = Color::DarkGray;

    /// Progress bar fill
    pub const PROGRESS: Color = Color::Green;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::PRIMARY)
    }

    /// Cursor row in the checklist
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }

    pub fn dialog() -> Style {
        Style::default().bg(Colors::BG_PRIMARY).fg(Colors::FG_PRIMARY)
    }

    pub fn gauge() -> Style {
        Style::default().fg(Colors::PROGRESS)
    }
}

// =============================================================================
// SEMANTIC STYLES
// =============================================================================

pub struct Theme;

impl Theme {
    /// Style for a log line of the given severity
    pub fn log_style(severity: Severity) -> Style {
        match severity {
            Severity::Info => Style::default().fg(Colors::INFO),
            Severity::Success => Style::default().fg(Colors::SUCCESS),
            Severity::Warning => Style::default().fg(Colors::WARNING),
            Severity::Error => Style::default()
                .fg(Colors::ERROR)
                .add_modifier(Modifier::BOLD),
        }
    }
}

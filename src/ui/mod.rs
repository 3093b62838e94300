//! User interface rendering module
//!
//! - `dialogs` - confirmation and help overlays
//!
//! Layout, top to bottom: title, checklist, progress gauge, log pane,
//! status line and navigation hints.

mod dialogs;

use crate::app::{AppMode, AppState};
use crate::events::StatusEvent;
use crate::theme::{Styles, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the whole screen for the current state
pub fn render(f: &mut Frame, state: &AppState) {
    let area = f.area();
    if area.width == 0 || area.height == 0 {
        return;
    }

    let checklist_height = (state.items.len() as u16 + 2).min(area.height / 2).max(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                // Title
            Constraint::Length(checklist_height), // Checklist
            Constraint::Length(3),                // Progress
            Constraint::Min(3),                   // Log
            Constraint::Length(1),                // Status
            Constraint::Length(1),                // Hints
        ])
        .split(area);

    render_title(f, chunks[0], state);
    render_checklist(f, chunks[1], state);
    render_progress(f, chunks[2], state);
    render_log(f, chunks[3], state);

    f.render_widget(
        Paragraph::new(state.status_message.as_str()).style(Styles::text()),
        chunks[4],
    );
    f.render_widget(
        Paragraph::new(nav_hints(state.mode)).style(Styles::nav_hint()),
        chunks[5],
    );

    if state.mode == AppMode::ConfirmDialog {
        dialogs::render_confirm_dialog(f, state);
    }
    if state.help_visible {
        dialogs::render_help(f);
    }
}

fn render_title(f: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(
        "Software Installer ({})",
        state.platform.display_name()
    );
    let widget = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL).border_style(Styles::border_active()))
        .alignment(Alignment::Center)
        .style(Styles::title());
    f.render_widget(widget, area);
}

fn render_checklist(f: &mut Frame, area: Rect, state: &AppState) {
    let items: Vec<ListItem> = state
        .items
        .iter()
        .map(|item| {
            let mark = if item.checked { "[x]" } else { "[ ]" };
            let mut spans = vec![Span::raw(format!("{} {}", mark, item.name))];
            if !item.supported {
                spans.push(Span::styled(
                    format!("  (not available on {})", state.platform.display_name()),
                    Styles::text_muted(),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let selected = state.selected_names().len();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(format!(
                    " Select the applications you want to install ({} selected) ",
                    selected
                )),
        )
        .highlight_style(Styles::selected());

    let mut list_state = ListState::default();
    if state.is_interactive() && !state.items.is_empty() {
        list_state.select(Some(state.cursor));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_progress(f: &mut Frame, area: Rect, state: &AppState) {
    let label = match (state.mode, state.last_summary) {
        (AppMode::Complete, Some(summary)) => summary.to_string(),
        _ => format!("{}/{}", state.results_received, state.results_expected),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Styles::gauge())
        .percent(state.progress_percent())
        .label(label);
    f.render_widget(gauge, area);
}

fn render_log(f: &mut Frame, area: Rect, state: &AppState) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(inner_height);
    let lines: Vec<Line> = state.log[start..].iter().map(log_line).collect();

    let log = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Installation Log "))
        .wrap(Wrap { trim: false });
    f.render_widget(log, area);
}

fn log_line(event: &StatusEvent) -> Line<'_> {
    Line::from(Span::styled(
        event.to_string(),
        Theme::log_style(event.severity()),
    ))
}

fn nav_hints(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Selecting | AppMode::Complete => {
            "↑/↓: Move | Space: Toggle | a: All | n: None | Enter: Install | ?: Help | q: Quit"
        }
        AppMode::ConfirmDialog => "y/Enter: Start | n/Esc: Back",
        AppMode::Installing => "Esc: Cancel pending | Ctrl+C: Quit",
    }
}

/// Rectangle of the given size centered in `area`, clamped to fit
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(60, 20, area);
        assert_eq!(rect, area);

        let rect = centered_rect(20, 4, area);
        assert_eq!(rect, Rect::new(10, 3, 20, 4));
    }

    #[test]
    fn test_every_mode_has_hints() {
        for mode in [
            AppMode::Selecting,
            AppMode::ConfirmDialog,
            AppMode::Installing,
            AppMode::Complete,
        ] {
            assert!(!nav_hints(mode).is_empty());
        }
    }
}

//! Confirmation and help overlays

use super::centered_rect;
use crate::app::AppState;
use crate::theme::Styles;
use ratatui::{
    layout::Alignment,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render confirmation dialog overlay
pub fn render_confirm_dialog(f: &mut Frame, state: &AppState) {
    let names = state.selected_names();
    let height = (names.len() as u16).min(10) + 6;
    let area = centered_rect(60, height, f.area());

    let mut lines = vec![
        Line::from(format!("Install {} application(s)?", names.len())),
        Line::from(""),
    ];
    lines.extend(names.iter().take(10).map(|n| Line::from(format!("  • {}", n))));
    if names.len() > 10 {
        lines.push(Line::from(format!("  ... and {} more", names.len() - 10)));
    }

    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(" Confirm (y/n) "),
        )
        .style(Styles::dialog())
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

/// Render keybinding help overlay
pub fn render_help(f: &mut Frame) {
    let area = centered_rect(50, 13, f.area());
    let lines: Vec<Line> = [
        "↑/k, ↓/j   Move cursor",
        "Space      Toggle application",
        "a          Select all",
        "n          Deselect all",
        "Enter/i    Install selected",
        "Esc        Cancel pending installs",
        "q          Quit",
        "",
        "Press any key to close",
    ]
    .into_iter()
    .map(Line::from)
    .collect();

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(" Help "),
        )
        .alignment(Alignment::Left)
        .style(Styles::dialog());

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

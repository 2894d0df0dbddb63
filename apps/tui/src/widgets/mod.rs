//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}

/// Bordered single-line input. Yellow while editing, cyan when focused.
pub(crate) fn input_field<'a>(
    title: &'a str,
    value: &'a str,
    focused: bool,
    editing: bool,
) -> Paragraph<'a> {
    let border = match (focused, editing) {
        (true, true) => Style::default().fg(Color::Yellow),
        (true, false) => Style::default().fg(Color::Cyan),
        _ => Style::default(),
    };
    Paragraph::new(value).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_style(border),
    )
}

/// Centered button-like line for form submission.
pub(crate) fn submit_button(label: &str, focused: bool) -> Paragraph<'_> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Paragraph::new(format!("[ {label} ]"))
        .style(style)
        .alignment(Alignment::Center)
}

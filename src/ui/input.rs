//! Identifier input widget rendering.
//!
//! Displays the exercise identifier bar.

use crate::app::{App, UiMode};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the identifier input bar.
///
/// # Details
/// Shows the typed identifier while entering one, otherwise the identifier
/// on screen. Highlights when in EnterId mode.
pub fn render_id_input(app: &App, area: Rect, buf: &mut Buffer) {
    let is_active = app.mode == UiMode::EnterId;
    let (prompt, value) = if is_active {
        ("Exercise ID: ", app.id_input.as_str())
    } else {
        ("Exercise ID (press '/'): ", app.current_id.as_str())
    };

    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(Color::Yellow)),
        Span::styled(
            value,
            Style::default().fg(if is_active { Color::White } else { Color::Gray }),
        ),
        Span::styled(
            if is_active { "_" } else { "" },
            Style::default().fg(Color::Yellow),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title("Lookup")
            .borders(Borders::ALL)
            .style(if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }),
    );

    Widget::render(paragraph, area, buf);
}

//! Exercise detail widget rendering.
//!
//! Displays the fetched exercise record, or the load state when there is none.

use crate::app::App;
use crate::exercisedb::{Exercise, Source};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Render the exercise detail panel.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
pub fn render_exercise(app: &App, area: Rect, buf: &mut Buffer) {
    let title = match app.exercise_source {
        Some(Source::Cache) => format!("Exercise {} (cached)", app.current_id),
        _ => format!("Exercise {}", app.current_id),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let lines = match &app.exercise {
        Some(exercise) => exercise_lines(exercise),
        None if app.loading => vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))],
        None => vec![Line::from(Span::styled(
            "No exercise to display",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    Widget::render(paragraph, area, buf);
}

fn field(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Cyan)),
        Span::raw(value.to_string()),
    ])
}

fn exercise_lines(exercise: &Exercise) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            exercise.name.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        field("Body part", &exercise.body_part),
        field("Target", &exercise.target),
        field("Equipment", &exercise.equipment),
        field("Secondary", &exercise.format_secondary_muscles()),
        field("Media", &exercise.media_url),
        Line::default(),
        Line::from(Span::styled(
            "Instructions",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(exercise.numbered_instructions().into_iter().map(Line::from));
    lines
}

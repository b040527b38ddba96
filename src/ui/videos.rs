//! Related videos widget rendering.
//!
//! Displays a scrollable list of videos with selection highlighting.

use crate::app::App;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget, Widget},
};

/// Lines used by one video entry (title, channel, views, thumbnail).
pub const LINES_PER_VIDEO: u16 = 4;

/// Render the related videos list.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Keeps the selected video centered once the list is taller than the area.
pub fn render_videos(app: &App, area: Rect, buf: &mut Buffer) {
    let title = format!("Related videos ({})", app.videos.len());

    if app.videos.is_empty() {
        let message = if app.loading {
            "Searching..."
        } else {
            "No related videos"
        };
        let list = List::new(vec![ListItem::new(message)])
            .block(Block::default().title(title).borders(Borders::ALL));
        Widget::render(list, area, buf);
        return;
    }

    let selected_index = app.selected_index.min(app.videos.len() - 1);

    let available_height = area.height.saturating_sub(2);
    let visible_videos = (available_height / LINES_PER_VIDEO).max(1) as usize;
    let scroll_offset = selected_index
        .saturating_sub(visible_videos / 2)
        .min(app.videos.len().saturating_sub(visible_videos));

    let items: Vec<ListItem> = app
        .videos
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_videos)
        .map(|(idx, video)| {
            let is_selected = idx == selected_index;
            let title_style = Style::default()
                .fg(if is_selected {
                    Color::Yellow
                } else {
                    Color::White
                })
                .add_modifier(Modifier::BOLD);

            ListItem::new(vec![
                Line::from(Span::styled(video.title.clone(), title_style)),
                Line::from(Span::styled(
                    format!("Channel: {}", video.channel_name),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    video.format_views().to_string(),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    video.best_thumbnail().unwrap_or("").to_string(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index - scroll_offset));

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        );

    StatefulWidget::render(list, area, buf, &mut list_state);
}

//! UI components module.
//!
//! Contains ratatui widgets for displaying the application interface.

pub mod exercise;
pub mod input;
pub mod videos;

pub use exercise::render_exercise;
pub use input::render_id_input;
pub use videos::render_videos;

/// Flatten a rendered buffer into newline separated rows.
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Application state management.
//!
//! Manages the displayed exercise, its related videos, selection, identifier
//! input and the generation of the load currently on screen.

use crate::exercisedb::{Exercise, Source};
use crate::loader::LoadEvent;
use crate::youtube::VideoSummary;
use std::cmp;
use tracing::debug;

/// UI input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Normal detail view
    Browse,
    /// Typing an exercise identifier
    EnterId,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Identifier of the exercise being shown or loaded
    pub current_id: String,
    /// Exercise on screen
    pub exercise: Option<Exercise>,
    /// Whether the exercise on screen came from the cache
    pub exercise_source: Option<Source>,
    /// Related videos on screen
    pub videos: Vec<VideoSummary>,
    /// Currently selected video index
    pub selected_index: usize,
    /// Identifier typed in EnterId mode
    pub id_input: String,
    /// Current UI mode
    pub mode: UiMode,
    /// Whether a load sequence is still running
    pub loading: bool,
    /// Status message to display
    pub status_message: Option<String>,
    /// Generation whose events are accepted
    generation: u64,
    /// Display limit for related videos
    max_videos: usize,
}

impl App {
    /// Create a new application state.
    ///
    /// # Arguments
    /// * `initial_id` - Exercise identifier shown first
    /// * `max_videos` - Display limit for related videos
    pub fn new(initial_id: &str, max_videos: usize) -> Self {
        Self {
            current_id: initial_id.to_string(),
            exercise: None,
            exercise_source: None,
            videos: Vec::new(),
            selected_index: 0,
            id_input: String::new(),
            mode: UiMode::Browse,
            loading: false,
            status_message: None,
            generation: 0,
            max_videos,
        }
    }

    /// Generation whose events are currently accepted.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch the view to a new load sequence.
    ///
    /// # Arguments
    /// * `id` - Exercise identifier being loaded
    /// * `generation` - Generation returned by the loader
    ///
    /// # Details
    /// Clears the previous exercise and videos so nothing from the old
    /// identifier stays on screen.
    pub fn begin_load(&mut self, id: &str, generation: u64) {
        self.current_id = id.to_string();
        self.generation = generation;
        self.exercise = None;
        self.exercise_source = None;
        self.videos.clear();
        self.selected_index = 0;
        self.loading = true;
        self.set_status(format!("Loading exercise {}...", id));
    }

    /// Switch the view to a related-videos refresh for the current exercise.
    pub fn begin_related(&mut self, generation: u64) {
        self.generation = generation;
        self.videos.clear();
        self.selected_index = 0;
        self.loading = true;
        self.set_status("Fetching related videos...".to_string());
    }

    /// Apply a load event.
    ///
    /// # Returns
    /// * `bool` - False when the event belongs to a superseded generation and was dropped
    pub fn apply_event(&mut self, event: LoadEvent) -> bool {
        if event.generation() != self.generation {
            debug!(
                event_generation = event.generation(),
                current = self.generation,
                "Dropping stale load event"
            );
            return false;
        }

        match event {
            LoadEvent::Exercise {
                exercise, source, ..
            } => {
                self.set_status(match source {
                    Source::Cache => format!("{} (cached, press 'v' for videos)", exercise.name),
                    Source::Network => format!("{}: fetching related videos...", exercise.name),
                });
                // Cached records get no automatic video search
                self.loading = source == Source::Network;
                self.exercise_source = Some(source);
                self.exercise = Some(exercise);
            }
            LoadEvent::Missing { id, reason, .. } => {
                self.loading = false;
                self.exercise = None;
                self.exercise_source = None;
                self.set_status(format!("Exercise {} unavailable: {}", id, reason));
            }
            LoadEvent::Videos { mut videos, .. } => {
                videos.truncate(self.max_videos);
                self.loading = false;
                self.selected_index = 0;
                self.set_status(format!("{} related videos", videos.len()));
                self.videos = videos;
            }
        }
        true
    }

    /// Move selection up, wrapping to the bottom.
    pub fn move_up(&mut self) {
        if self.videos.is_empty() {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = self.videos.len() - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Move selection down, wrapping to the top.
    pub fn move_down(&mut self) {
        if self.videos.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.videos.len();
    }

    /// Currently selected video.
    pub fn selected_video(&self) -> Option<&VideoSummary> {
        self.videos
            .get(cmp::min(self.selected_index, self.videos.len().saturating_sub(1)))
    }

    /// Add a character to the identifier input.
    ///
    /// # Details
    /// Only ASCII alphanumerics are accepted so the identifier is always a
    /// single URL path segment.
    pub fn add_id_char(&mut self, ch: char) {
        if self.mode == UiMode::EnterId && ch.is_ascii_alphanumeric() {
            self.id_input.push(ch);
        }
    }

    /// Remove last character from the identifier input.
    pub fn remove_id_char(&mut self) {
        if self.mode == UiMode::EnterId {
            self.id_input.pop();
        }
    }

    /// Start typing a new identifier.
    pub fn start_id_entry(&mut self) {
        self.mode = UiMode::EnterId;
        self.id_input.clear();
    }

    /// Leave identifier entry, returning the typed identifier if any.
    pub fn finish_id_entry(&mut self) -> Option<String> {
        self.mode = UiMode::Browse;
        let id = std::mem::take(&mut self.id_input);
        if id.is_empty() { None } else { Some(id) }
    }

    /// Abandon identifier entry.
    pub fn cancel_id_entry(&mut self) {
        self.mode = UiMode::Browse;
        self.id_input.clear();
    }

    /// Set status message.
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}

/// Step a numeric identifier, keeping its zero padding.
///
/// # Arguments
/// * `id` - Current identifier (e.g. "0009")
/// * `delta` - Amount to add; negative steps backwards
///
/// # Returns
/// * `Option<String>` - Next identifier, or None for non-numeric ids or steps below zero
pub fn step_id(id: &str, delta: i64) -> Option<String> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i64 = id.parse().ok()?;
    let next = value.checked_add(delta).filter(|n| *n >= 0)?;
    Some(format!("{:0width$}", next, width = id.len()))
}

//! Exercise TUI - terminal viewer for exercise details and related videos.
//!
//! Main entry point and event loop for the application.

mod app;
mod cache;
mod config;
mod error;
mod exercisedb;
mod loader;
mod player;
mod retry;
mod ui;
mod youtube;

use anyhow::Context;
use app::{App, UiMode, step_id};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use exercisedb::ExerciseDbClient;
use loader::{ExerciseLoader, LoadEvent};
use player::open_video;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use youtube::VideoSearchClient;

/// Browse exercise details and related videos in the terminal
#[derive(Parser, Debug)]
#[command(name = "exercise-tui")]
#[command(version)]
struct Cli {
    /// Exercise identifier to open first
    #[arg(default_value = "0001")]
    id: String,

    /// Path to the config file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log file path, overriding the config file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

/// Main application entry point.
///
/// # Details
/// Loads configuration, sets up logging, starts the first load and runs the
/// event loop until the user quits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;

    if cli.write_config {
        config.save(cli.config.as_deref())?;
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::default_config_path()?,
        };
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    config.apply_env();

    let log_path = match &cli.log_file {
        Some(path) => path.clone(),
        None => config.log_file_path()?,
    };
    init_logging(&log_path, &config.log_level)?;

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        warn!(missing = ?missing, "API credentials not configured; requests will be rejected");
    }

    let exercises = ExerciseDbClient::new(&config)?;
    let videos = VideoSearchClient::new(&config)?;
    let max_videos = videos.max_results();
    let (mut loader, mut events) = ExerciseLoader::new(exercises, videos);

    let mut app = App::new(&cli.id, max_videos);
    let generation = loader.begin(&cli.id);
    app.begin_load(&cli.id, generation);
    info!(exercise_id = %cli.id, "Exercise viewer started");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut loader, &mut events, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Route tracing output to a file; the terminal belongs to the UI.
fn init_logging(path: &Path, default_level: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

/// Render the complete UI.
///
/// # Details
/// Lays out the identifier bar, exercise panel, video list and status bar.
fn render_ui(f: &mut ratatui::Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Identifier bar
            Constraint::Min(0),    // Exercise + videos
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    ui::render_id_input(app, rows[0], f.buffer_mut());
    ui::render_exercise(app, columns[0], f.buffer_mut());
    ui::render_videos(app, columns[1], f.buffer_mut());

    let status_text = app.status_message.as_deref().unwrap_or(
        "q quit, / lookup, n/p next/prev, Enter play, v videos, x clear cache",
    );
    let status = ratatui::widgets::Paragraph::new(ratatui::text::Line::from(status_text))
        .block(ratatui::widgets::Block::default().borders(ratatui::widgets::Borders::ALL));
    f.render_widget(status, rows[2]);
}

/// Main event loop.
///
/// # Details
/// Applies load events as they arrive, redraws, and handles keyboard input.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    loader: &mut ExerciseLoader,
    events: &mut UnboundedReceiver<LoadEvent>,
    config: &Config,
) -> anyhow::Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            let generation = event.generation();
            if !app.apply_event(event) {
                debug!(
                    event_generation = generation,
                    view_generation = app.generation(),
                    latest = loader.current_generation(),
                    "Ignored stale load event"
                );
            }
        }

        terminal.draw(|f| render_ui(f, app))?;

        // Non-blocking poll keeps load events flowing into the view
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !handle_key(key, app, loader, config)
        {
            break;
        }
    }

    Ok(())
}

/// Handle one key press.
///
/// # Returns
/// * `bool` - False when the application should exit
fn handle_key(key: KeyEvent, app: &mut App, loader: &mut ExerciseLoader, config: &Config) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    match app.mode {
        UiMode::Browse => match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return false,
            KeyCode::Up | KeyCode::Char('k') => app.move_up(),
            KeyCode::Down | KeyCode::Char('j') => app.move_down(),
            KeyCode::Enter => {
                if let Some(video) = app.selected_video() {
                    let url = video.url();
                    let title = video.title.clone();
                    match open_video(&url, &config.player) {
                        Ok(()) => app.set_status(format!("Opened: {}", title)),
                        Err(e) => app.set_status(format!("Failed to open video: {}", e)),
                    }
                }
            }
            KeyCode::Char('/') | KeyCode::Char('i') => app.start_id_entry(),
            KeyCode::Char('n') | KeyCode::Char('p') => {
                let delta = if key.code == KeyCode::Char('n') { 1 } else { -1 };
                match step_id(&app.current_id, delta) {
                    Some(id) => {
                        let generation = loader.begin(&id);
                        app.begin_load(&id, generation);
                    }
                    None => app.set_status(format!("Cannot step from id {}", app.current_id)),
                }
            }
            KeyCode::Char('v') => {
                if let Some(name) = app.exercise.as_ref().map(|e| e.name.clone()) {
                    let generation = loader.begin_related(&name);
                    app.begin_related(generation);
                }
            }
            KeyCode::Char('x') => {
                let cache = loader.exercises().cache();
                if cache.is_empty() {
                    app.set_status("Exercise cache is already empty".to_string());
                } else {
                    let cleared = cache.len();
                    info!(
                        cleared,
                        hits = cache.hits(),
                        misses = cache.misses(),
                        "Clearing exercise cache"
                    );
                    cache.clear();
                    app.set_status(format!("Cleared {} cached exercises", cleared));
                }
            }
            _ => {}
        },
        UiMode::EnterId => match key.code {
            KeyCode::Enter => {
                if let Some(id) = app.finish_id_entry() {
                    let generation = loader.begin(&id);
                    app.begin_load(&id, generation);
                }
            }
            KeyCode::Esc => app.cancel_id_entry(),
            KeyCode::Backspace => app.remove_id_char(),
            KeyCode::Char(c) => app.add_id_char(c),
            _ => {}
        },
    }

    true
}

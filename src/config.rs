//! Configuration management for the exercise viewer.
//!
//! Handles loading and saving configuration from JSONC files and applying
//! credential overrides from the environment.

use crate::retry::{BackoffStrategy, RetryPolicy};
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config directory.
const APP_DIR: &str = "exercise-tui";

/// Environment variables that override credentials from the config file.
pub const ENV_EXERCISE_KEY: &str = "EXERCISEDB_API_KEY";
pub const ENV_EXERCISE_HOST: &str = "EXERCISEDB_API_HOST";
pub const ENV_VIDEO_KEY: &str = "YOUTUBE_SEARCH_API_KEY";
pub const ENV_VIDEO_HOST: &str = "YOUTUBE_SEARCH_API_HOST";

/// Application configuration structure.
///
/// Every client receives its settings from here; nothing reads the
/// environment after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exercise lookup endpoint and credentials
    pub exercise_api: ExerciseApiSettings,
    /// Video search endpoint and credentials
    pub video_api: VideoApiSettings,
    /// Retry behavior for exercise lookups
    pub retry: RetrySettings,
    /// Exercise cache sizing
    pub cache: CacheSettings,
    /// External player command used to open videos
    pub player: String,
    /// Log file path (relative to config dir or absolute)
    pub log_file: String,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exercise_api: ExerciseApiSettings::default(),
            video_api: VideoApiSettings::default(),
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
            player: "mpv".to_string(),
            log_file: "exercise-tui.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Exercise lookup endpoint and RapidAPI-style credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseApiSettings {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Value sent as the host header
    pub host: String,
    /// Value sent as the key header
    pub api_key: String,
}

impl Default for ExerciseApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://exercisedb.p.rapidapi.com".to_string(),
            host: "exercisedb.p.rapidapi.com".to_string(),
            api_key: String::new(),
        }
    }
}

/// Video search endpoint, credentials and result limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoApiSettings {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Value sent as the host header
    pub host: String,
    /// Value sent as the key header
    pub api_key: String,
    /// Maximum number of related videos to display
    pub max_results: usize,
}

impl Default for VideoApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://youtube-search-and-download.p.rapidapi.com".to_string(),
            host: "youtube-search-and-download.p.rapidapi.com".to_string(),
            api_key: String::new(),
            max_results: 15,
        }
    }
}

/// Retry settings for rate-limited requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Backoff growth
    pub strategy: BackoffStrategy,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            strategy: BackoffStrategy::Linear,
        }
    }
}

impl RetrySettings {
    /// Build the runtime retry policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            strategy: self.strategy,
        }
    }
}

/// Exercise cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of cached exercises
    pub capacity: usize,
    /// Entry lifetime in seconds; entries never expire when unset
    pub ttl_secs: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 256,
            ttl_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    ///
    /// # Details
    /// If no config file exists, returns default configuration. Comments
    /// (`//`) are stripped before parsing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = serde_json::from_str(&strip_comments(&content))
            .with_context(|| "Failed to deserialize config")?;

        Ok(config)
    }

    /// Save configuration to file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, json)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Apply credential overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply credential overrides from an arbitrary lookup.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value for a variable name, if set
    ///
    /// # Details
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a key from the config file.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (ENV_EXERCISE_KEY, &mut self.exercise_api.api_key),
            (ENV_EXERCISE_HOST, &mut self.exercise_api.host),
            (ENV_VIDEO_KEY, &mut self.video_api.api_key),
            (ENV_VIDEO_HOST, &mut self.video_api.host),
        ];
        for (name, slot) in targets {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }

    /// Names of credentials that are still empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.exercise_api.api_key.is_empty() {
            missing.push(ENV_EXERCISE_KEY);
        }
        if self.video_api.api_key.is_empty() {
            missing.push(ENV_VIDEO_KEY);
        }
        missing
    }

    /// Get default configuration file path.
    ///
    /// # Details
    /// Returns `$XDG_CONFIG_HOME/exercise-tui/config.jsonc` or `~/.config/exercise-tui/config.jsonc`.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
        Ok(config_dir.join(APP_DIR).join("config.jsonc"))
    }

    /// Get log file path.
    ///
    /// # Details
    /// If log_file is absolute, returns it as-is.
    /// Otherwise, returns path relative to config directory.
    pub fn log_file_path(&self) -> Result<PathBuf> {
        let log_path = Path::new(&self.log_file);
        if log_path.is_absolute() {
            Ok(log_path.to_path_buf())
        } else {
            let config_dir = config_dir()
                .ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
            Ok(config_dir.join(APP_DIR).join(&self.log_file))
        }
    }
}

/// Strip `//` line comments that are not inside a string literal.
fn strip_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if let Some(comment_pos) = line.find("//") {
                // Odd quote count before the marker means we are inside a string (e.g. a URL)
                let before_comment = &line[..comment_pos];
                if before_comment.matches('"').count() % 2 == 0 {
                    return line[..comment_pos].trim_end();
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

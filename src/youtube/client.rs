//! Video search client implementation.
//!
//! Looks up videos related to an exercise by free-text search. Requests are
//! attempted once; callers that only display the results use
//! `related_videos`, which never fails.

use crate::config::{Config, VideoApiSettings};
use crate::error::FetchError;
use crate::youtube::models::{ApiSearchResponse, VideoSummary};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Video search API client.
#[derive(Debug, Clone)]
pub struct VideoSearchClient {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint, credentials and result limit
    settings: VideoApiSettings,
}

impl VideoSearchClient {
    /// Create a new video search client from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            settings: config.video_api.clone(),
        })
    }

    /// Maximum number of videos returned by `related_videos`.
    pub fn max_results(&self) -> usize {
        self.settings.max_results
    }

    /// Search for videos matching a query.
    ///
    /// # Arguments
    /// * `query` - Free-text search query
    ///
    /// # Returns
    /// * `Result<Vec<VideoSummary>, FetchError>` - Video results in provider order
    ///
    /// # Details
    /// Single attempt; rate limiting is reported, not retried.
    pub async fn search_videos(&self, query: &str) -> Result<Vec<VideoSummary>, FetchError> {
        let url = format!("{}/search", self.settings.base_url.trim_end_matches('/'));
        let max_results = self.settings.max_results.to_string();
        let params = [
            ("query", query),
            ("type", "v"),
            ("hl", "en"),
            ("maxResults", max_results.as_str()),
        ];

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.settings.api_key)
            .header("X-RapidAPI-Host", &self.settings.host)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status, error_text));
        }

        let body = response.text().await?;
        let api_response: ApiSearchResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(api_response.into_videos())
    }

    /// Videos related to an exercise, ready for display.
    ///
    /// # Arguments
    /// * `exercise_name` - Name of the exercise, used as the search query
    ///
    /// # Returns
    /// * `Vec<VideoSummary>` - At most `max_results` videos; empty on any failure
    pub async fn related_videos(&self, exercise_name: &str) -> Vec<VideoSummary> {
        match self.search_videos(exercise_name).await {
            Ok(mut videos) => {
                videos.truncate(self.settings.max_results);
                debug!(query = %exercise_name, count = videos.len(), "Related videos fetched");
                videos
            }
            Err(err) => {
                warn!(query = %exercise_name, error = %err, "Related videos unavailable");
                Vec::new()
            }
        }
    }
}

//! Exercise lookup client.
//!
//! Fetches exercise records by identifier, answering from the shared cache
//! when possible and retrying rate-limited requests with backoff.

use crate::cache::ExerciseCache;
use crate::config::{Config, ExerciseApiSettings};
use crate::error::FetchError;
use crate::exercisedb::models::{ApiExercise, Exercise};
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a fetched record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Answered from the cache without a network call
    Cache,
    /// Fetched from the provider and stored in the cache
    Network,
}

/// Successful lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub exercise: Exercise,
    pub source: Source,
}

/// Client for the exercise lookup endpoint.
#[derive(Debug, Clone)]
pub struct ExerciseDbClient {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint and credentials
    settings: ExerciseApiSettings,
    /// Schedule for rate-limited retries
    retry: RetryPolicy,
    /// Records fetched so far
    cache: Arc<ExerciseCache>,
}

impl ExerciseDbClient {
    /// Create a client with a fresh cache sized from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Details
    /// An empty API key is accepted; the provider answers 401 and the lookup
    /// fails with `FetchError::Unauthorized`.
    pub fn new(config: &Config) -> Result<Self> {
        let cache = Arc::new(ExerciseCache::new(
            config.cache.capacity,
            config.cache.ttl_secs,
        ));
        Self::with_cache(config, cache)
    }

    /// Create a client that stores records in an existing cache.
    pub fn with_cache(config: &Config, cache: Arc<ExerciseCache>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            settings: config.exercise_api.clone(),
            retry: config.retry.policy(),
            cache,
        })
    }

    /// Shared cache backing this client.
    pub fn cache(&self) -> &ExerciseCache {
        &self.cache
    }

    /// Fetch an exercise by identifier.
    ///
    /// # Arguments
    /// * `id` - Exercise identifier
    ///
    /// # Returns
    /// * `Result<Fetched, FetchError>` - Record and its source, or the failure that ended the lookup
    ///
    /// # Details
    /// A cached record is returned without touching the network. Otherwise the
    /// request is attempted up to `max_attempts` times: rate limiting and
    /// transport failures wait `delay_for(attempt)` and try again, every other
    /// failure ends the lookup at once. Exhausting the attempts yields
    /// `FetchError::RetriesExhausted`.
    pub async fn fetch_exercise(&self, id: &str) -> Result<Fetched, FetchError> {
        if let Some(exercise) = self.cache.get(id) {
            debug!(exercise_id = %id, "Exercise served from cache");
            return Ok(Fetched {
                exercise,
                source: Source::Cache,
            });
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.request_exercise(id).await {
                Ok(exercise) => {
                    info!(exercise_id = %id, attempt, name = %exercise.name, "Exercise fetched");
                    self.cache.insert(id, exercise.clone());
                    return Ok(Fetched {
                        exercise,
                        source: Source::Network,
                    });
                }
                Err(err) if err.is_retryable() && self.retry.has_attempts_after(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        exercise_id = %id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Exercise lookup failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.is_retryable() => {
                    warn!(exercise_id = %id, attempt, error = %err, "Exercise lookup out of attempts");
                    return Err(FetchError::RetriesExhausted { attempts: attempt });
                }
                Err(err) => {
                    warn!(exercise_id = %id, attempt, error = %err, "Exercise lookup aborted");
                    return Err(err);
                }
            }
        }
    }

    /// Issue a single lookup request.
    async fn request_exercise(&self, id: &str) -> Result<Exercise, FetchError> {
        let url = format!(
            "{}/exercises/exercise/{}",
            self.settings.base_url.trim_end_matches('/'),
            id
        );

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.settings.api_key)
            .header("X-RapidAPI-Host", &self.settings.host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status, error_text));
        }

        let body = response.text().await?;
        let api_exercise: ApiExercise =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(api_exercise.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::BackoffStrategy;
    use std::time::Instant;

    const SIT_UP: &str = r#"{
        "bodyPart": "waist",
        "equipment": "body weight",
        "gifUrl": "https://media.example/0001.gif",
        "id": "0001",
        "name": "3/4 sit-up",
        "target": "abs",
        "secondaryMuscles": ["hip flexors", "lower back"],
        "instructions": ["Lie flat on your back.", "Lift your upper body."]
    }"#;

    fn test_config(base_url: String, base_delay_ms: u64) -> Config {
        let mut config = Config::default();
        config.exercise_api.base_url = base_url;
        config.exercise_api.api_key = "secret".to_string();
        config.exercise_api.host = "exercisedb.test".to_string();
        config.retry.base_delay_ms = base_delay_ms;
        config.retry.strategy = BackoffStrategy::Linear;
        config
    }

    #[test]
    fn test_client_new_without_api_key() {
        let config = Config::default();
        assert!(ExerciseDbClient::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_repeat_fetch_served_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises/exercise/0001")
            .match_header("x-rapidapi-key", "secret")
            .match_header("x-rapidapi-host", "exercisedb.test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SIT_UP)
            .expect(1)
            .create_async()
            .await;

        let client = ExerciseDbClient::new(&test_config(server.url(), 1)).unwrap();

        let first = client.fetch_exercise("0001").await.unwrap();
        let second = client.fetch_exercise("0001").await.unwrap();

        assert_eq!(first.source, Source::Network);
        assert_eq!(second.source, Source::Cache);
        assert_eq!(first.exercise, second.exercise);
        assert_eq!(first.exercise.name, "3/4 sit-up");
        assert_eq!(client.cache().hits(), 1);
        assert_eq!(client.cache().len(), 1);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_repeat_fetch_cached_under_requested_id() {
        let mut server = mockito::Server::new_async().await;
        // Provider answers an unpadded identifier with its canonical form
        let mock = server
            .mock("GET", "/exercises/exercise/1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SIT_UP)
            .expect(1)
            .create_async()
            .await;

        let client = ExerciseDbClient::new(&test_config(server.url(), 1)).unwrap();

        let first = client.fetch_exercise("1").await.unwrap();
        let second = client.fetch_exercise("1").await.unwrap();

        assert_eq!(first.source, Source::Network);
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.exercise.id, "0001");
        assert_eq!(client.cache().hits(), 1);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_backs_off_until_exhausted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises/exercise/0001")
            .with_status(429)
            .with_body(r#"{"message": "Too many requests"}"#)
            .expect(3)
            .create_async()
            .await;

        let client = ExerciseDbClient::new(&test_config(server.url(), 20)).unwrap();

        let started = Instant::now();
        let result = client.fetch_exercise("0001").await;
        let elapsed = started.elapsed();

        match result {
            Err(FetchError::RetriesExhausted { attempts }) => assert_eq!(attempts, 3),
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
        // 20ms after the first attempt, 40ms after the second, none after the last
        assert!(elapsed >= Duration::from_millis(60), "elapsed {:?}", elapsed);
        assert!(client.cache().is_empty());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_stops_on_first_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises/exercise/0001")
            .with_status(401)
            .with_body(r#"{"message": "Invalid API key"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = ExerciseDbClient::new(&test_config(server.url(), 1)).unwrap();
        let result = client.fetch_exercise("0001").await;

        assert!(matches!(result, Err(FetchError::Unauthorized)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises/exercise/0001")
            .with_status(503)
            .with_body("unavailable")
            .expect(1)
            .create_async()
            .await;

        let client = ExerciseDbClient::new(&test_config(server.url(), 1)).unwrap();

        match client.fetch_exercise("0001").await {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises/exercise/0001")
            .with_status(200)
            .with_body("not json")
            .expect(1)
            .create_async()
            .await;

        let client = ExerciseDbClient::new(&test_config(server.url(), 1)).unwrap();
        let result = client.fetch_exercise("0001").await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure_is_retried() {
        // Nothing listens on port 1
        let client =
            ExerciseDbClient::new(&test_config("http://127.0.0.1:1".to_string(), 1)).unwrap();
        let result = client.fetch_exercise("0001").await;

        match result {
            Err(FetchError::RetriesExhausted { attempts }) => assert_eq!(attempts, 3),
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shared_cache_skips_network() {
        let cache = Arc::new(ExerciseCache::new(8, None));
        cache.insert("0042", crate::exercisedb::models::sample_exercise("0042", "push-up"));

        // Unreachable endpoint: any network call would fail the lookup
        let client = ExerciseDbClient::with_cache(
            &test_config("http://127.0.0.1:1".to_string(), 1),
            cache,
        )
        .unwrap();

        let fetched = client.fetch_exercise("0042").await.unwrap();
        assert_eq!(fetched.source, Source::Cache);
        assert_eq!(fetched.exercise.name, "push-up");
    }
}

//! Background load sequence for the exercise view.
//!
//! Each identifier change starts a new generation: the exercise is fetched,
//! then videos related to its name. Every event is tagged with the generation
//! that produced it so the view can drop responses that arrive after the user
//! has moved on.

use crate::exercisedb::{Exercise, ExerciseDbClient, Source};
use crate::youtube::{VideoSearchClient, VideoSummary};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Progress of a load sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// Exercise record is available
    Exercise {
        generation: u64,
        exercise: Exercise,
        source: Source,
    },
    /// Exercise could not be fetched
    Missing {
        generation: u64,
        id: String,
        reason: String,
    },
    /// Related videos are available (possibly empty)
    Videos {
        generation: u64,
        videos: Vec<VideoSummary>,
    },
}

impl LoadEvent {
    /// Generation of the sequence that produced this event.
    pub fn generation(&self) -> u64 {
        match self {
            Self::Exercise { generation, .. }
            | Self::Missing { generation, .. }
            | Self::Videos { generation, .. } => *generation,
        }
    }
}

/// Everything a spawned sequence needs, cheap to clone into a task.
#[derive(Clone)]
struct LoadTask {
    exercises: Arc<ExerciseDbClient>,
    videos: Arc<VideoSearchClient>,
    latest: Arc<AtomicU64>,
    events: UnboundedSender<LoadEvent>,
}

impl LoadTask {
    async fn load(self, generation: u64, id: String) {
        match self.exercises.fetch_exercise(&id).await {
            Ok(fetched) => {
                let name = fetched.exercise.name.clone();
                let source = fetched.source;
                self.emit(LoadEvent::Exercise {
                    generation,
                    exercise: fetched.exercise,
                    source,
                });
                // A cache hit stays off the network; its videos come only on request
                if source == Source::Network {
                    self.related(generation, name).await;
                }
            }
            Err(err) => {
                warn!(exercise_id = %id, generation, error = %err, "No exercise to display");
                self.emit(LoadEvent::Missing {
                    generation,
                    id,
                    reason: err.to_string(),
                });
            }
        }
    }

    async fn related(&self, generation: u64, name: String) {
        if self.is_superseded(generation) {
            debug!(generation, "Skipping related videos for superseded load");
            return;
        }
        let videos = self.videos.related_videos(&name).await;
        self.emit(LoadEvent::Videos { generation, videos });
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != generation
    }

    fn emit(&self, event: LoadEvent) {
        if self.events.send(event).is_err() {
            debug!("Load event dropped, view has shut down");
        }
    }
}

/// Starts load sequences and hands out their generations.
pub struct ExerciseLoader {
    task: LoadTask,
    in_flight: Option<JoinHandle<()>>,
}

impl ExerciseLoader {
    /// Create a loader and the receiver its events arrive on.
    ///
    /// # Arguments
    /// * `exercises` - Exercise lookup client
    /// * `videos` - Video search client
    pub fn new(
        exercises: ExerciseDbClient,
        videos: VideoSearchClient,
    ) -> (Self, UnboundedReceiver<LoadEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let loader = Self {
            task: LoadTask {
                exercises: Arc::new(exercises),
                videos: Arc::new(videos),
                latest: Arc::new(AtomicU64::new(0)),
                events,
            },
            in_flight: None,
        };
        (loader, receiver)
    }

    /// Exercise client used by this loader.
    pub fn exercises(&self) -> &ExerciseDbClient {
        &self.task.exercises
    }

    /// Most recently started generation.
    pub fn current_generation(&self) -> u64 {
        self.task.latest.load(Ordering::SeqCst)
    }

    /// Load an exercise and, when it comes from the network, its related videos.
    ///
    /// # Returns
    /// * `u64` - Generation tagging every event of this sequence
    ///
    /// # Details
    /// The previous sequence is aborted; anything it already sent carries an
    /// older generation.
    pub fn begin(&mut self, id: &str) -> u64 {
        let generation = self.advance();
        let task = self.task.clone();
        let id = id.to_string();
        debug!(exercise_id = %id, generation, "Starting exercise load");
        self.in_flight = Some(tokio::spawn(task.load(generation, id)));
        generation
    }

    /// Fetch related videos for an exercise already on screen.
    pub fn begin_related(&mut self, exercise_name: &str) -> u64 {
        let generation = self.advance();
        let task = self.task.clone();
        let name = exercise_name.to_string();
        debug!(query = %name, generation, "Starting related videos load");
        self.in_flight = Some(tokio::spawn(async move {
            task.related(generation, name).await;
        }));
        generation
    }

    fn advance(&mut self) -> u64 {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.task.latest.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Drop for ExerciseLoader {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::config::Config;
    use mockito::Matcher;
    use std::time::Duration;
    use tokio::time::timeout;

    const SIT_UP: &str = r#"{"id": "0001", "name": "3/4 sit-up", "target": "abs", "equipment": "body weight", "bodyPart": "waist", "gifUrl": "https://media.example/0001.gif", "secondaryMuscles": [], "instructions": []}"#;
    const AIR_BIKE: &str = r#"{"id": "0003", "name": "air bike", "target": "abs", "equipment": "body weight", "bodyPart": "waist", "gifUrl": "https://media.example/0003.gif", "secondaryMuscles": [], "instructions": []}"#;
    const VIDEOS: &str = r#"{"contents": [{"video": {"videoId": "abc", "title": "Sit-up form", "channelName": "Coach", "viewCountText": "10 views", "thumbnails": []}}]}"#;

    fn loader_for(url: &str) -> (ExerciseLoader, UnboundedReceiver<LoadEvent>) {
        let mut config = Config::default();
        config.exercise_api.base_url = url.to_string();
        config.video_api.base_url = url.to_string();
        config.retry.base_delay_ms = 1;
        ExerciseLoader::new(
            ExerciseDbClient::new(&config).unwrap(),
            VideoSearchClient::new(&config).unwrap(),
        )
    }

    async fn next_event(rx: &mut UnboundedReceiver<LoadEvent>) -> LoadEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for load event")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_network_fetch_triggers_one_related_search() {
        let mut server = mockito::Server::new_async().await;
        let exercise_mock = server
            .mock("GET", "/exercises/exercise/0001")
            .with_status(200)
            .with_body(SIT_UP)
            .expect(1)
            .create_async()
            .await;
        let video_mock = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("query".into(), "3/4 sit-up".into()))
            .with_status(200)
            .with_body(VIDEOS)
            .expect(1)
            .create_async()
            .await;

        let (mut loader, mut rx) = loader_for(&server.url());

        let generation = loader.begin("0001");
        match next_event(&mut rx).await {
            LoadEvent::Exercise {
                generation: g,
                exercise,
                source,
            } => {
                assert_eq!(g, generation);
                assert_eq!(exercise.name, "3/4 sit-up");
                assert_eq!(source, Source::Network);
            }
            other => panic!("Expected Exercise event, got {:?}", other),
        }
        match next_event(&mut rx).await {
            LoadEvent::Videos { generation: g, videos } => {
                assert_eq!(g, generation);
                assert_eq!(videos.len(), 1);
                assert_eq!(videos[0].id, "abc");
            }
            other => panic!("Expected Videos event, got {:?}", other),
        }

        // Second load of the same id is a cache hit with no network traffic
        let second = loader.begin("0001");
        match next_event(&mut rx).await {
            LoadEvent::Exercise { source, generation, .. } => {
                assert_eq!(source, Source::Cache);
                assert_eq!(generation, second);
            }
            other => panic!("Expected cached Exercise event, got {:?}", other),
        }
        assert!(
            timeout(Duration::from_millis(200), rx.recv()).await.is_err(),
            "cache hit must not trigger a related search"
        );

        exercise_mock.assert_async().await;
        video_mock.assert_async().await;
        assert_eq!(loader.exercises().cache().hits(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_reports_missing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exercises/exercise/9999")
            .with_status(401)
            .create_async()
            .await;

        let (mut loader, mut rx) = loader_for(&server.url());
        let generation = loader.begin("9999");

        match next_event(&mut rx).await {
            LoadEvent::Missing {
                generation: g,
                id,
                reason,
            } => {
                assert_eq!(g, generation);
                assert_eq!(id, "9999");
                assert!(reason.contains("unauthorized"));
            }
            other => panic!("Expected Missing event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_superseded_load_never_overwrites_view() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", "/exercises/exercise/0001")
            .with_status(200)
            .with_body(SIT_UP)
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/exercises/exercise/0003")
            .with_status(200)
            .with_body(AIR_BIKE)
            .create_async()
            .await;
        let _videos = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(VIDEOS)
            .create_async()
            .await;

        let (mut loader, mut rx) = loader_for(&server.url());
        let mut app = App::new("0001", 15);

        let first = loader.begin("0001");
        app.begin_load("0001", first);
        let second = loader.begin("0003");
        app.begin_load("0003", second);
        assert_eq!(loader.current_generation(), second);

        // Drain until the latest sequence has delivered its videos
        loop {
            let event = next_event(&mut rx).await;
            let done = matches!(event, LoadEvent::Videos { generation, .. } if generation == second);
            app.apply_event(event);
            if done {
                break;
            }
        }

        assert_eq!(app.exercise.as_ref().map(|e| e.id.as_str()), Some("0003"));
        assert_eq!(app.videos.len(), 1);
        assert!(!app.loading);
    }
}

//! Video search API models and data structures.
//!
//! Contains the video summary shown next to an exercise and the search
//! response it is decoded from.

use serde::{Deserialize, Serialize};

/// Related video shown next to an exercise.
///
/// Contains what the list needs for display and playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoSummary {
    /// YouTube video ID
    pub id: String,
    /// Video title
    pub title: String,
    /// Channel name
    pub channel_name: String,
    /// View count as formatted by the provider (e.g. "1,234,567 views")
    pub view_count_text: String,
    /// Thumbnail URLs, smallest first
    pub thumbnails: Vec<String>,
}

impl VideoSummary {
    /// Watch URL for the video.
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    /// Largest thumbnail, if the provider sent any.
    pub fn best_thumbnail(&self) -> Option<&str> {
        self.thumbnails.last().map(String::as_str)
    }

    /// View count text, or a placeholder when the provider omitted it.
    pub fn format_views(&self) -> &str {
        if self.view_count_text.is_empty() {
            "views unknown"
        } else {
            &self.view_count_text
        }
    }
}

/// Search endpoint response wrapper.
#[derive(Debug, Deserialize)]
pub struct ApiSearchResponse {
    /// Mixed results (videos, channels, playlists)
    #[serde(default)]
    pub contents: Vec<ApiSearchContent>,
}

/// One search result; only video results carry `video`.
#[derive(Debug, Deserialize)]
pub struct ApiSearchContent {
    pub video: Option<ApiVideo>,
}

/// Video payload inside a search result.
#[derive(Debug, Deserialize)]
pub struct ApiVideo {
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "channelName", default)]
    pub channel_name: String,
    #[serde(rename = "viewCountText", default)]
    pub view_count_text: String,
    #[serde(default)]
    pub thumbnails: Vec<ApiThumbnail>,
}

/// Single thumbnail.
#[derive(Debug, Deserialize)]
pub struct ApiThumbnail {
    /// Thumbnail URL
    pub url: String,
}

impl From<ApiVideo> for VideoSummary {
    fn from(video: ApiVideo) -> Self {
        Self {
            id: video.video_id,
            title: video.title,
            channel_name: video.channel_name,
            view_count_text: video.view_count_text,
            thumbnails: video.thumbnails.into_iter().map(|t| t.url).collect(),
        }
    }
}

impl ApiSearchResponse {
    /// Video results in provider order, skipping channels and playlists.
    pub fn into_videos(self) -> Vec<VideoSummary> {
        self.contents
            .into_iter()
            .filter_map(|content| content.video)
            .map(VideoSummary::from)
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_video(id: &str, title: &str) -> VideoSummary {
    VideoSummary {
        id: id.to_string(),
        title: title.to_string(),
        channel_name: "Fitness Channel".to_string(),
        view_count_text: "12,345 views".to_string(),
        thumbnails: vec![format!("https://i.ytimg.com/vi/{}/default.jpg", id)],
    }
}

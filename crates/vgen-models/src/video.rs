//! Generated video identity, status and media facts.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the final artifact.
    pub fn file_name(&self) -> String {
        format!("{}.mp4", self.0)
    }

    /// Ids are used as file names; reject anything that could escape a directory.
    pub fn is_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    #[default]
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a completed generation request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedVideo {
    pub video_id: VideoId,
    pub video_path: PathBuf,
    pub status: VideoStatus,
    pub created_at: DateTime<Utc>,
}

/// Introspected facts about a video file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoInfo {
    /// Seconds
    pub duration: f64,
    pub fps: f64,
    /// `[width, height]`
    pub size: [u32; 2],
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
}

impl VideoInfo {
    pub fn new(duration: f64, fps: f64, width: u32, height: u32, has_audio: bool) -> Self {
        Self {
            duration,
            fps,
            size: [width, height],
            width,
            height,
            has_audio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_is_uuid() {
        let id = VideoId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert!(id.is_safe());
        assert_eq!(id.file_name(), format!("{}.mp4", id));
    }

    #[test]
    fn test_unsafe_ids() {
        assert!(!VideoId::from("../etc/passwd").is_safe());
        assert!(!VideoId::from("").is_safe());
        assert!(!VideoId::from("a/b").is_safe());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&VideoStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn test_video_info_size_mirrors_dimensions() {
        let info = VideoInfo::new(5.0, 24.0, 1280, 720, false);
        assert_eq!(info.size, [1280, 720]);
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["size"], serde_json::json!([1280, 720]));
    }
}

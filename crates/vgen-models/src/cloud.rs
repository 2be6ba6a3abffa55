//! Payloads exchanged with the cloud distribution layer.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default blob container for uploads.
pub const DEFAULT_CONTAINER: &str = "videos";

/// Which cloud services are usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CloudStatus {
    pub blob_storage: bool,
    pub media_services: bool,
    pub credentials_available: bool,
}

/// Adaptive streaming manifests for one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StreamingUrls {
    pub hls: String,
    pub dash: String,
    pub smooth: String,
}

impl StreamingUrls {
    /// Format-query URLs rooted at `base`.
    pub fn for_base(base: &str) -> Self {
        Self {
            hls: format!("{base}?format=hls"),
            dash: format!("{base}?format=dash"),
            smooth: format!("{base}?format=smooth"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StreamingInfo {
    pub streaming_urls: StreamingUrls,
    pub status: String,
}

impl StreamingInfo {
    pub fn ready(urls: StreamingUrls) -> Self {
        Self {
            streaming_urls: urls,
            status: "ready".to_string(),
        }
    }
}

/// Content insights extracted from a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoInsights {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub faces: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub objects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Thumbnail {
    /// `HH:MM:SS`
    pub time: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub insights: VideoInsights,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityMetrics {
    pub average_bitrate: String,
    pub buffer_ratio: f64,
    pub startup_time: String,
}

/// Playback analytics for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetrics {
    pub video_id: String,
    #[serde(default)]
    pub views: u64,
    /// `HH:MM:SS`
    pub play_time: String,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub geographic_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub device_types: BTreeMap<String, u64>,
    pub quality_metrics: QualityMetrics,
}

impl VideoMetrics {
    /// Metrics for a video nobody has watched yet.
    pub fn empty(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            views: 0,
            play_time: "00:00:00".to_string(),
            completion_rate: 0.0,
            geographic_distribution: BTreeMap::new(),
            device_types: BTreeMap::new(),
            quality_metrics: QualityMetrics {
                average_bitrate: "1000 kbps".to_string(),
                buffer_ratio: 0.02,
                startup_time: "2.1s".to_string(),
            },
        }
    }
}

/// Static guidance for configuring the cloud backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SetupInstructions {
    pub required_environment_variables: Vec<String>,
    pub services_needed: Vec<String>,
    pub setup_steps: Vec<String>,
}

/// Outcome of one step of the distribution workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowStep<T> {
    Success(T),
    Failed { error: String },
}

impl<T> WorkflowStep<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowStep::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadStep {
    pub blob_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CdnStep {
    pub cdn_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StreamingStep {
    pub endpoints: StreamingInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisStep {
    pub insights: AnalysisReport,
}

/// Per-step results of upload → CDN → streaming → analysis.
///
/// Later steps are only attempted after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowReport {
    pub upload: WorkflowStep<UploadStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn: Option<WorkflowStep<CdnStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<WorkflowStep<StreamingStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<WorkflowStep<AnalysisStep>>,
}

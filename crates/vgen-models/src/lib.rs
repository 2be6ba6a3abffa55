//! Shared data models for the VGen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video styles, the style table and aspect ratios
//! - Declarative edit configurations and presets
//! - Encoding configuration
//! - Generated video identity and media facts
//! - Cloud distribution payloads

pub mod cloud;
pub mod edit;
pub mod encoding;
pub mod style;
pub mod video;

// Re-export common types
pub use cloud::{
    AnalysisReport, CloudStatus, SetupInstructions, StreamingInfo, StreamingUrls, VideoMetrics,
    WorkflowReport, WorkflowStep,
};
pub use edit::{
    edit_presets, supported_edits, EditConfig, EditOperationInfo, EditPreset, Effect,
    FadeParams, OverlayPosition, PositionCoord, Resize, ResizeParams, TextOverlay, TrimParams,
    VolumeParams,
};
pub use encoding::EncodingConfig;
pub use style::{AspectRatio, StylePreview, StyleProfile, StyleTable, VideoStyle};
pub use video::{GeneratedVideo, VideoId, VideoInfo, VideoStatus};

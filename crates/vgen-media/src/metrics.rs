//! Media pipeline metrics.
//!
//! Recorded through the `metrics` facade; the API server installs the
//! Prometheus recorder that exports them.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const FFMPEG_DURATION_SECONDS: &str = "vgen_ffmpeg_duration_seconds";
    pub const CLIPS_RENDERED_TOTAL: &str = "vgen_clips_rendered_total";
    pub const CLIP_FAILURES_TOTAL: &str = "vgen_clip_failures_total";
    pub const VIDEOS_GENERATED_TOTAL: &str = "vgen_videos_generated_total";
    pub const VIDEOS_EDITED_TOTAL: &str = "vgen_videos_edited_total";
}

/// Record wall time of one FFmpeg invocation.
pub fn record_ffmpeg_duration(operation: &'static str, duration_secs: f64) {
    histogram!(names::FFMPEG_DURATION_SECONDS, "operation" => operation).record(duration_secs);
}

pub fn record_clip_rendered(style: &str) {
    let labels = [("style", style.to_string())];
    counter!(names::CLIPS_RENDERED_TOTAL, &labels).increment(1);
}

pub fn record_clip_failure(style: &str) {
    let labels = [("style", style.to_string())];
    counter!(names::CLIP_FAILURES_TOTAL, &labels).increment(1);
}

pub fn record_video_generated(scenes: usize) {
    counter!(names::VIDEOS_GENERATED_TOTAL).increment(1);
    histogram!("vgen_scenes_per_video").record(scenes as f64);
}

pub fn record_video_edited() {
    counter!(names::VIDEOS_EDITED_TOTAL).increment(1);
}

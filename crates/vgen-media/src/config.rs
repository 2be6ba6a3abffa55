//! Media pipeline configuration.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use vgen_models::encoding::DEFAULT_FONT_FILE;

/// Settings shared by the generator, renderer and editor.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Where clips and final generated videos are written
    pub output_dir: PathBuf,
    /// Where edit and concatenation results are written
    pub edit_dir: PathBuf,
    /// Font for placeholder text; FFmpeg's default font is used when absent
    pub font_file: PathBuf,
    /// Upper bound on concurrent placeholder renders (1 = sequential)
    pub max_parallel_renders: usize,
    pub render_timeout: Duration,
    pub concat_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        Self {
            output_dir: tmp.join("generated_videos"),
            edit_dir: tmp.join("video_editing"),
            font_file: PathBuf::from(DEFAULT_FONT_FILE),
            max_parallel_renders: 2,
            render_timeout: Duration::from_secs(30),
            concat_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            output_dir: std::env::var("VGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            edit_dir: std::env::var("VGEN_EDIT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.edit_dir),
            font_file: std::env::var("VGEN_FONT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.font_file),
            max_parallel_renders: std::env::var("VGEN_MAX_PARALLEL_RENDERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_parallel_renders),
            render_timeout: Duration::from_secs(
                std::env::var("VGEN_RENDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            concat_timeout: Duration::from_secs(
                std::env::var("VGEN_CONCAT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }

    /// Config rooted in `dir`, for tests and embedding.
    pub fn with_root(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            output_dir: dir.join("generated_videos"),
            edit_dir: dir.join("video_editing"),
            ..Self::default()
        }
    }

    pub fn with_max_parallel_renders(mut self, n: usize) -> Self {
        self.max_parallel_renders = n.max(1);
        self
    }

    /// Final artifact path for a generated video.
    pub fn video_path(&self, video_id: &str) -> PathBuf {
        self.output_dir.join(format!("{video_id}.mp4"))
    }

    /// Whether `path` lies under the output or edit directory.
    ///
    /// Paths containing `..` are never managed.
    pub fn is_managed_path(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if path.components().any(|c| c == Component::ParentDir) {
            return false;
        }
        path.starts_with(&self.output_dir) || path.starts_with(&self.edit_dir)
    }
}

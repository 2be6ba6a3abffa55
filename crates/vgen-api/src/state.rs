//! Application state.

use std::sync::Arc;

use vgen_media::{PipelineConfig, VideoEditor, VideoGenerator};
use vgen_storage::{cloud_from_env, CloudServices};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub generator: Arc<VideoGenerator>,
    pub editor: Arc<VideoEditor>,
    pub cloud: Arc<dyn CloudServices>,
}

impl AppState {
    /// Build state from the environment.
    pub async fn new(config: ApiConfig) -> Self {
        let pipeline = Arc::new(PipelineConfig::from_env());
        let cloud = cloud_from_env().await;
        Self::with_services(config, pipeline, cloud)
    }

    /// Build state from explicit parts.
    pub fn with_services(
        config: ApiConfig,
        pipeline: Arc<PipelineConfig>,
        cloud: Arc<dyn CloudServices>,
    ) -> Self {
        Self {
            config,
            generator: Arc::new(VideoGenerator::new(Arc::clone(&pipeline))),
            editor: Arc::new(VideoEditor::new(pipeline)),
            cloud,
        }
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        self.generator.config()
    }

    /// Reject input paths outside the generated and edited video directories.
    pub fn require_managed_path(&self, path: &str) -> ApiResult<()> {
        if self.pipeline().is_managed_path(path) {
            Ok(())
        } else {
            Err(ApiError::bad_request(format!(
                "Video path is outside the service's video directories: {path}"
            )))
        }
    }
}

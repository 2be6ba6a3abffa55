//! Script-to-video generation: plan scenes, render them, join them.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use vgen_models::{AspectRatio, GeneratedVideo, VideoId, VideoStatus, VideoStyle};

use crate::config::PipelineConfig;
use crate::error::{MediaError, MediaResult};
use crate::metrics;
use crate::planner::ScenePlanner;
use crate::renderer::{ClipRenderer, RenderedClip};

/// Longest video that may be requested, in seconds.
pub const MAX_DURATION_SECS: u32 = 600;

/// Parameters of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub script: String,
    pub style: VideoStyle,
    pub duration_secs: u32,
    pub aspect_ratio: AspectRatio,
    /// Generated when absent
    pub video_id: Option<VideoId>,
}

impl GenerationRequest {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            style: VideoStyle::default(),
            duration_secs: 5,
            aspect_ratio: AspectRatio::default(),
            video_id: None,
        }
    }

    pub fn with_style(mut self, style: VideoStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_video_id(mut self, video_id: VideoId) -> Self {
        self.video_id = Some(video_id);
        self
    }

    fn validate(&self) -> MediaResult<()> {
        if self.script.trim().is_empty() {
            return Err(MediaError::validation("Script is required"));
        }
        if !(1..=MAX_DURATION_SECS).contains(&self.duration_secs) {
            return Err(MediaError::validation(format!(
                "Duration must be between 1 and {MAX_DURATION_SECS} seconds"
            )));
        }
        if let Some(id) = &self.video_id {
            if !id.is_safe() {
                return Err(MediaError::validation(format!("Invalid video id: {id}")));
            }
        }
        Ok(())
    }
}

/// End-to-end generator.
#[derive(Debug, Clone)]
pub struct VideoGenerator {
    config: Arc<PipelineConfig>,
    planner: ScenePlanner,
    renderer: ClipRenderer,
}

impl VideoGenerator {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            planner: ScenePlanner::new(),
            renderer: ClipRenderer::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &ClipRenderer {
        &self.renderer
    }

    /// Generate a placeholder video for a script.
    pub async fn generate(&self, request: &GenerationRequest) -> MediaResult<GeneratedVideo> {
        request.validate()?;
        let video_id = request.video_id.clone().unwrap_or_default();

        let prompts = self
            .planner
            .plan(&request.script, request.style, request.duration_secs);
        info!(
            video_id = %video_id,
            style = request.style.as_str(),
            scenes = prompts.len(),
            "Generating video"
        );

        let clips = self.render_all(&prompts, request, &video_id).await?;
        let paths: Vec<_> = clips.into_iter().map(|c| c.path).collect();
        let video_path = self.renderer.concatenate(&paths, video_id.as_str()).await?;

        metrics::record_video_generated(prompts.len());
        info!(video_id = %video_id, "Video generated at {}", video_path.display());

        Ok(GeneratedVideo {
            video_id,
            video_path,
            status: VideoStatus::Completed,
            created_at: Utc::now(),
        })
    }

    /// Render every scene behind a bounded pool, keeping scene order.
    ///
    /// Failed scenes are logged and skipped; if none succeed the first error
    /// is returned.
    async fn render_all(
        &self,
        prompts: &[String],
        request: &GenerationRequest,
        video_id: &VideoId,
    ) -> MediaResult<Vec<RenderedClip>> {
        let pool = Semaphore::new(self.config.max_parallel_renders.max(1));
        let pool = &pool;

        let renders = prompts.iter().enumerate().map(|(index, prompt)| {
            let clip_id = format!("{video_id}_clip_{index}");
            async move {
                let _permit = pool
                    .acquire()
                    .await
                    .map_err(|_| MediaError::internal("render pool closed"))?;
                self.renderer
                    .render_clip(prompt, request.style, request.aspect_ratio, &clip_id)
                    .await
            }
        });

        let mut clips = Vec::with_capacity(prompts.len());
        let mut first_error = None;
        for (index, result) in join_all(renders).await.into_iter().enumerate() {
            match result {
                Ok(clip) => clips.push(clip),
                Err(e) => {
                    warn!(video_id = %video_id, scene = index, "Scene render failed: {}", e);
                    metrics::record_clip_failure(request.style.as_str());
                    first_error.get_or_insert(e);
                }
            }
        }

        match (clips.is_empty(), first_error) {
            (true, Some(e)) => Err(e),
            (true, None) => Err(MediaError::NoClips),
            (false, _) => Ok(clips),
        }
    }
}

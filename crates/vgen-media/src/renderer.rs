//! Placeholder clip rendering and deterministic concatenation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::fs;
use tracing::{error, info, warn};

use vgen_models::encoding::{PLACEHOLDER_CLIP_SECS, PLACEHOLDER_FPS};
use vgen_models::{AspectRatio, EncodingConfig, VideoStyle};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::PipelineConfig;
use crate::error::{MediaError, MediaResult};
use crate::filters::{color_source, placeholder_caption, placeholder_color, placeholder_drawtext};
use crate::fs_utils::{ensure_dir, file_exists, move_file, remove_quietly};
use crate::metrics;

/// A transient per-scene clip.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedClip {
    pub id: String,
    pub path: PathBuf,
    pub duration_secs: u32,
    /// Placeholders are silent
    pub has_audio: bool,
}

/// Renders scene prompts into clips and joins them into one video.
#[derive(Debug, Clone)]
pub struct ClipRenderer {
    config: Arc<PipelineConfig>,
}

impl ClipRenderer {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn clip_path(&self, clip_id: &str) -> PathBuf {
        self.config.output_dir.join(format!("{clip_id}.mp4"))
    }

    /// Render one solid-color placeholder with the prompt burned in.
    pub async fn render_clip(
        &self,
        prompt: &str,
        style: VideoStyle,
        aspect_ratio: AspectRatio,
        clip_id: &str,
    ) -> MediaResult<RenderedClip> {
        ensure_dir(&self.config.output_dir).await?;
        let output = self.clip_path(clip_id);

        let color = placeholder_color(prompt);
        let (width, height) = aspect_ratio.canvas_size();
        let font_file = file_exists(&self.config.font_file)
            .await
            .then(|| self.config.font_file.to_string_lossy().into_owned());

        let cmd = FfmpegCommand::lavfi(
            color_source(color, width, height, PLACEHOLDER_CLIP_SECS, PLACEHOLDER_FPS),
            &output,
        )
        .video_filter(placeholder_drawtext(
            &placeholder_caption(prompt),
            font_file.as_deref(),
        ))
        .output_args(EncodingConfig::for_placeholder().to_ffmpeg_args(false));

        let started = Instant::now();
        FfmpegRunner::new()
            .with_timeout(self.config.render_timeout)
            .run(&cmd)
            .await?;
        metrics::record_ffmpeg_duration("render", started.elapsed().as_secs_f64());

        if !file_exists(&output).await {
            return Err(MediaError::MissingOutput(output));
        }

        info!(
            clip_id = clip_id,
            color = color,
            size = %format!("{width}x{height}"),
            "Rendered placeholder clip {}",
            output.display()
        );
        metrics::record_clip_rendered(style.as_str());

        Ok(RenderedClip {
            id: clip_id.to_string(),
            path: output,
            duration_secs: PLACEHOLDER_CLIP_SECS,
            has_audio: false,
        })
    }

    /// Join clips, in the given order, into `<output_dir>/<video_id>.mp4`.
    ///
    /// Missing clips are dropped first. A single clip is moved into place;
    /// several are stream-copied through the concat demuxer, after which the
    /// manifest and the source clips are removed whether or not FFmpeg
    /// succeeded.
    pub async fn concatenate(&self, clip_paths: &[PathBuf], video_id: &str) -> MediaResult<PathBuf> {
        let mut clips = Vec::with_capacity(clip_paths.len());
        for path in clip_paths {
            if file_exists(path).await {
                clips.push(path.clone());
            } else {
                warn!(video_id = video_id, "Skipping missing clip {}", path.display());
            }
        }

        if clips.is_empty() {
            return Err(MediaError::NoClips);
        }

        let output = self.config.video_path(video_id);

        if let [only] = clips.as_slice() {
            move_file(only, &output).await?;
            info!(video_id = video_id, "Single clip moved to {}", output.display());
            return Ok(output);
        }

        ensure_dir(&self.config.output_dir).await?;
        let manifest = self.config.output_dir.join(format!("{video_id}_list.txt"));

        let result = self.run_concat(&clips, &manifest, &output).await;

        remove_quietly(&manifest).await;
        for clip in &clips {
            remove_quietly(clip).await;
        }

        match result {
            Ok(()) if file_exists(&output).await => {
                info!(
                    video_id = video_id,
                    clips = clips.len(),
                    "Concatenated clips into {}",
                    output.display()
                );
                Ok(output)
            }
            Ok(()) => Err(MediaError::MissingOutput(output)),
            Err(e) => {
                error!(
                    video_id = video_id,
                    stderr = e.stderr().unwrap_or_default(),
                    "FFmpeg concatenation failed: {}",
                    e
                );
                Err(e)
            }
        }
    }

    async fn run_concat(&self, clips: &[PathBuf], manifest: &Path, output: &Path) -> MediaResult<()> {
        fs::write(manifest, concat_manifest(clips).await?).await?;

        let cmd = FfmpegCommand::concat_manifest(manifest, output).stream_copy();
        let started = Instant::now();
        FfmpegRunner::new()
            .with_timeout(self.config.concat_timeout)
            .run(&cmd)
            .await?;
        metrics::record_ffmpeg_duration("concat", started.elapsed().as_secs_f64());
        Ok(())
    }
}

/// Concat demuxer manifest: one `file '<absolute path>'` line per clip.
async fn concat_manifest(clips: &[PathBuf]) -> MediaResult<String> {
    let mut manifest = String::new();
    for clip in clips {
        let absolute = fs::canonicalize(clip).await?;
        let quoted = absolute.to_string_lossy().replace('\'', r"'\''");
        manifest.push_str(&format!("file '{quoted}'\n"));
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::has_filter;
    use crate::probe::probe_video;
    use tempfile::TempDir;

    fn renderer(dir: &TempDir) -> ClipRenderer {
        ClipRenderer::new(Arc::new(PipelineConfig::with_root(dir.path())))
    }

    #[tokio::test]
    async fn test_concatenate_without_clips_fails_without_writes() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);

        let err = renderer
            .concatenate(&[dir.path().join("missing_0.mp4")], "vid")
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::NoClips));
        assert!(!renderer.config().output_dir.exists());

        let err = renderer.concatenate(&[], "vid").await.unwrap_err();
        assert!(matches!(err, MediaError::NoClips));
    }

    #[tokio::test]
    async fn test_single_clip_is_moved_byte_for_byte() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);
        let clip = dir.path().join("vid_clip_0.mp4");
        fs::write(&clip, b"not really a video").await.unwrap();

        let output = renderer
            .concatenate(&[dir.path().join("gone.mp4"), clip.clone()], "vid")
            .await
            .unwrap();

        assert_eq!(output, renderer.config().video_path("vid"));
        assert_eq!(fs::read(&output).await.unwrap(), b"not really a video");
        assert!(!clip.exists());
    }

    #[tokio::test]
    async fn test_manifest_quotes_paths() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("it's.mp4");
        let b = dir.path().join("b.mp4");
        fs::write(&a, b"a").await.unwrap();
        fs::write(&b, b"b").await.unwrap();

        let manifest = concat_manifest(&[a, b]).await.unwrap();
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("file '/"));
        assert!(lines[0].ends_with(r"it'\''s.mp4'"));
        assert!(lines[1].ends_with("b.mp4'"));
    }

    #[tokio::test]
    async fn test_render_and_concatenate() {
        if !has_filter("drawtext").await {
            eprintln!("Skipping: ffmpeg with drawtext not available");
            return;
        }
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);

        let first = renderer
            .render_clip("An anime opening", VideoStyle::Anime, AspectRatio::Portrait, "v_clip_0")
            .await
            .unwrap();
        let second = renderer
            .render_clip("It's 50% done: [ok]", VideoStyle::Real, AspectRatio::Portrait, "v_clip_1")
            .await
            .unwrap();
        assert!(!first.has_audio);

        let info = probe_video(&first.path).await.unwrap();
        assert_eq!(info.size, [720, 1280]);
        assert!((info.duration - 5.0).abs() < 0.2);

        let output = renderer
            .concatenate(&[first.path.clone(), second.path.clone()], "v")
            .await
            .unwrap();

        assert!(!first.path.exists());
        assert!(!second.path.exists());
        assert!(!dir.path().join("generated_videos/v_list.txt").exists());
        let joined = probe_video(&output).await.unwrap();
        assert!((joined.duration - 10.0).abs() < 0.3);
    }
}

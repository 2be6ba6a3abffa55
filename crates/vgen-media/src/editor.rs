//! Edit pass and explicit concatenation of existing videos.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use vgen_models::{EditConfig, EncodingConfig, VideoId, VideoInfo};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::PipelineConfig;
use crate::error::{MediaError, MediaResult};
use crate::filters::{build_edit_plan, concat_filter, normalize_for_concat};
use crate::fs_utils::{ensure_dir, file_exists};
use crate::metrics;
use crate::probe::probe_video;

/// Applies declarative edits to existing videos.
#[derive(Debug, Clone)]
pub struct VideoEditor {
    config: Arc<PipelineConfig>,
}

impl VideoEditor {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Output path of an edit: `<edit_dir>/edited_<basename>`.
    pub fn edited_path(&self, input: &Path) -> MediaResult<PathBuf> {
        let name = input
            .file_name()
            .ok_or_else(|| MediaError::validation(format!("Not a file: {}", input.display())))?;
        Ok(self
            .config
            .edit_dir
            .join(format!("edited_{}", name.to_string_lossy())))
    }

    /// Fresh output path for an explicit concatenation.
    pub fn concatenated_path(&self) -> PathBuf {
        self.config
            .edit_dir
            .join(format!("concatenated_{}.mp4", VideoId::new()))
    }

    /// Apply `config` to `input` and re-encode as H.264/AAC.
    pub async fn edit_video(&self, input: impl AsRef<Path>, config: &EditConfig) -> MediaResult<PathBuf> {
        let input = input.as_ref();
        if !file_exists(input).await {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let info = probe_video(input).await?;
        let plan = build_edit_plan(config, &info)?;
        let output = self.edited_path(input)?;
        ensure_dir(&self.config.edit_dir).await?;

        let mut cmd = FfmpegCommand::new(input, &output);
        if let Some(trim) = plan.trim {
            cmd = cmd.seek(trim.start).duration(trim.duration);
        }
        cmd = cmd.filter_complex(plan.filter_complex()).map("[vout]");
        if plan.with_audio {
            cmd = cmd.map("[aout]");
        }
        cmd = cmd.output_args(EncodingConfig::default().to_ffmpeg_args(plan.with_audio));

        let expected = plan.output_duration;
        let label = input.display().to_string();
        let started = Instant::now();
        let result = FfmpegRunner::new()
            .run_with_progress(&cmd, move |progress| {
                debug!(
                    input = %label,
                    percent = progress.percentage(expected),
                    "Edit progress"
                );
            })
            .await;

        if let Err(e) = result {
            error!(
                input = %input.display(),
                stderr = e.stderr().unwrap_or_default(),
                "Edit failed: {}",
                e
            );
            return Err(e);
        }
        metrics::record_ffmpeg_duration("edit", started.elapsed().as_secs_f64());

        if !file_exists(&output).await {
            return Err(MediaError::MissingOutput(output));
        }

        metrics::record_video_edited();
        info!(
            input = %input.display(),
            operations = plan.video_filters.len() + plan.audio_filters.len(),
            "Edited video written to {}",
            output.display()
        );
        Ok(output)
    }

    /// Re-encode at least two videos into one, in order.
    ///
    /// Every input is scaled and padded onto the first input's canvas and
    /// frame rate. Audio is kept only when every input has it. Inputs are
    /// left in place.
    pub async fn concatenate_videos(&self, paths: &[PathBuf]) -> MediaResult<PathBuf> {
        if paths.len() < 2 {
            return Err(MediaError::validation("At least 2 video paths are required"));
        }

        let mut infos = Vec::with_capacity(paths.len());
        for path in paths {
            if !file_exists(path).await {
                return Err(MediaError::FileNotFound(path.clone()));
            }
            infos.push(probe_video(path).await?);
        }

        let canvas = &infos[0];
        let with_audio = infos.iter().all(|i| i.has_audio);

        let mut graph: Vec<String> = (0..paths.len())
            .map(|i| normalize_for_concat(i, canvas.width, canvas.height, canvas.fps))
            .collect();
        graph.push(concat_filter(paths.len(), with_audio));

        ensure_dir(&self.config.edit_dir).await?;
        let output = self.concatenated_path();

        let mut cmd = FfmpegCommand::new(&paths[0], &output);
        for path in &paths[1..] {
            cmd = cmd.add_input(path);
        }
        cmd = cmd.filter_complex(graph.join(";")).map("[vout]");
        if with_audio {
            cmd = cmd.map("[aout]");
        }
        cmd = cmd.output_args(EncodingConfig::default().to_ffmpeg_args(with_audio));

        let started = Instant::now();
        FfmpegRunner::new().run(&cmd).await.inspect_err(|e| {
            error!(
                inputs = paths.len(),
                stderr = e.stderr().unwrap_or_default(),
                "Concatenation failed: {}",
                e
            )
        })?;
        metrics::record_ffmpeg_duration("concat_reencode", started.elapsed().as_secs_f64());

        if !file_exists(&output).await {
            return Err(MediaError::MissingOutput(output));
        }
        info!(inputs = paths.len(), "Concatenated videos into {}", output.display());
        Ok(output)
    }

    /// Duration, frame rate, size and audio presence of a video.
    pub async fn get_video_info(&self, path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
        probe_video(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::has_filter;
    use serde_json::json;
    use tempfile::TempDir;

    fn editor(dir: &TempDir) -> VideoEditor {
        VideoEditor::new(Arc::new(PipelineConfig::with_root(dir.path())))
    }

    /// 320x240 test video of `secs` seconds, optionally with a sine tone.
    async fn sample_video(dir: &Path, name: &str, secs: u32, with_audio: bool) -> PathBuf {
        let path = dir.join(name);
        let video_src = format!("testsrc=size=320x240:rate=24:duration={secs}");
        let audio_src = format!("sine=frequency=440:duration={secs}");
        let mut args = vec!["-y", "-f", "lavfi", "-i", video_src.as_str()];
        if with_audio {
            args.extend(["-f", "lavfi", "-i", audio_src.as_str(), "-c:a", "aac"]);
        }
        args.extend(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-shortest"]);

        let status = tokio::process::Command::new("ffmpeg")
            .args(&args)
            .arg(&path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await
            .unwrap();
        assert!(status.success());
        path
    }

    /// Peak level reported by `volumedetect`, in dB.
    async fn max_volume_db(path: &Path) -> f64 {
        let output = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(path)
            .args(["-af", "volumedetect", "-vn", "-f", "null", "-"])
            .output()
            .await
            .unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let value = stderr
            .lines()
            .find_map(|line| line.split("max_volume:").nth(1))
            .map(|rest| rest.trim().trim_end_matches("dB").trim().to_string())
            .unwrap();
        value.parse().unwrap()
    }

    #[test]
    fn test_edited_path() {
        let editor = VideoEditor::new(Arc::new(PipelineConfig::with_root("/data")));
        assert_eq!(
            editor.edited_path(Path::new("/videos/clip.mp4")).unwrap(),
            PathBuf::from("/data/video_editing/edited_clip.mp4")
        );
        assert!(editor.edited_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_concatenated_paths_are_unique() {
        let editor = VideoEditor::new(Arc::new(PipelineConfig::with_root("/data")));
        let first = editor.concatenated_path();
        let second = editor.concatenated_path();
        assert_ne!(first, second);
        assert!(first.starts_with("/data/video_editing"));
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("concatenated_") && name.ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_edit_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = editor(&dir)
            .edit_video(dir.path().join("missing.mp4"), &EditConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_concatenate_requires_two_inputs() {
        let dir = TempDir::new().unwrap();
        let err = editor(&dir)
            .concatenate_videos(&[dir.path().join("one.mp4")])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concatenate_reports_missing_input() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mp4");
        tokio::fs::write(&a, b"x").await.unwrap();
        let err = editor(&dir)
            .concatenate_videos(&[a, dir.path().join("b.mp4")])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(p) if p.ends_with("b.mp4")));
    }

    #[tokio::test]
    async fn test_trim_resize_and_slow_motion() {
        if !has_filter("drawtext").await {
            eprintln!("Skipping: ffmpeg with drawtext not available");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = sample_video(dir.path(), "sample.mp4", 5, true).await;
        let config: EditConfig = serde_json::from_value(json!({
            "trim": {"start": 1, "end": 3},
            "resize": {"scale": 0.5},
            "fade_in": {"duration": 0.5},
            "volume": {"factor": 0.8},
            "effects": ["black_and_white", "slow_motion"]
        }))
        .unwrap();

        let editor = editor(&dir);
        let output = editor.edit_video(&input, &config).await.unwrap();

        assert!(output.ends_with("video_editing/edited_sample.mp4"));
        let info = editor.get_video_info(&output).await.unwrap();
        assert_eq!(info.size, [160, 120]);
        assert!(info.has_audio);
        assert!((info.duration - 4.0).abs() < 0.3, "duration {}", info.duration);
    }

    #[tokio::test]
    async fn test_empty_edit_reencodes_silent_video() {
        if !has_filter("drawtext").await {
            eprintln!("Skipping: ffmpeg with drawtext not available");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = sample_video(dir.path(), "silent.mp4", 5, false).await;
        let editor = editor(&dir);

        let output = editor.edit_video(&input, &EditConfig::default()).await.unwrap();

        let source = editor.get_video_info(&input).await.unwrap();
        let info = editor.get_video_info(&output).await.unwrap();
        assert!(!info.has_audio);
        assert_eq!(info.size, [320, 240]);
        let frame = 1.0 / source.fps;
        assert!(
            (info.duration - source.duration).abs() <= frame + 0.01,
            "duration {} vs {}",
            info.duration,
            source.duration
        );
        assert!(input.exists(), "source is never removed");
    }

    #[tokio::test]
    async fn test_trim_window_sets_duration() {
        if !has_filter("drawtext").await {
            eprintln!("Skipping: ffmpeg with drawtext not available");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = sample_video(dir.path(), "ten.mp4", 10, false).await;
        let config: EditConfig =
            serde_json::from_value(json!({"trim": {"start": 2, "end": 5}})).unwrap();
        let editor = editor(&dir);

        let output = editor.edit_video(&input, &config).await.unwrap();

        let info = editor.get_video_info(&output).await.unwrap();
        assert!((info.duration - 3.0).abs() < 0.1, "duration {}", info.duration);
    }

    #[tokio::test]
    async fn test_zero_volume_mutes_audio() {
        if !has_filter("drawtext").await {
            eprintln!("Skipping: ffmpeg with drawtext not available");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = sample_video(dir.path(), "tone.mp4", 3, true).await;
        let config: EditConfig =
            serde_json::from_value(json!({"volume": {"factor": 0}})).unwrap();
        let editor = editor(&dir);

        assert!(max_volume_db(&input).await > -30.0);
        let output = editor.edit_video(&input, &config).await.unwrap();

        let info = editor.get_video_info(&output).await.unwrap();
        assert!(info.has_audio);
        let peak = max_volume_db(&output).await;
        assert!(peak <= -90.0, "max_volume {peak} dB");
    }

    #[tokio::test]
    async fn test_zero_volume_on_silent_video_is_noop() {
        if !has_filter("drawtext").await {
            eprintln!("Skipping: ffmpeg with drawtext not available");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = sample_video(dir.path(), "mute.mp4", 3, false).await;
        let config: EditConfig =
            serde_json::from_value(json!({"volume": {"factor": 0}})).unwrap();
        let editor = editor(&dir);

        let output = editor.edit_video(&input, &config).await.unwrap();

        let info = editor.get_video_info(&output).await.unwrap();
        assert!(!info.has_audio);
        assert_eq!(info.size, [320, 240]);
    }

    #[tokio::test]
    async fn test_concatenate_videos() {
        if !has_filter("drawtext").await {
            eprintln!("Skipping: ffmpeg with drawtext not available");
            return;
        }
        let dir = TempDir::new().unwrap();
        let a = sample_video(dir.path(), "a.mp4", 5, true).await;
        let b = sample_video(dir.path(), "b.mp4", 5, false).await;
        let editor = editor(&dir);

        let output = editor.concatenate_videos(&[a.clone(), b.clone()]).await.unwrap();

        assert!(a.exists() && b.exists());
        let name = output.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("concatenated_") && name.ends_with(".mp4"));
        let info = editor.get_video_info(&output).await.unwrap();
        assert!(!info.has_audio, "mixed inputs drop audio");
        assert!((info.duration - 10.0).abs() < 0.3);
    }
}

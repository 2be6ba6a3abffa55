//! FFmpeg command builder and runner.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_stderr_line, FfmpegProgress, StderrLine, StderrTail};

/// Diagnostic lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// One `-i` source with the options that precede it.
#[derive(Debug, Clone)]
struct FfmpegInput {
    args: Vec<String>,
    source: OsString,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<FfmpegInput>,
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    overwrite: bool,
}

impl FfmpegCommand {
    /// Command reading a single file.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![FfmpegInput {
                args: Vec::new(),
                source: input.as_ref().as_os_str().to_os_string(),
            }],
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Command reading a libavfilter source graph such as `color=c=red:s=640x360:d=5`.
    pub fn lavfi(source: impl Into<String>, output: impl AsRef<Path>) -> Self {
        let source: String = source.into();
        let mut cmd = Self::new(source, output);
        cmd.inputs[0].args.extend(["-f".to_string(), "lavfi".to_string()]);
        cmd
    }

    /// Command reading a concat demuxer manifest.
    pub fn concat_manifest(manifest: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self::new(manifest, output).input_args(["-f", "concat", "-safe", "0"])
    }

    /// Append another input file.
    pub fn add_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(FfmpegInput {
            args: Vec::new(),
            source: input.as_ref().as_os_str().to_os_string(),
        });
        self
    }

    /// Add an option for the most recently added input.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(input) = self.inputs.last_mut() {
            input.args.push(arg.into());
        }
        self
    }

    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(input) = self.inputs.last_mut() {
            input.args.extend(args.into_iter().map(Into::into));
        }
        self
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Input seek (before -i).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Input read duration (before -i).
    pub fn duration(self, seconds: f64) -> Self {
        self.input_arg("-t").input_arg(format!("{:.3}", seconds))
    }

    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    pub fn map(self, stream: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    /// Copy every stream without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Build the full argument vector.
    pub fn build_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        if self.overwrite {
            args.push("-y".into());
        }
        args.push("-v".into());
        args.push("error".into());
        args.push("-progress".into());
        args.push("pipe:2".into());
        args.push("-nostats".into());

        for input in &self.inputs {
            args.extend(input.args.iter().map(OsString::from));
            args.push("-i".into());
            args.push(input.source.clone());
        }

        args.extend(self.output_args.iter().map(OsString::from));
        args.push(self.output.as_os_str().to_os_string());
        args
    }

    /// Shell-ish rendering for logs.
    pub fn display(&self) -> String {
        self.build_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runner for FFmpeg commands with timeout and stderr capture.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run a command, reporting each completed progress block.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, on_progress: F) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let ffmpeg = check_ffmpeg()?;
        debug!("Running FFmpeg: ffmpeg {}", cmd.display());

        let started = Instant::now();
        let mut child = Command::new(ffmpeg)
            .args(cmd.build_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr was not captured"))?;

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut current = FfmpegProgress::default();
            let mut tail = StderrTail::new(STDERR_TAIL_LINES);
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_stderr_line(&line, &mut current) {
                    StderrLine::ProgressBlock(progress) => on_progress(progress),
                    StderrLine::Diagnostic(text) => tail.push(text),
                    StderrLine::Progress => {}
                }
            }
            tail
        });

        let waited = self.wait(&mut child).await;
        let tail = reader.await.unwrap_or_else(|_| StderrTail::new(1));

        let status = waited?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "FFmpeg finished with {}", status
        );

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                tail.into_text(),
                status.code(),
            ))
        }
    }

    async fn wait(&self, child: &mut Child) -> MediaResult<std::process::ExitStatus> {
        let Some(limit) = self.timeout else {
            return Ok(child.wait().await?);
        };

        let waited = tokio::time::timeout(limit, child.wait()).await;
        match waited {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!(
                    "FFmpeg timed out after {} seconds, killing process",
                    limit.as_secs()
                );
                let _ = child.kill().await;
                Err(MediaError::Timeout(limit.as_secs()))
            }
        }
    }
}

/// Locate the FFmpeg binary.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Locate the FFprobe binary.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

/// Whether the installed FFmpeg was built with the named filter.
pub async fn has_filter(name: &str) -> bool {
    let Ok(ffmpeg) = check_ffmpeg() else {
        return false;
    };
    let Ok(output) = Command::new(ffmpeg)
        .args(["-hide_banner", "-filters"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
    else {
        return false;
    };
    // Lines look like " T.C drawtext          V->V       Draw text ..."
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.build_args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .seek(10.0)
            .duration(30.0)
            .output_args(["-c:v", "libx264"]);

        let args = strings(&cmd);
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "input.mp4").unwrap();
        assert!(ss < input, "seek must precede the input");
        assert!(args.contains(&"10.000".to_string()));
        assert_eq!(args.last().unwrap(), "output.mp4");
        assert_eq!(args[0], "-y");
        assert!(args.windows(2).any(|w| w == ["-v", "error"]));
    }

    #[test]
    fn test_lavfi_source() {
        let cmd = FfmpegCommand::lavfi("color=c=purple:s=1280x720:d=5", "clip.mp4");
        let args = strings(&cmd);
        let f = args.iter().position(|a| a == "lavfi").unwrap();
        assert_eq!(args[f + 1], "-i");
        assert_eq!(args[f + 2], "color=c=purple:s=1280x720:d=5");
    }

    #[test]
    fn test_concat_manifest() {
        let cmd = FfmpegCommand::concat_manifest("/tmp/v_list.txt", "/tmp/v.mp4").stream_copy();
        let args = strings(&cmd);
        assert!(args.windows(2).any(|w| w == ["-f", "concat"]));
        assert!(args.windows(2).any(|w| w == ["-safe", "0"]));
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
    }

    #[test]
    fn test_multiple_inputs_keep_order() {
        let cmd = FfmpegCommand::new("a.mp4", "out.mp4")
            .add_input("b.mp4")
            .add_input("c.mp4");
        let args = strings(&cmd);
        let sources: Vec<_> = args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| w[1].clone())
            .collect();
        assert_eq!(sources, ["a.mp4", "b.mp4", "c.mp4"]);
    }
}

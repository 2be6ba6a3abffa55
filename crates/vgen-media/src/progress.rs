//! Parsing of FFmpeg's `-progress pipe:2` stream.
//!
//! FFmpeg interleaves `key=value` progress records with its own diagnostics
//! on stderr. Progress records are folded into [`FfmpegProgress`]; every
//! other line is diagnostic output and is kept in a bounded [`StderrTail`]
//! so a failure can report what FFmpeg complained about.

use std::collections::VecDeque;

/// Keys FFmpeg emits in a progress block.
const PROGRESS_KEYS: &[&str] = &[
    "frame",
    "fps",
    "bitrate",
    "total_size",
    "out_time_us",
    "out_time_ms",
    "out_time",
    "dup_frames",
    "drop_frames",
    "speed",
    "progress",
];

/// Snapshot of encoder progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FfmpegProgress {
    pub frame: u64,
    pub fps: f64,
    /// Output position in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed relative to realtime
    pub speed: f64,
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Percentage of `total_secs` encoded so far, capped at 100.
    pub fn percentage(&self, total_secs: f64) -> f64 {
        if total_secs <= 0.0 {
            return 0.0;
        }
        (self.out_time_ms as f64 / (total_secs * 1000.0) * 100.0).clamp(0.0, 100.0)
    }
}

/// Classification of one stderr line.
#[derive(Debug, PartialEq)]
pub enum StderrLine {
    /// Part of a progress block
    Progress,
    /// End of a progress block; carries the accumulated snapshot
    ProgressBlock(FfmpegProgress),
    /// Anything else FFmpeg printed
    Diagnostic(String),
}

/// Fold one stderr line into `current`.
pub fn parse_stderr_line(line: &str, current: &mut FfmpegProgress) -> StderrLine {
    let trimmed = line.trim();
    let Some((key, value)) = trimmed.split_once('=') else {
        return StderrLine::Diagnostic(trimmed.to_string());
    };
    if !PROGRESS_KEYS.contains(&key) {
        return StderrLine::Diagnostic(trimmed.to_string());
    }

    match key {
        // Both keys carry microseconds despite the name
        "out_time_us" | "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            current.is_complete = value == "end";
            return StderrLine::ProgressBlock(current.clone());
        }
        _ => {}
    }
    StderrLine::Progress
}

/// Last `capacity` diagnostic lines.
#[derive(Debug, Clone)]
pub struct StderrTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl StderrTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: String) {
        if line.is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Joined text, or `None` when nothing was captured.
    pub fn into_text(self) -> Option<String> {
        if self.lines.is_empty() {
            None
        } else {
            Some(Vec::from(self.lines).join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_block() {
        let mut progress = FfmpegProgress::default();
        assert_eq!(parse_stderr_line("frame=48", &mut progress), StderrLine::Progress);
        parse_stderr_line("out_time_us=2500000", &mut progress);
        parse_stderr_line("speed=3.2x", &mut progress);

        match parse_stderr_line("progress=end", &mut progress) {
            StderrLine::ProgressBlock(p) => {
                assert_eq!(p.frame, 48);
                assert_eq!(p.out_time_ms, 2500);
                assert!((p.speed - 3.2).abs() < 1e-9);
                assert!(p.is_complete);
                assert!((p.percentage(5.0) - 50.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_diagnostics_are_not_progress() {
        let mut progress = FfmpegProgress::default();
        let line = "[Parsed_drawtext_0 @ 0x55] Cannot find a valid font for the family Sans";
        assert_eq!(
            parse_stderr_line(line, &mut progress),
            StderrLine::Diagnostic(line.to_string())
        );
        // `key=value` shaped text that is not a progress key
        assert!(matches!(
            parse_stderr_line("Error opening input: a=b", &mut progress),
            StderrLine::Diagnostic(_)
        ));
        assert!(matches!(
            parse_stderr_line("speed=N/A", &mut progress),
            StderrLine::Progress
        ));
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        let mut tail = StderrTail::new(2);
        assert!(tail.is_empty());
        tail.push("one".to_string());
        tail.push(String::new());
        tail.push("two".to_string());
        tail.push("three".to_string());
        assert_eq!(tail.into_text().as_deref(), Some("two\nthree"));
        assert_eq!(StderrTail::new(4).into_text(), None);
    }
}

//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is unusable (bad parameters, missing input)
    Validation,
    /// FFmpeg/FFprobe failed, timed out or is absent
    ExternalProcess,
    /// Local I/O or decoding failure
    Library,
}

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("No clips to concatenate")]
    NoClips,

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Output was not produced: {0}")]
    MissingOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::FileNotFound(_) | MediaError::Validation(_) | MediaError::NoClips => {
                ErrorKind::Validation
            }
            MediaError::FfmpegNotFound
            | MediaError::FfprobeNotFound
            | MediaError::FfmpegFailed { .. }
            | MediaError::FfprobeFailed { .. }
            | MediaError::Timeout(_)
            | MediaError::MissingOutput(_) => ErrorKind::ExternalProcess,
            MediaError::InvalidVideo(_)
            | MediaError::Io(_)
            | MediaError::JsonParse(_)
            | MediaError::Internal(_) => ErrorKind::Library,
        }
    }

    /// Only external process failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ExternalProcess
    }

    /// Captured stderr, when the failing process produced any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            MediaError::FfmpegFailed { stderr, .. } | MediaError::FfprobeFailed { stderr, .. } => {
                stderr.as_deref()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(MediaError::NoClips.kind(), ErrorKind::Validation);
        assert_eq!(
            MediaError::FileNotFound(PathBuf::from("/nope.mp4")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(MediaError::Timeout(30).kind(), ErrorKind::ExternalProcess);
        assert_eq!(
            MediaError::Io(std::io::Error::other("disk")).kind(),
            ErrorKind::Library
        );
    }

    #[test]
    fn test_only_external_failures_retry() {
        assert!(MediaError::ffmpeg_failed("boom", None, Some(1)).is_retryable());
        assert!(MediaError::Timeout(60).is_retryable());
        assert!(!MediaError::validation("start must be before end").is_retryable());
        assert!(!MediaError::internal("bug").is_retryable());
    }

    #[test]
    fn test_stderr_accessor() {
        let err = MediaError::ffmpeg_failed("boom", Some("Invalid data".to_string()), Some(1));
        assert_eq!(err.stderr(), Some("Invalid data"));
        assert_eq!(MediaError::NoClips.stderr(), None);
    }
}

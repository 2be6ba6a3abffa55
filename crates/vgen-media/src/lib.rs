#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for placeholder generation and video editing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout and stderr capture
//! - The scene planner and placeholder clip renderer
//! - Bounded, order-preserving multi-scene generation
//! - The declarative edit pass, explicit concatenation and FFprobe queries

pub mod command;
pub mod config;
pub mod editor;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod generator;
pub mod metrics;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod renderer;

pub use command::{check_ffmpeg, check_ffprobe, has_filter, FfmpegCommand, FfmpegRunner};
pub use config::PipelineConfig;
pub use editor::VideoEditor;
pub use error::{ErrorKind, MediaError, MediaResult};
pub use filters::{build_edit_plan, EditPlan};
pub use generator::{GenerationRequest, VideoGenerator, MAX_DURATION_SECS};
pub use planner::ScenePlanner;
pub use probe::probe_video;
pub use progress::FfmpegProgress;
pub use renderer::{ClipRenderer, RenderedClip};

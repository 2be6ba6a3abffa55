//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use vgen_media::fs_utils::ensure_dir;
use vgen_media::{check_ffmpeg, check_ffprobe};

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub output_dir: CheckStatus,
    /// Informational; an unconfigured cloud does not fail readiness
    pub cloud: CheckStatus,
}

/// Outcome of one dependency probe.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckStatus {
    Ok { latency_ms: u64 },
    Error { error: String },
}

impl CheckStatus {
    fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Ok { .. })
    }
}

async fn probe<T, E, F>(check: F) -> CheckStatus
where
    E: std::fmt::Display,
    F: std::future::Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    match check.await {
        Ok(_) => CheckStatus::Ok {
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => CheckStatus::Error {
            error: e.to_string(),
        },
    }
}

/// Readiness check endpoint (readiness probe).
///
/// Ready when FFmpeg and FFprobe are installed and the output directory is
/// writable.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let ffmpeg = probe(async { check_ffmpeg() }).await;
    let ffprobe = probe(async { check_ffprobe() }).await;
    let output_dir = probe(ensure_dir(&state.pipeline().output_dir)).await;

    let cloud = if state.cloud.is_configured() {
        CheckStatus::Ok { latency_ms: 0 }
    } else {
        CheckStatus::Error {
            error: format!("{} backend not configured", state.cloud.backend()),
        }
    };

    let all_ok = ffmpeg.is_ok() && ffprobe.is_ok() && output_dir.is_ok();
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            ffmpeg,
            ffprobe,
            output_dir,
            cloud,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

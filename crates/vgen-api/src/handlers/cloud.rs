//! Cloud distribution handlers.

use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use vgen_media::fs_utils::file_exists;
use vgen_models::cloud::DEFAULT_CONTAINER;
use vgen_models::{AnalysisReport, CloudStatus, SetupInstructions, StreamingInfo, VideoMetrics, WorkflowReport};
use vgen_storage::run_workflow;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CloudStatusResponse {
    pub configured: bool,
    pub backend: &'static str,
    pub services: CloudStatus,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub video_path: String,
    #[serde(default)]
    pub container_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub original_path: String,
    pub blob_url: String,
    pub cdn_url: String,
    pub container: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoUrlRequest {
    #[serde(default)]
    pub video_url: String,
}

#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub original_url: String,
    pub streaming: StreamingInfo,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub video_url: String,
    pub analysis: AnalysisReport,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub video_id: String,
    pub metrics: VideoMetrics,
}

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub original_path: String,
    pub workflow: WorkflowReport,
    pub status: String,
}

fn require_configured(state: &AppState) -> ApiResult<()> {
    if state.cloud.is_configured() {
        Ok(())
    } else {
        Err(ApiError::service_unavailable("Cloud services not configured"))
    }
}

fn require_url(url: &str) -> ApiResult<()> {
    if url.trim().is_empty() {
        Err(ApiError::bad_request("Video URL is required"))
    } else {
        Ok(())
    }
}

fn container(name: Option<String>) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONTAINER.to_string())
}

pub async fn cloud_status(State(state): State<AppState>) -> Json<CloudStatusResponse> {
    Json(CloudStatusResponse {
        configured: state.cloud.is_configured(),
        backend: state.cloud.backend(),
        services: state.cloud.status(),
    })
}

pub async fn setup_instructions(State(state): State<AppState>) -> Json<SetupInstructions> {
    Json(state.cloud.setup_instructions())
}

/// Upload a local video and derive its CDN URL.
pub async fn upload_video(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let Json(body) = payload?;
    if body.video_path.trim().is_empty() {
        return Err(ApiError::bad_request("Video path is required"));
    }
    state.require_managed_path(&body.video_path)?;
    if !file_exists(&body.video_path).await {
        return Err(ApiError::not_found(format!("Video file not found: {}", body.video_path)));
    }
    require_configured(&state)?;

    let container = container(body.container_name);
    let blob_url = state
        .cloud
        .upload_video(&PathBuf::from(&body.video_path), &container)
        .await?;
    let cdn_url = state.cloud.cdn_url(&blob_url).await?;
    info!(container = %container, "Uploaded {} to {}", body.video_path, blob_url);

    Ok(Json(UploadResponse {
        original_path: body.video_path,
        blob_url,
        cdn_url,
        container,
        status: "uploaded".to_string(),
    }))
}

pub async fn create_stream(
    State(state): State<AppState>,
    payload: Result<Json<VideoUrlRequest>, JsonRejection>,
) -> ApiResult<Json<StreamResponse>> {
    let Json(body) = payload?;
    require_url(&body.video_url)?;
    require_configured(&state)?;

    let streaming = state.cloud.streaming_locator(&body.video_url).await?;
    Ok(Json(StreamResponse {
        original_url: body.video_url,
        streaming,
    }))
}

/// Analysis does not require the storage side to be configured.
pub async fn analyze_video(
    State(state): State<AppState>,
    payload: Result<Json<VideoUrlRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(body) = payload?;
    require_url(&body.video_url)?;

    let analysis = state.cloud.analyze_video(&body.video_url).await?;
    Ok(Json(AnalyzeResponse {
        video_url: body.video_url,
        analysis,
    }))
}

pub async fn video_metrics(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<MetricsResponse>> {
    let metrics = state.cloud.video_metrics(&video_id).await?;
    Ok(Json(MetricsResponse { video_id, metrics }))
}

/// Upload, then CDN, streaming and analysis, reporting each step.
pub async fn run_cloud_workflow(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<Json<WorkflowResponse>> {
    let Json(body) = payload?;
    if body.video_path.trim().is_empty() || !file_exists(&body.video_path).await {
        return Err(ApiError::bad_request("Valid video path is required"));
    }
    state.require_managed_path(&body.video_path)?;
    require_configured(&state)?;

    let container = container(body.container_name);
    let workflow = run_workflow(
        state.cloud.as_ref(),
        &PathBuf::from(&body.video_path),
        &container,
    )
    .await;

    Ok(Json(WorkflowResponse {
        original_path: body.video_path,
        workflow,
        status: "completed".to_string(),
    }))
}

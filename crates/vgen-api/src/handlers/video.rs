//! Video generation handlers.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;

use vgen_media::fs_utils::file_exists;
use vgen_media::GenerationRequest;
use vgen_models::{AspectRatio, VideoId, VideoStatus, VideoStyle};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Generate request body.
#[derive(Debug, Deserialize)]
pub struct GenerateVideoRequest {
    #[serde(default)]
    pub script: String,
    /// Unknown styles fall back to `real`
    #[serde(default)]
    pub style: Option<String>,
    /// Seconds, default 5
    #[serde(default)]
    pub duration: Option<u32>,
    /// Unknown ratios fall back to `landscape`
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateVideoResponse {
    pub video_id: String,
    pub video_path: String,
    pub status: VideoStatus,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct VideoStatusResponse {
    pub video_id: String,
    pub status: VideoStatus,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub video_id: String,
    pub download_url: String,
}

/// Generate a placeholder video from a script.
pub async fn generate_video(
    State(state): State<AppState>,
    payload: Result<Json<GenerateVideoRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateVideoResponse>> {
    let Json(body) = payload?;

    let mut request = GenerationRequest::new(body.script)
        .with_style(VideoStyle::parse_or_default(body.style.as_deref().unwrap_or_default()))
        .with_aspect_ratio(AspectRatio::parse_or_default(
            body.aspect_ratio.as_deref().unwrap_or_default(),
        ));
    if let Some(duration) = body.duration {
        request = request.with_duration(duration);
    }

    let video = state.generator.generate(&request).await?;
    info!(video_id = %video.video_id, "Generated video");

    Ok(Json(GenerateVideoResponse {
        video_id: video.video_id.to_string(),
        video_path: video.video_path.to_string_lossy().into_owned(),
        status: video.status,
        created_at: video.created_at.to_rfc3339(),
    }))
}

/// Path of a generated video, which must exist.
async fn existing_video(state: &AppState, video_id: &str) -> ApiResult<std::path::PathBuf> {
    let id = VideoId::from_string(video_id);
    if !id.is_safe() {
        return Err(ApiError::bad_request(format!("Invalid video id: {video_id}")));
    }
    let path = state.pipeline().video_path(id.as_str());
    if !file_exists(&path).await {
        return Err(ApiError::not_found(format!("Video not found: {video_id}")));
    }
    Ok(path)
}

/// Generation is synchronous, so a video is either complete or unknown.
pub async fn video_status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoStatusResponse>> {
    existing_video(&state, &video_id).await?;
    Ok(Json(VideoStatusResponse {
        video_id,
        status: VideoStatus::Completed,
    }))
}

pub async fn download_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<DownloadResponse>> {
    existing_video(&state, &video_id).await?;
    Ok(Json(DownloadResponse {
        download_url: format!("/api/video/file/{video_id}"),
        video_id,
    }))
}

/// Stream the generated mp4.
pub async fn video_file(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    request: Request<Body>,
) -> ApiResult<Response> {
    let path = existing_video(&state, &video_id).await?;
    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(response.map(Body::new).into_response())
}

//! Editing handlers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use vgen_media::fs_utils::file_exists;
use vgen_models::{edit_presets, supported_edits, EditConfig, EditOperationInfo, EditPreset, VideoInfo};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub video_path: String,
    #[serde(default)]
    pub edit_config: EditConfig,
}

#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub original_path: String,
    pub edited_path: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ConcatenateRequest {
    #[serde(default)]
    pub video_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ConcatenateResponse {
    pub input_paths: Vec<String>,
    pub output_path: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct VideoInfoResponse {
    pub video_path: String,
    pub info: VideoInfo,
}

#[derive(Debug, Serialize)]
pub struct OperationsResponse {
    pub operations: BTreeMap<String, EditOperationInfo>,
}

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub presets: BTreeMap<String, EditPreset>,
}

/// Apply an edit configuration to a video.
pub async fn edit_video(
    State(state): State<AppState>,
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> ApiResult<Json<EditResponse>> {
    let Json(body) = payload?;
    if body.video_path.trim().is_empty() {
        return Err(ApiError::bad_request("Video path is required"));
    }
    state.require_managed_path(&body.video_path)?;

    let edited = state
        .editor
        .edit_video(&body.video_path, &body.edit_config)
        .await?;

    Ok(Json(EditResponse {
        original_path: body.video_path,
        edited_path: edited.to_string_lossy().into_owned(),
        status: "completed".to_string(),
    }))
}

/// Join at least two videos, re-encoding them onto a common canvas.
pub async fn concatenate_videos(
    State(state): State<AppState>,
    payload: Result<Json<ConcatenateRequest>, JsonRejection>,
) -> ApiResult<Json<ConcatenateResponse>> {
    let Json(body) = payload?;
    if body.video_paths.len() < 2 {
        return Err(ApiError::bad_request("At least 2 video paths are required"));
    }
    for path in &body.video_paths {
        state.require_managed_path(path)?;
    }

    let paths: Vec<PathBuf> = body.video_paths.iter().map(PathBuf::from).collect();
    let output = state.editor.concatenate_videos(&paths).await?;

    Ok(Json(ConcatenateResponse {
        input_paths: body.video_paths,
        output_path: output.to_string_lossy().into_owned(),
        status: "completed".to_string(),
    }))
}

/// Read-only probe; not confined to the managed directories.
pub async fn video_info(
    State(state): State<AppState>,
    Path(video_path): Path<String>,
) -> ApiResult<Json<VideoInfoResponse>> {
    if !file_exists(&video_path).await {
        return Err(ApiError::not_found(format!("Video file not found: {video_path}")));
    }
    let info = state.editor.get_video_info(&video_path).await?;
    Ok(Json(VideoInfoResponse { video_path, info }))
}

pub async fn operations() -> Json<OperationsResponse> {
    Json(OperationsResponse {
        operations: supported_edits(),
    })
}

pub async fn presets() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: edit_presets(),
    })
}

//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::cloud::{
    analyze_video, cloud_status, create_stream, run_cloud_workflow, setup_instructions,
    upload_video, video_metrics,
};
use crate::handlers::editor::{concatenate_videos, edit_video, operations, presets, video_info};
use crate::handlers::styles::{list_styles, style_examples, style_preview};
use crate::handlers::video::{download_video, generate_video, video_file, video_status};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, rate_limit_middleware, request_id, request_logging, IpRateLimiter};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        .route("/video/generate", post(generate_video))
        .route("/video/status/:video_id", get(video_status))
        .route("/video/download/:video_id", get(download_video))
        .route("/video/file/:video_id", get(video_file));

    let editor_routes = Router::new()
        .route("/editor/edit", post(edit_video))
        .route("/editor/concatenate", post(concatenate_videos))
        .route("/editor/info/*video_path", get(video_info))
        .route("/editor/operations", get(operations))
        .route("/editor/presets", get(presets));

    let style_routes = Router::new()
        .route("/styles/list", get(list_styles))
        .route("/styles/preview/:style", get(style_preview))
        .route("/styles/examples", get(style_examples));

    let cloud_routes = Router::new()
        .route("/cloud/status", get(cloud_status))
        .route("/cloud/setup", get(setup_instructions))
        .route("/cloud/upload", post(upload_video))
        .route("/cloud/stream", post(create_stream))
        .route("/cloud/analyze", post(analyze_video))
        .route("/cloud/metrics/:video_id", get(video_metrics))
        .route("/cloud/workflow", post(run_cloud_workflow));

    let rate_limiter = Arc::new(IpRateLimiter::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(video_routes)
        .merge(editor_routes)
        .merge(style_routes)
        .merge(cloud_routes)
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

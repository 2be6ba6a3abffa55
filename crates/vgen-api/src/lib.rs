//! Axum HTTP API server.
//!
//! This crate provides:
//! - Script-to-video generation and download
//! - The edit pass, concatenation and video info
//! - Style browsing
//! - Cloud upload, streaming, analysis and metrics
//! - Rate limiting, request ids and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;

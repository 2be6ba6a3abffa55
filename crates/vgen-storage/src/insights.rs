//! HTTP client for the video insights service.
//!
//! The service exposes two endpoints:
//! - `POST {base}/analyze` with `{"video_url": ...}` returning an [`AnalysisReport`]
//! - `GET {base}/metrics/{video_id}` returning [`VideoMetrics`]

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use vgen_models::{AnalysisReport, VideoMetrics};

use crate::error::{StorageError, StorageResult};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    video_url: &'a str,
}

/// Insights service client.
#[derive(Debug, Clone)]
pub struct InsightsClient {
    client: reqwest::Client,
    base_url: String,
}

impl InsightsClient {
    pub fn new(base_url: impl Into<String>) -> StorageResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> StorageResult<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)
            .map_err(|e| StorageError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::config_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request content analysis of a published video.
    pub async fn analyze(&self, video_url: &str) -> StorageResult<AnalysisReport> {
        let url = format!("{}/analyze", self.base_url);
        debug!(video_url = video_url, "Requesting video analysis");

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { video_url })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, "Insights analysis failed");
            return Err(StorageError::insights(format!("analyze returned {status}: {body}")));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Playback metrics; a video unknown to the service has empty metrics.
    pub async fn metrics(&self, video_id: &str) -> StorageResult<VideoMetrics> {
        let url = format!("{}/metrics/{}", self.base_url, video_id);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(VideoMetrics::empty(video_id));
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(StorageError::insights(format!("metrics returned {status}: {body}")));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            InsightsClient::new("not a url"),
            Err(StorageError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_analyze() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_json(json!({"video_url": "https://cdn/v.mp4"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "insights": {"transcript": "hello", "keywords": ["sea"]},
                "thumbnails": [{"time": "00:00:01", "url": "https://cdn/t.jpg"}],
                "status": "completed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = InsightsClient::new(format!("{}/", server.uri())).unwrap();
        let report = client.analyze("https://cdn/v.mp4").await.unwrap();

        assert_eq!(report.insights.transcript, "hello");
        assert_eq!(report.insights.keywords, ["sea"]);
        assert_eq!(report.thumbnails.len(), 1);
        assert_eq!(report.status, "completed");
    }

    #[tokio::test]
    async fn test_analyze_surfaces_service_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        let err = client.analyze("https://cdn/v.mp4").await.unwrap_err();

        assert!(matches!(err, StorageError::Insights(ref m) if m.contains("upstream down")));
    }

    #[tokio::test]
    async fn test_metrics_for_unknown_video_are_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics/abc"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        let metrics = client.metrics("abc").await.unwrap();

        assert_eq!(metrics, VideoMetrics::empty("abc"));
    }

    #[tokio::test]
    async fn test_metrics() {
        let server = MockServer::start().await;
        let mut expected = VideoMetrics::empty("abc");
        expected.views = 42;
        expected.device_types.insert("mobile".to_string(), 30);
        Mock::given(method("GET"))
            .and(path("/metrics/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&expected))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        assert_eq!(client.metrics("abc").await.unwrap(), expected);
    }
}

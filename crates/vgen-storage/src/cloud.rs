//! Cloud distribution backends.
//!
//! [`CloudServices`] is the seam between the HTTP layer and whatever stores
//! and publishes videos. Two implementations exist:
//! - [`StubCloud`]: deterministic, in-process payloads for development and tests
//! - [`ObjectStoreCloud`]: an S3-compatible store plus optional CDN,
//!   streaming and insights endpoints

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{info, warn};

use vgen_models::cloud::{
    AnalysisStep, CdnStep, StreamingStep, Thumbnail, UploadStep, VideoInsights,
};
use vgen_models::{
    AnalysisReport, CloudStatus, SetupInstructions, StreamingInfo, StreamingUrls, VideoMetrics,
    WorkflowReport, WorkflowStep,
};

use crate::client::{upload_key, ObjectStoreClient, ObjectStoreConfig};
use crate::error::{StorageError, StorageResult};
use crate::insights::InsightsClient;

const VIDEO_CONTENT_TYPE: &str = "video/mp4";
const BLOB_HOST_SUFFIX: &str = ".blob.core.windows.net";
const CDN_HOST_SUFFIX: &str = ".azureedge.net";

/// Upload, publish and analyze generated videos.
#[async_trait]
pub trait CloudServices: Send + Sync {
    /// Short backend name for logs and metrics.
    fn backend(&self) -> &'static str;

    fn status(&self) -> CloudStatus;

    fn is_configured(&self) -> bool {
        let status = self.status();
        status.blob_storage || status.media_services
    }

    /// Upload a local video as `generated/<filename>` and return its URL.
    ///
    /// The container is created when missing.
    async fn upload_video(&self, path: &Path, container: &str) -> StorageResult<String>;

    /// CDN URL for an uploaded blob.
    async fn cdn_url(&self, blob_url: &str) -> StorageResult<String>;

    /// HLS, DASH and Smooth Streaming URLs for an uploaded blob.
    async fn streaming_locator(&self, blob_url: &str) -> StorageResult<StreamingInfo>;

    async fn analyze_video(&self, video_url: &str) -> StorageResult<AnalysisReport>;

    async fn video_metrics(&self, video_id: &str) -> StorageResult<VideoMetrics>;

    fn setup_instructions(&self) -> SetupInstructions {
        setup_instructions()
    }
}

/// How to configure the object store backend.
pub fn setup_instructions() -> SetupInstructions {
    let strings = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
    SetupInstructions {
        required_environment_variables: strings(&[
            "CLOUD_BACKEND",
            "STORAGE_ENDPOINT_URL",
            "STORAGE_ACCESS_KEY_ID",
            "STORAGE_SECRET_ACCESS_KEY",
            "STORAGE_REGION",
        ]),
        services_needed: strings(&[
            "S3-compatible object storage",
            "CDN in front of the public bucket URL (optional)",
            "Streaming packager (optional)",
            "Video insights service (optional)",
        ]),
        setup_steps: strings(&[
            "1. Create an S3-compatible storage account and access key",
            "2. Set CLOUD_BACKEND=object_store and the STORAGE_* variables",
            "3. Optionally set STORAGE_PUBLIC_URL, CDN_BASE_URL and STREAMING_ENDPOINT_URL",
            "4. Optionally set INSIGHTS_SERVICE_URL for analysis and metrics",
            "5. Test the connection using the /api/cloud/status endpoint",
        ]),
    }
}

fn record_upload(backend: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("vgen_cloud_uploads_total", "backend" => backend, "outcome" => outcome).increment(1);
}

async fn require_file(path: &Path) -> StorageResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(StorageError::FileNotFound(path.to_path_buf())),
    }
}

/// Upload → CDN → streaming → analysis, recording every step's outcome.
///
/// Steps after the upload only run when the upload succeeded.
pub async fn run_workflow(
    cloud: &dyn CloudServices,
    path: &Path,
    container: &str,
) -> WorkflowReport {
    let blob_url = match cloud.upload_video(path, container).await {
        Ok(url) => url,
        Err(e) => {
            warn!(path = %path.display(), "Workflow upload failed: {}", e);
            return WorkflowReport {
                upload: WorkflowStep::Failed {
                    error: e.to_string(),
                },
                cdn: None,
                streaming: None,
                analysis: None,
            };
        }
    };

    let cdn = step(cloud.cdn_url(&blob_url).await.map(|cdn_url| CdnStep { cdn_url }));
    let streaming = step(
        cloud
            .streaming_locator(&blob_url)
            .await
            .map(|endpoints| StreamingStep { endpoints }),
    );
    let analysis = step(
        cloud
            .analyze_video(&blob_url)
            .await
            .map(|insights| AnalysisStep { insights }),
    );

    info!(
        backend = cloud.backend(),
        blob_url = %blob_url,
        cdn = cdn.is_success(),
        streaming = streaming.is_success(),
        analysis = analysis.is_success(),
        "Distribution workflow finished"
    );

    WorkflowReport {
        upload: WorkflowStep::Success(UploadStep { blob_url }),
        cdn: Some(cdn),
        streaming: Some(streaming),
        analysis: Some(analysis),
    }
}

fn step<T>(result: StorageResult<T>) -> WorkflowStep<T> {
    match result {
        Ok(value) => WorkflowStep::Success(value),
        Err(e) => {
            warn!("Workflow step failed: {}", e);
            WorkflowStep::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Deterministic in-process backend.
#[derive(Debug, Clone)]
pub struct StubCloud {
    account: String,
    configured: bool,
}

impl Default for StubCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl StubCloud {
    pub fn new() -> Self {
        Self {
            account: "vgenstub".to_string(),
            configured: true,
        }
    }

    /// A stub reporting that nothing is configured.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    fn require_configured(&self) -> StorageResult<()> {
        if self.configured {
            Ok(())
        } else {
            Err(StorageError::not_configured("set CLOUD_BACKEND and the STORAGE_* variables"))
        }
    }
}

#[async_trait]
impl CloudServices for StubCloud {
    fn backend(&self) -> &'static str {
        "stub"
    }

    fn status(&self) -> CloudStatus {
        CloudStatus {
            blob_storage: self.configured,
            media_services: self.configured,
            credentials_available: self.configured,
        }
    }

    async fn upload_video(&self, path: &Path, container: &str) -> StorageResult<String> {
        self.require_configured()?;
        require_file(path).await?;

        let url = format!(
            "https://{}{}/{}/{}",
            self.account,
            BLOB_HOST_SUFFIX,
            container,
            upload_key(path)?
        );
        record_upload(self.backend(), true);
        info!(path = %path.display(), "Stub upload to {}", url);
        Ok(url)
    }

    async fn cdn_url(&self, blob_url: &str) -> StorageResult<String> {
        Ok(blob_url.replace(BLOB_HOST_SUFFIX, CDN_HOST_SUFFIX))
    }

    async fn streaming_locator(&self, blob_url: &str) -> StorageResult<StreamingInfo> {
        self.require_configured()?;
        Ok(StreamingInfo::ready(StreamingUrls::for_base(blob_url)))
    }

    async fn analyze_video(&self, video_url: &str) -> StorageResult<AnalysisReport> {
        let strings = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Ok(AnalysisReport {
            insights: VideoInsights {
                transcript: "Mock transcript of the video content...".to_string(),
                keywords: strings(&["video", "content", "analysis"]),
                faces: Vec::new(),
                emotions: strings(&["neutral", "positive"]),
                topics: strings(&["technology", "artificial intelligence"]),
                brands: Vec::new(),
                objects: strings(&["computer", "screen"]),
            },
            thumbnails: vec![
                Thumbnail {
                    time: "00:00:01".to_string(),
                    url: format!("{video_url}_thumb_1.jpg"),
                },
                Thumbnail {
                    time: "00:00:05".to_string(),
                    url: format!("{video_url}_thumb_2.jpg"),
                },
            ],
            status: "completed".to_string(),
        })
    }

    async fn video_metrics(&self, video_id: &str) -> StorageResult<VideoMetrics> {
        Ok(VideoMetrics::empty(video_id))
    }
}

/// S3-compatible store with optional CDN, streaming and insights endpoints.
#[derive(Clone)]
pub struct ObjectStoreCloud {
    store: ObjectStoreClient,
    cdn_base: Option<String>,
    streaming_base: Option<String>,
    insights: Option<InsightsClient>,
}

impl ObjectStoreCloud {
    pub fn new(store: ObjectStoreClient) -> Self {
        Self {
            store,
            cdn_base: None,
            streaming_base: None,
            insights: None,
        }
    }

    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        self.cdn_base = Some(base.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_streaming_base(mut self, base: impl Into<String>) -> Self {
        self.streaming_base = Some(base.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_insights(mut self, insights: InsightsClient) -> Self {
        self.insights = Some(insights);
        self
    }

    /// Create from `STORAGE_*`, `CDN_BASE_URL`, `STREAMING_ENDPOINT_URL`
    /// and `INSIGHTS_SERVICE_URL`.
    pub async fn from_env() -> StorageResult<Self> {
        let mut cloud = Self::new(ObjectStoreClient::new(ObjectStoreConfig::from_env()?).await?);
        if let Some(base) = non_empty_env("CDN_BASE_URL") {
            cloud = cloud.with_cdn_base(base);
        }
        if let Some(base) = non_empty_env("STREAMING_ENDPOINT_URL") {
            cloud = cloud.with_streaming_base(base);
        }
        if let Some(base) = non_empty_env("INSIGHTS_SERVICE_URL") {
            cloud = cloud.with_insights(InsightsClient::new(base)?);
        }
        Ok(cloud)
    }

    /// Object path (`<container>/<key>`) of a URL produced by this store.
    fn object_path<'a>(&self, blob_url: &'a str) -> StorageResult<&'a str> {
        let base = self.store.config().object_url("", "");
        let base = base.trim_end_matches('/');
        blob_url
            .strip_prefix(base)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| StorageError::InvalidUrl(format!("not an object store URL: {blob_url}")))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[async_trait]
impl CloudServices for ObjectStoreCloud {
    fn backend(&self) -> &'static str {
        "object_store"
    }

    fn status(&self) -> CloudStatus {
        CloudStatus {
            blob_storage: true,
            media_services: self.streaming_base.is_some(),
            credentials_available: true,
        }
    }

    async fn upload_video(&self, path: &Path, container: &str) -> StorageResult<String> {
        require_file(path).await?;
        let key = upload_key(path)?;

        let result: StorageResult<String> = async {
            self.store.ensure_container(container).await?;
            self.store
                .upload_file(path, container, &key, VIDEO_CONTENT_TYPE)
                .await
        }
        .await;

        record_upload(self.backend(), result.is_ok());
        result
    }

    async fn cdn_url(&self, blob_url: &str) -> StorageResult<String> {
        let cdn = self
            .cdn_base
            .as_deref()
            .ok_or_else(|| StorageError::not_configured("CDN_BASE_URL not set"))?;
        Ok(format!("{}/{}", cdn, self.object_path(blob_url)?))
    }

    async fn streaming_locator(&self, blob_url: &str) -> StorageResult<StreamingInfo> {
        let streaming = self
            .streaming_base
            .as_deref()
            .ok_or_else(|| StorageError::not_configured("STREAMING_ENDPOINT_URL not set"))?;
        let base = format!("{}/{}", streaming, self.object_path(blob_url)?);
        Ok(StreamingInfo::ready(StreamingUrls::for_base(&base)))
    }

    async fn analyze_video(&self, video_url: &str) -> StorageResult<AnalysisReport> {
        let insights = self
            .insights
            .as_ref()
            .ok_or_else(|| StorageError::not_configured("INSIGHTS_SERVICE_URL not set"))?;
        insights.analyze(video_url).await
    }

    async fn video_metrics(&self, video_id: &str) -> StorageResult<VideoMetrics> {
        match &self.insights {
            Some(insights) => insights.metrics(video_id).await,
            None => Ok(VideoMetrics::empty(video_id)),
        }
    }
}

/// Which backend `CLOUD_BACKEND` selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloudBackend {
    #[default]
    Stub,
    ObjectStore,
}

impl CloudBackend {
    /// Unknown values fall back to the stub.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "object_store" | "object-store" | "s3" => CloudBackend::ObjectStore,
            _ => CloudBackend::Stub,
        }
    }

    pub fn from_env() -> Self {
        std::env::var("CLOUD_BACKEND")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Build the backend selected by the environment.
///
/// An object store that cannot be configured is replaced by an
/// unconfigured stub so the cloud routes answer 503.
pub async fn cloud_from_env() -> Arc<dyn CloudServices> {
    match CloudBackend::from_env() {
        CloudBackend::Stub => Arc::new(StubCloud::new()),
        CloudBackend::ObjectStore => match ObjectStoreCloud::from_env().await {
            Ok(cloud) => {
                info!("Using object store cloud backend");
                Arc::new(cloud)
            }
            Err(e) => {
                warn!("Object store backend unavailable: {}", e);
                Arc::new(StubCloud::unconfigured())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn video_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("abc.mp4");
        tokio::fs::write(&path, b"mp4").await.unwrap();
        path
    }

    async fn object_store() -> ObjectStoreCloud {
        let config = ObjectStoreConfig {
            endpoint_url: "http://127.0.0.1:9".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            region: "auto".to_string(),
            public_url: Some("https://media.example.com".to_string()),
        };
        ObjectStoreCloud::new(ObjectStoreClient::new(config).await.unwrap())
    }

    #[tokio::test]
    async fn test_stub_upload_and_cdn() {
        let dir = TempDir::new().unwrap();
        let video = video_file(&dir).await;
        let cloud = StubCloud::new();

        let blob_url = cloud.upload_video(&video, "videos").await.unwrap();
        assert_eq!(
            blob_url,
            "https://vgenstub.blob.core.windows.net/videos/generated/abc.mp4"
        );
        assert_eq!(
            cloud.cdn_url(&blob_url).await.unwrap(),
            "https://vgenstub.azureedge.net/videos/generated/abc.mp4"
        );
    }

    #[tokio::test]
    async fn test_stub_upload_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = StubCloud::new()
            .upload_video(&dir.path().join("nope.mp4"), "videos")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_stub() {
        let dir = TempDir::new().unwrap();
        let video = video_file(&dir).await;
        let cloud = StubCloud::unconfigured();

        assert!(!cloud.is_configured());
        assert!(matches!(
            cloud.upload_video(&video, "videos").await,
            Err(StorageError::NotConfigured(_))
        ));
        assert!(matches!(
            cloud.streaming_locator("https://x/v.mp4").await,
            Err(StorageError::NotConfigured(_))
        ));
        assert!(cloud.analyze_video("https://x/v.mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_stub_analysis_and_metrics() {
        let cloud = StubCloud::new();
        let report = cloud.analyze_video("https://x/v.mp4").await.unwrap();
        assert_eq!(report.status, "completed");
        assert_eq!(report.insights.keywords, ["video", "content", "analysis"]);
        assert_eq!(report.thumbnails[1].url, "https://x/v.mp4_thumb_2.jpg");

        let metrics = cloud.video_metrics("abc").await.unwrap();
        assert_eq!(metrics, VideoMetrics::empty("abc"));
    }

    #[tokio::test]
    async fn test_workflow_runs_every_step() {
        let dir = TempDir::new().unwrap();
        let video = video_file(&dir).await;

        let report = run_workflow(&StubCloud::new(), &video, "videos").await;

        assert!(report.upload.is_success());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["cdn"]["status"], "success");
        assert_eq!(
            value["streaming"]["endpoints"]["streaming_urls"]["hls"],
            json!("https://vgenstub.blob.core.windows.net/videos/generated/abc.mp4?format=hls")
        );
        assert_eq!(value["analysis"]["insights"]["status"], "completed");
    }

    #[tokio::test]
    async fn test_workflow_stops_after_failed_upload() {
        let dir = TempDir::new().unwrap();
        let report = run_workflow(&StubCloud::new(), &dir.path().join("gone.mp4"), "videos").await;

        assert!(!report.upload.is_success());
        assert!(report.cdn.is_none() && report.streaming.is_none() && report.analysis.is_none());
    }

    #[tokio::test]
    async fn test_object_store_derived_urls() {
        let cloud = object_store()
            .await
            .with_cdn_base("https://cdn.example.com/")
            .with_streaming_base("https://stream.example.com");
        let blob = "https://media.example.com/videos/generated/abc.mp4";

        assert_eq!(
            cloud.cdn_url(blob).await.unwrap(),
            "https://cdn.example.com/videos/generated/abc.mp4"
        );
        let streaming = cloud.streaming_locator(blob).await.unwrap();
        assert_eq!(
            streaming.streaming_urls.dash,
            "https://stream.example.com/videos/generated/abc.mp4?format=dash"
        );
        assert!(cloud.status().media_services);
        assert!(matches!(
            cloud.cdn_url("https://elsewhere.com/v.mp4").await,
            Err(StorageError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_object_store_optional_services() {
        let cloud = object_store().await;

        assert!(cloud.is_configured());
        assert!(!cloud.status().media_services);
        assert!(matches!(
            cloud.cdn_url("https://media.example.com/videos/a.mp4").await,
            Err(StorageError::NotConfigured(_))
        ));
        assert!(matches!(
            cloud.analyze_video("https://media.example.com/videos/a.mp4").await,
            Err(StorageError::NotConfigured(_))
        ));
        assert_eq!(
            cloud.video_metrics("abc").await.unwrap(),
            VideoMetrics::empty("abc")
        );
    }

    #[tokio::test]
    async fn test_object_store_upload_checks_file_first() {
        let dir = TempDir::new().unwrap();
        let err = object_store()
            .await
            .upload_video(&dir.path().join("missing.mp4"), "videos")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_object_store_analysis_uses_insights() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "insights": {"topics": ["nature"]},
                "status": "completed"
            })))
            .mount(&server)
            .await;

        let cloud = object_store()
            .await
            .with_insights(InsightsClient::new(server.uri()).unwrap());
        let report = cloud
            .analyze_video("https://media.example.com/videos/a.mp4")
            .await
            .unwrap();
        assert_eq!(report.insights.topics, ["nature"]);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(CloudBackend::parse("object_store"), CloudBackend::ObjectStore);
        assert_eq!(CloudBackend::parse(" S3 "), CloudBackend::ObjectStore);
        assert_eq!(CloudBackend::parse("stub"), CloudBackend::Stub);
        assert_eq!(CloudBackend::parse("azure"), CloudBackend::Stub);
    }

    #[test]
    fn test_setup_instructions() {
        let setup = StubCloud::new().setup_instructions();
        assert!(setup
            .required_environment_variables
            .contains(&"STORAGE_ENDPOINT_URL".to_string()));
        assert_eq!(setup.setup_steps.len(), 5);
    }
}

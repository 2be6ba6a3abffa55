//! S3-compatible object store client.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{StorageError, StorageResult};

/// Configuration for the object store client.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    /// S3 API endpoint
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Region ("auto" for most S3-compatible stores)
    pub region: String,
    /// Base under which objects are publicly reachable; the endpoint when unset
    pub public_url: Option<String>,
}

impl ObjectStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let endpoint_url = std::env::var("STORAGE_ENDPOINT_URL")
            .map_err(|_| StorageError::config_error("STORAGE_ENDPOINT_URL not set"))?;
        Url::parse(&endpoint_url).map_err(|e| StorageError::InvalidUrl(format!("{endpoint_url}: {e}")))?;

        let public_url = std::env::var("STORAGE_PUBLIC_URL").ok().filter(|s| !s.is_empty());
        if let Some(public) = &public_url {
            Url::parse(public).map_err(|e| StorageError::InvalidUrl(format!("{public}: {e}")))?;
        }

        Ok(Self {
            endpoint_url,
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STORAGE_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_url,
        })
    }

    /// Public URL of `key` inside `container` (path-style).
    pub fn object_url(&self, container: &str, key: &str) -> String {
        let base = self.public_url.as_deref().unwrap_or(&self.endpoint_url);
        format!("{}/{}/{}", base.trim_end_matches('/'), container, key)
    }
}

/// Object key under which a local video is uploaded: `generated/<filename>`.
pub fn upload_key(path: &Path) -> StorageResult<String> {
    let name = path
        .file_name()
        .ok_or_else(|| StorageError::upload_failed(format!("Not a file: {}", path.display())))?;
    Ok(format!("generated/{}", name.to_string_lossy()))
}

/// Client for an S3-compatible store, one bucket per container.
#[derive(Clone)]
pub struct ObjectStoreClient {
    client: Client,
    config: ObjectStoreConfig,
}

impl ObjectStoreClient {
    pub async fn new(config: ObjectStoreConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vgen-object-store",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            config,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Self::new(ObjectStoreConfig::from_env()?).await
    }

    pub fn config(&self) -> &ObjectStoreConfig {
        &self.config
    }

    /// Create the container's bucket unless it already exists.
    pub async fn ensure_container(&self, container: &str) -> StorageResult<()> {
        if self.client.head_bucket().bucket(container).send().await.is_ok() {
            return Ok(());
        }

        debug!("Creating container {}", container);
        match self.client.create_bucket().bucket(container).send().await {
            Ok(_) => {
                info!(container = container, "Created container");
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                let service = e.into_service_error();
                if service.is_bucket_already_owned_by_you() || service.is_bucket_already_exists() {
                    Ok(())
                } else {
                    Err(StorageError::AwsSdk(format!(
                        "Failed to create container {container}: {message}"
                    )))
                }
            }
        }
    }

    /// Upload a file and return its public URL.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        container: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = path.as_ref();
        debug!("Uploading {} to {}/{}", path.display(), container, key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        let url = self.config.object_url(container, key);
        info!("Uploaded {} to {}", path.display(), url);
        Ok(url)
    }

    /// Check connectivity by heading a container.
    pub async fn check_connectivity(&self, container: &str) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(container)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("Object store connectivity check failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(public_url: Option<&str>) -> ObjectStoreConfig {
        ObjectStoreConfig {
            endpoint_url: "http://localhost:9000/".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            region: "auto".to_string(),
            public_url: public_url.map(str::to_string),
        }
    }

    #[test]
    fn test_object_url_defaults_to_endpoint() {
        assert_eq!(
            config(None).object_url("videos", "generated/a.mp4"),
            "http://localhost:9000/videos/generated/a.mp4"
        );
    }

    #[test]
    fn test_object_url_prefers_public_base() {
        assert_eq!(
            config(Some("https://media.example.com")).object_url("videos", "generated/a.mp4"),
            "https://media.example.com/videos/generated/a.mp4"
        );
    }

    #[test]
    fn test_upload_key() {
        assert_eq!(
            upload_key(Path::new("/tmp/generated_videos/abc.mp4")).unwrap(),
            "generated/abc.mp4"
        );
        assert!(upload_key(Path::new("/")).is_err());
    }
}

//! Video distribution backends.
//!
//! This crate provides:
//! - An S3-compatible object store client
//! - The [`CloudServices`] seam with stub and object store backends
//! - The upload → CDN → streaming → analysis workflow
//! - A client for the HTTP video insights service

pub mod client;
pub mod cloud;
pub mod error;
pub mod insights;

pub use client::{upload_key, ObjectStoreClient, ObjectStoreConfig};
pub use cloud::{
    cloud_from_env, run_workflow, setup_instructions, CloudBackend, CloudServices,
    ObjectStoreCloud, StubCloud,
};
pub use error::{StorageError, StorageResult};
pub use insights::InsightsClient;

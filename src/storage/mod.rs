//! Remote media store
//!
//! Every asset this service hands out lives in a third-party media store.
//! The relay only needs three things from it:
//! - `upload` a staged local file into a folder
//! - `url_for` an asset id (local computation, no network)
//! - `destroy` an asset by id
//!
//! `exists` is an optional extra round trip used when reads are configured
//! to verify the asset before returning its URL.

pub mod cloudinary;
pub mod signing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub use cloudinary::CloudinaryClient;

/// Resource type hint sent to the store. `Auto` lets it detect image/video/raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[default]
    Auto,
    Image,
    Video,
    Raw,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Auto => "auto",
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub resource_type: ResourceType,
    pub folder: String,
    /// Name the client gave the file, used for the outgoing part's MIME type
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredAsset {
    pub public_id: String,
    pub secure_url: String,
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Raw answer of a destroy call. `raw` is the store's full payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DestroyOutcome {
    pub result: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyStatus<'a> {
    Deleted,
    NotFound,
    Failed(Option<&'a str>),
}

impl DestroyOutcome {
    pub fn from_raw(raw: serde_json::Value) -> Self {
        let result = raw
            .get("result")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        Self { result, raw }
    }

    pub fn status(&self) -> DestroyStatus<'_> {
        match self.result.as_deref() {
            Some("ok") => DestroyStatus::Deleted,
            Some("not found") => DestroyStatus::NotFound,
            other => DestroyStatus::Failed(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request to media store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from media store: {0}")]
    InvalidResponse(String),

    #[error("Invalid public id: {0:?}")]
    InvalidPublicId(String),

    #[error("Invalid media store configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read staged file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reject ids whose path form would not survive URL normalisation:
/// blank ids and empty, `.` or `..` segments.
pub fn validate_public_id(public_id: &str) -> Result<(), StoreError> {
    let malformed = public_id.trim().is_empty()
        || public_id
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if malformed {
        return Err(StoreError::InvalidPublicId(public_id.to_string()));
    }
    Ok(())
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(
        &self,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<StoredAsset, StoreError>;

    fn url_for(&self, public_id: &str, resource_type: ResourceType) -> Result<String, StoreError>;

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<DestroyOutcome, StoreError>;

    async fn exists(&self, public_id: &str, resource_type: ResourceType)
        -> Result<bool, StoreError>;
}

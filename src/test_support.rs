//! Test doubles shared by the handler tests

use async_trait::async_trait;
use axum::http::Method;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{
    CloudinaryConfig, Config, CorsConfig, ReadConfig, ServerConfig, SignatureAlgorithm,
    UploadConfig,
};
use crate::models::AppState;
use crate::storage::{
    validate_public_id, DestroyOutcome, MediaStore, ResourceType, StoreError, StoredAsset,
    UploadOptions,
};

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub folder: String,
    pub resource_type: ResourceType,
    pub path: PathBuf,
    /// Whether the staged file was on disk when the store was called
    pub existed: bool,
    pub contents: Vec<u8>,
}

/// In-memory `MediaStore` that records what it was asked to do
pub struct FakeStore {
    pub uploads: Mutex<Vec<RecordedUpload>>,
    pub destroyed: Mutex<Vec<(String, ResourceType)>>,
    pub network_calls: AtomicUsize,
    pub upload_error: Option<String>,
    pub destroy_result: serde_json::Value,
    pub known_ids: Vec<String>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            network_calls: AtomicUsize::new(0),
            upload_error: None,
            destroy_result: serde_json::json!({ "result": "ok" }),
            known_ids: Vec::new(),
        }
    }
}

impl FakeStore {
    pub fn failing_upload(message: &str) -> Self {
        Self {
            upload_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_destroy_result(result: serde_json::Value) -> Self {
        Self {
            destroy_result: result,
            ..Self::default()
        }
    }

    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeStore {
    async fn upload(
        &self,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<StoredAsset, StoreError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);

        let contents = std::fs::read(local_path).unwrap_or_default();
        self.uploads.lock().unwrap().push(RecordedUpload {
            folder: options.folder.clone(),
            resource_type: options.resource_type,
            path: local_path.to_path_buf(),
            existed: local_path.exists(),
            contents,
        });

        if let Some(message) = &self.upload_error {
            return Err(StoreError::Api {
                status: 401,
                message: message.clone(),
            });
        }

        Ok(StoredAsset {
            public_id: format!("{}/fake123", options.folder),
            secure_url: format!("https://cdn.test/{}/fake123", options.folder),
            resource_type: Some("image".to_string()),
        })
    }

    fn url_for(&self, public_id: &str, resource_type: ResourceType) -> Result<String, StoreError> {
        validate_public_id(public_id)?;
        Ok(format!("https://cdn.test/{}/upload/{}", resource_type, public_id))
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<DestroyOutcome, StoreError> {
        validate_public_id(public_id)?;
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        self.destroyed
            .lock()
            .unwrap()
            .push((public_id.to_string(), resource_type));
        Ok(DestroyOutcome::from_raw(self.destroy_result.clone()))
    }

    async fn exists(
        &self,
        public_id: &str,
        _resource_type: ResourceType,
    ) -> Result<bool, StoreError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.known_ids.iter().any(|id| id == public_id))
    }
}

pub fn test_config(staging_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        cloudinary: CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: "abcd".to_string(),
            api_base_url: "https://api.cloudinary.com".to_string(),
            delivery_base_url: "https://res.cloudinary.com".to_string(),
            secure: true,
            signature_algorithm: SignatureAlgorithm::Sha1,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            allowed_methods: vec![Method::GET, Method::POST],
            allowed_headers: vec!["Content-Type".to_string()],
        },
        upload: UploadConfig {
            staging_dir: staging_dir.to_path_buf(),
            field_name: "file".to_string(),
            max_body_bytes: None,
        },
        read: ReadConfig::default(),
    }
}

pub fn test_state(store: Arc<FakeStore>, staging_dir: &Path) -> AppState {
    AppState::new(test_config(staging_dir), store)
}

/// Number of entries left in the staging directory
pub fn staged_file_count(staging_dir: &Path) -> usize {
    std::fs::read_dir(staging_dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}
